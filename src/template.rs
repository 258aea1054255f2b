// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/template.rs - 学号涂卡区模板
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::DecodeError, geometry::ReferenceSize};

/// 每一位固定有 0-9 共十个候选
pub const DIGITS_PER_SLOT: usize = 10;

/// 模板的 JSON 结构（未经校验）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSchema {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reference_size: Option<ReferenceSize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page_size: Option<ReferenceSize>,
  pub slots: Vec<SlotSchema>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlotSchema {
  pub candidates: Vec<CandidateSchema>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CandidateSchema {
  pub digit: u8,
  pub x: f64,
  pub y: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub radius: Option<f64>,
}

/// 一个候选涂卡圆
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
  pub digit: u8,
  /// 参考空间中的圆心
  pub x: f64,
  pub y: f64,
  /// 参考空间半径，未指定时由配置给出默认值
  pub radius: Option<f64>,
}

impl Candidate {
  pub fn radius_or(&self, default_radius: f64) -> f64 {
    self.radius.unwrap_or(default_radius)
  }
}

/// 学号中的一位。候选顺序仅用于平局时的确定性取舍。
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
  candidates: Box<[Candidate]>,
}

impl Slot {
  pub fn candidates(&self) -> &[Candidate] {
    &self.candidates
  }
}

/// 经过校验的模板
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
  reference_size: Option<ReferenceSize>,
  page_size: Option<ReferenceSize>,
  slots: Box<[Slot]>,
}

fn invalid(msg: impl Into<String>) -> DecodeError {
  DecodeError::InvalidTemplate(msg.into())
}

impl TryFrom<TemplateSchema> for Template {
  type Error = DecodeError;

  fn try_from(schema: TemplateSchema) -> Result<Self, Self::Error> {
    if schema.slots.is_empty() {
      return Err(invalid("模板没有任何位"));
    }

    let slots = schema
      .slots
      .into_iter()
      .enumerate()
      .map(|(index, slot)| validate_slot(index, slot))
      .collect::<Result<Box<[Slot]>, DecodeError>>()?;

    // 非正数尺寸视为缺失，后续回退到默认值
    let usable = |size: Option<ReferenceSize>| size.filter(ReferenceSize::is_usable);

    Ok(Template {
      reference_size: usable(schema.reference_size),
      page_size: usable(schema.page_size),
      slots,
    })
  }
}

fn validate_slot(index: usize, slot: SlotSchema) -> Result<Slot, DecodeError> {
  if slot.candidates.len() != DIGITS_PER_SLOT {
    return Err(invalid(format!(
      "第 {} 位应有 {} 个候选, 实际为 {}",
      index,
      DIGITS_PER_SLOT,
      slot.candidates.len()
    )));
  }

  let mut seen = [false; DIGITS_PER_SLOT];
  for candidate in &slot.candidates {
    let digit = candidate.digit as usize;
    if digit >= DIGITS_PER_SLOT {
      return Err(invalid(format!("第 {} 位包含非法数字 {}", index, digit)));
    }
    if seen[digit] {
      return Err(invalid(format!("第 {} 位的数字 {} 重复", index, digit)));
    }
    seen[digit] = true;

    if !candidate.x.is_finite() || !candidate.y.is_finite() {
      return Err(invalid(format!("第 {} 位数字 {} 的坐标无效", index, digit)));
    }
    if let Some(radius) = candidate.radius
      && !(radius.is_finite() && radius > 0.0)
    {
      return Err(invalid(format!(
        "第 {} 位数字 {} 的半径无效: {}",
        index, digit, radius
      )));
    }
  }

  let candidates = slot
    .candidates
    .into_iter()
    .map(|c| Candidate {
      digit: c.digit,
      x: c.x,
      y: c.y,
      radius: c.radius,
    })
    .collect();

  Ok(Slot { candidates })
}

impl Template {
  pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
    let schema: TemplateSchema =
      serde_json::from_value(value).map_err(|e| invalid(format!("模板结构错误: {}", e)))?;
    Template::try_from(schema)
  }

  pub fn from_json_str(text: &str) -> Result<Self, DecodeError> {
    let schema: TemplateSchema =
      serde_json::from_str(text).map_err(|e| invalid(format!("模板结构错误: {}", e)))?;
    Template::try_from(schema)
  }

  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
    let path = path.as_ref();
    debug!("读取模板文件: {}", path.display());
    let text = std::fs::read_to_string(path)
      .map_err(|e| invalid(format!("无法读取模板文件 {}: {}", path.display(), e)))?;
    Self::from_json_str(&text)
  }

  pub fn slots(&self) -> &[Slot] {
    &self.slots
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// 参考尺寸优先级：模板参考尺寸 > 页面尺寸 > 默认值
  pub fn reference_size_or(&self, fallback: ReferenceSize) -> ReferenceSize {
    self.reference_size.or(self.page_size).unwrap_or(fallback)
  }

  pub fn check_slot_count(&self, expected: Option<usize>) -> Result<(), DecodeError> {
    match expected {
      Some(expected) if expected != self.len() => Err(invalid(format!(
        "模板位数不匹配: 期望 {}, 实际 {}",
        expected,
        self.len()
      ))),
      _ => Ok(()),
    }
  }
}
