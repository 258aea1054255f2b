// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/config.rs - 识别参数配置
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

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::geometry::ReferenceSize;

// 采样框边长 = 缩放半径 × 该系数
const DEFAULT_BOX_FACTOR: f64 = 2.5;
// 最暗候选的平均灰度超过该值即视为未填涂
const DEFAULT_BLANK_THRESHOLD: f64 = 240.0;
const DEFAULT_MIN_RADIUS: f64 = 2.0;
// 与默认参考尺寸（A4 约 200dpi）配套标定
const DEFAULT_CANDIDATE_RADIUS: f64 = 10.0;
const DEFAULT_REFERENCE_SIZE: ReferenceSize = ReferenceSize {
  width: 1654.0,
  height: 2339.0,
};

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("配置项无效: {0}")]
  Invalid(String),
}

/// 识别参数
///
/// 所有经验常量集中在这里，便于测试探测边界以及日后按真实扫描数据重新标定。
/// `box_factor` 与 `blank_threshold` 目前没有经验推导，仅沿用既有取值。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeConfig {
  /// 采样框系数
  pub box_factor: f64,
  /// 空白阈值（严格大于时判为无法识别）
  pub blank_threshold: f64,
  /// 缩放后采样半径下限（像素）
  pub min_radius: f64,
  /// 候选未指定半径时使用的参考空间半径
  pub default_radius: f64,
  /// 模板与页面尺寸都缺失时的参考尺寸
  pub default_reference_size: ReferenceSize,
  /// 期望的位数，`None` 表示接受任意非空模板
  pub expected_slots: Option<usize>,
  /// 是否使用 rayon 并行采样
  pub parallel: bool,
}

impl Default for DecodeConfig {
  fn default() -> Self {
    Self {
      box_factor: DEFAULT_BOX_FACTOR,
      blank_threshold: DEFAULT_BLANK_THRESHOLD,
      min_radius: DEFAULT_MIN_RADIUS,
      default_radius: DEFAULT_CANDIDATE_RADIUS,
      default_reference_size: DEFAULT_REFERENCE_SIZE,
      expected_slots: None,
      parallel: true,
    }
  }
}

impl DecodeConfig {
  pub fn with_expected_slots(mut self, expected_slots: Option<usize>) -> Self {
    self.expected_slots = expected_slots;
    self
  }

  pub fn with_blank_threshold(mut self, blank_threshold: f64) -> Self {
    self.blank_threshold = blank_threshold;
    self
  }

  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }

  pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
    let config: DecodeConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    debug!("读取识别配置: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    Self::from_json_str(&text)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let positive = |name: &str, value: f64| {
      if value.is_finite() && value > 0.0 {
        Ok(())
      } else {
        Err(ConfigError::Invalid(format!("{} 必须为正数, 实际为 {}", name, value)))
      }
    };

    positive("boxFactor", self.box_factor)?;
    positive("minRadius", self.min_radius)?;
    positive("defaultRadius", self.default_radius)?;
    positive("defaultReferenceSize.width", self.default_reference_size.width)?;
    positive("defaultReferenceSize.height", self.default_reference_size.height)?;

    if !(0.0..=255.0).contains(&self.blank_threshold) {
      return Err(ConfigError::Invalid(format!(
        "blankThreshold 必须位于 [0, 255], 实际为 {}",
        self.blank_threshold
      )));
    }

    if self.expected_slots == Some(0) {
      return Err(ConfigError::Invalid("expectedSlots 不能为 0".to_string()));
    }

    Ok(())
  }
}
