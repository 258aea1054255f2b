// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/decoder.rs - 学号识别流程
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

use std::sync::Arc;

use image::{GenericImageView, Pixel};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{
  assembler::assemble,
  config::DecodeConfig,
  error::DecodeError,
  geometry::Scale,
  sampler::sample_darkness,
  selector::{SlotReading, select_digit},
  template::{Candidate, Slot, Template},
};

pub trait Model<Input> {
  type Output;
  type Error;

  fn infer(&self, input: &Input) -> Result<Self::Output, Self::Error>;

  /// 输入图像上全部候选的采样圆，用于结果标注
  fn candidates(&self, _input: &Input) -> Vec<Mark> {
    Vec::new()
  }
}

/// 选中候选在图像坐标中的采样圆
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mark {
  pub slot: usize,
  pub digit: u8,
  pub x: f64,
  pub y: f64,
  pub radius: f64,
}

/// 一次识别的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeReport {
  /// 学号，长度恒等于模板位数
  pub id: String,
  pub slots: Vec<SlotReading>,
  pub marks: Vec<Mark>,
  pub scale: Scale,
}

/// 使用默认参数识别学号
pub fn decode<I>(image: &I, template: &Template) -> Result<String, DecodeError>
where
  I: GenericImageView + Sync,
  I::Pixel: Pixel<Subpixel = u8>,
{
  decode_report(image, template, &DecodeConfig::default()).map(|report| report.id)
}

/// 直接使用未校验的 JSON 模板识别，模板问题统一报告为 `InvalidTemplate`
pub fn decode_value<I>(
  image: &I,
  template: &serde_json::Value,
  config: &DecodeConfig,
) -> Result<String, DecodeError>
where
  I: GenericImageView + Sync,
  I::Pixel: Pixel<Subpixel = u8>,
{
  let template = Template::from_value(template.clone())?;
  decode_report(image, &template, config).map(|report| report.id)
}

fn scaled_mark(slot: usize, candidate: &Candidate, scale: Scale, config: &DecodeConfig) -> Mark {
  let (x, y) = scale.point(candidate.x, candidate.y);
  Mark {
    slot,
    digit: candidate.digit,
    x,
    y,
    radius: scale.radius(candidate.radius_or(config.default_radius), config.min_radius),
  }
}

/// 按图像尺寸换算模板中全部候选的采样圆，按位序、候选顺序排列
pub fn candidate_marks(
  template: &Template,
  config: &DecodeConfig,
  width: u32,
  height: u32,
) -> Vec<Mark> {
  let reference = template.reference_size_or(config.default_reference_size);
  let scale = Scale::between(reference, width, height);
  template
    .slots()
    .iter()
    .enumerate()
    .flat_map(|(index, slot)| {
      slot
        .candidates()
        .iter()
        .map(move |candidate| scaled_mark(index, candidate, scale, config))
    })
    .collect()
}

/// 识别并返回每一位的读数
///
/// 各位之间互不依赖，`config.parallel` 为真时通过 rayon 并行采样；
/// 出错时总是返回位序最靠前的错误。
pub fn decode_report<I>(
  image: &I,
  template: &Template,
  config: &DecodeConfig,
) -> Result<DecodeReport, DecodeError>
where
  I: GenericImageView + Sync,
  I::Pixel: Pixel<Subpixel = u8>,
{
  template.check_slot_count(config.expected_slots)?;

  let (width, height) = image.dimensions();
  let reference = template.reference_size_or(config.default_reference_size);
  let scale = Scale::between(reference, width, height);
  debug!(
    "图像 {}x{}, 参考尺寸 {}x{}, 缩放 ({:.4}, {:.4})",
    width, height, reference.width, reference.height, scale.x, scale.y
  );

  let read_slot = |(index, slot): (usize, &Slot)| {
    let scores = slot.candidates().iter().map(|candidate| {
      let mark = scaled_mark(index, candidate, scale, config);
      let darkness = sample_darkness(image, mark.x, mark.y, mark.radius, config.box_factor);
      (candidate.digit, darkness)
    });
    let reading = select_digit(index, scores, config.blank_threshold)?;
    // 模板保证每位数字唯一
    let chosen = slot
      .candidates()
      .iter()
      .find(|c| c.digit == reading.digit)
      .map(|candidate| scaled_mark(index, candidate, scale, config));
    Ok::<_, DecodeError>((reading, chosen))
  };

  let results: Vec<Result<(SlotReading, Option<Mark>), DecodeError>> = if config.parallel {
    template.slots().par_iter().enumerate().map(read_slot).collect()
  } else {
    template.slots().iter().enumerate().map(read_slot).collect()
  };

  let (readings, marks): (Vec<SlotReading>, Vec<Option<Mark>>) =
    results.into_iter().collect::<Result<Vec<_>, _>>()?.into_iter().unzip();
  let id = assemble(&readings, template.len())?;

  Ok(DecodeReport {
    id,
    slots: readings,
    marks: marks.into_iter().flatten().collect(),
    scale,
  })
}

/// 绑定模板与参数的识别器，克隆开销很小，可在工作线程间共享
#[derive(Debug, Clone)]
pub struct Decoder {
  template: Arc<Template>,
  config: Arc<DecodeConfig>,
}

impl Decoder {
  pub fn new(template: Template, config: DecodeConfig) -> Result<Self, DecodeError> {
    template.check_slot_count(config.expected_slots)?;
    Ok(Self {
      template: Arc::new(template),
      config: Arc::new(config),
    })
  }

  pub fn template(&self) -> &Template {
    &self.template
  }

  pub fn config(&self) -> &DecodeConfig {
    &self.config
  }

  pub fn decode_report<I>(&self, image: &I) -> Result<DecodeReport, DecodeError>
  where
    I: GenericImageView + Sync,
    I::Pixel: Pixel<Subpixel = u8>,
  {
    decode_report(image, &self.template, &self.config)
  }

  pub fn decode<I>(&self, image: &I) -> Result<String, DecodeError>
  where
    I: GenericImageView + Sync,
    I::Pixel: Pixel<Subpixel = u8>,
  {
    self.decode_report(image).map(|report| report.id)
  }
}

impl<I> Model<I> for Decoder
where
  I: GenericImageView + Sync,
  I::Pixel: Pixel<Subpixel = u8>,
{
  type Output = DecodeReport;
  type Error = DecodeError;

  fn infer(&self, input: &I) -> Result<Self::Output, Self::Error> {
    self.decode_report(input)
  }

  fn candidates(&self, input: &I) -> Vec<Mark> {
    let (width, height) = input.dimensions();
    candidate_marks(&self.template, &self.config, width, height)
  }
}
