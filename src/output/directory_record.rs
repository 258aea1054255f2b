// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{Datelike, Utc};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  decoder::Mark,
  output::{PageRecord, Render},
  task::{PageOutcome, PageStatus},
};

const MARK_COLOR: [u8; 3] = [255, 0, 0];
const CANDIDATE_COLOR: [u8; 3] = [0, 128, 255];
// 圆圈线宽（像素）
const MARK_THICKNESS: i32 = 2;
const CANDIDATE_THICKNESS: i32 = 1;

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch { expected: String, found: String },
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

fn draw_marks(canvas: &mut RgbImage, marks: &[Mark], color: [u8; 3], thickness: i32) {
  for mark in marks {
    let center = (mark.x.round() as i32, mark.y.round() as i32);
    let radius = mark.radius.round() as i32;
    for t in 0..thickness {
      draw_hollow_circle_mut(canvas, center, radius + t, Rgb(color));
    }
  }
}

/// 在扫描件上画出全部候选圆，并突出每一位选中的涂卡位置
pub fn annotate(image: &DynamicImage, candidates: &[Mark], selected: &[Mark]) -> RgbImage {
  let mut canvas = image.to_rgb8();
  draw_marks(&mut canvas, candidates, CANDIDATE_COLOR, CANDIDATE_THICKNESS);
  draw_marks(&mut canvas, selected, MARK_COLOR, MARK_THICKNESS);
  canvas
}

/// 按日期分目录保存每页的标注图和 JSON 记录
///
/// URI 带 `failed` 参数时只记录转人工录入的页面。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counter: AtomicU16,
  failed_only: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch {
        expected: Self::SCHEME.to_string(),
        found: uri.scheme().to_string(),
      });
    }

    let failed_only = uri.query_pairs().any(|(k, _)| k == "failed");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      frame_counter: AtomicU16::new(0),
      failed_only,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  /// 返回当天目录与本页的文件名前缀
  fn record_stem(&self, source: &Path) -> Result<(PathBuf, String), DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    let name = source
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_else(|| "page".to_string());

    let stem = format!("{}-{:04X}-{}", now.format("%H-%M-%S"), self.frame_id(), name);
    Ok((directory, stem))
  }
}

impl Render<DynamicImage, PageOutcome> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(
    &self,
    frame: Option<&DynamicImage>,
    result: &PageOutcome,
  ) -> Result<(), Self::Error> {
    if self.failed_only && result.is_decoded() {
      return Ok(());
    }

    let (directory, stem) = self.record_stem(&result.source)?;

    if let Some(image) = frame {
      let selected: &[Mark] = match &result.status {
        PageStatus::Decoded(report) => report.marks.as_slice(),
        PageStatus::ManualEntry(_) => &[],
      };
      annotate(image, &result.candidates, selected).save(directory.join(format!("{}.png", stem)))?;
    }

    let record = serde_json::to_vec_pretty(&PageRecord::from(result))?;
    std::fs::write(directory.join(format!("{}.json", stem)), record)?;
    debug!("已记录 {} 到 {}", stem, directory.display());

    Ok(())
  }
}
