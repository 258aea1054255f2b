// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/output.rs - 识别结果输出
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

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::FromUrl;
#[cfg(any(feature = "json_record", feature = "directory_record"))]
use crate::FromUrlWithScheme;
use crate::selector::SlotReading;
use crate::task::{PageOutcome, PageStatus};

pub trait Render<Frame, Output> {
  type Error;
  fn render_result(&self, frame: Option<&Frame>, result: &Output) -> Result<(), Self::Error>;
}

/// 每页写出的一条记录
#[derive(Debug, Serialize)]
pub struct PageRecord<'a> {
  pub source: String,
  pub status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slots: Option<&'a [SlotReading]>,
  pub elapsed_ms: f64,
}

impl<'a> From<&'a PageOutcome> for PageRecord<'a> {
  fn from(outcome: &'a PageOutcome) -> Self {
    let source = outcome.source.display().to_string();
    let elapsed_ms = outcome.elapsed.as_secs_f64() * 1000.0;
    match &outcome.status {
      PageStatus::Decoded(report) => PageRecord {
        source,
        status: "decoded",
        id: Some(&report.id),
        reason: None,
        message: None,
        slots: Some(&report.slots),
        elapsed_ms,
      },
      PageStatus::ManualEntry(failure) => PageRecord {
        source,
        status: "manual_entry",
        id: None,
        reason: Some(failure.kind()),
        message: Some(failure.to_string()),
        slots: None,
        elapsed_ms,
      },
    }
  }
}

#[cfg(feature = "json_record")]
mod json_record;
#[cfg(feature = "json_record")]
pub use self::json_record::{JsonRecordOutput, JsonRecordOutputError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError, annotate};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "json_record")]
  #[error("JSON 记录输出错误: {0}")]
  JsonRecordOutputError(#[from] JsonRecordOutputError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  #[cfg(feature = "json_record")]
  JsonRecordOutput(JsonRecordOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "json_record")]
      JsonRecordOutput::SCHEME => {
        let output = JsonRecordOutput::from_url(url)?;
        Ok(OutputWrapper::JsonRecordOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      scheme => Err(OutputError::SchemeMismatch(scheme.to_string())),
    }
  }
}

impl Render<DynamicImage, PageOutcome> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: Option<&DynamicImage>,
    result: &PageOutcome,
  ) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "json_record")]
      OutputWrapper::JsonRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      // 未启用任何输出时枚举为空
      #[cfg(not(any(feature = "json_record", feature = "directory_record")))]
      _ => {
        let _ = (frame, result);
        Ok(())
      }
    }
  }
}
