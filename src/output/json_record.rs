// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/output/json_record.rs - JSON Lines 结果输出
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

use std::{
  fs::OpenOptions,
  io::Write,
  path::Path,
  sync::{Mutex, PoisonError},
};

use image::DynamicImage;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{PageRecord, Render},
  task::PageOutcome,
};

// 路径为该值时写到标准输出
const STDOUT_PATH: &str = "-";

#[derive(Error, Debug)]
pub enum JsonRecordOutputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch { expected: String, found: String },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

/// 每页追加一行 JSON 记录
pub struct JsonRecordOutput {
  writer: Mutex<Box<dyn Write + Send>>,
}

impl FromUrlWithScheme for JsonRecordOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonRecordOutputError::SchemeMismatch {
        expected: Self::SCHEME.to_string(),
        found: url.scheme().to_string(),
      });
    }

    if url.path() == STDOUT_PATH {
      return Ok(Self::from_writer(std::io::stdout()));
    }
    Self::append(url.path())
  }
}

impl JsonRecordOutput {
  pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
    Self {
      writer: Mutex::new(Box::new(writer)),
    }
  }

  pub fn append<P: AsRef<Path>>(path: P) -> Result<Self, JsonRecordOutputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    debug!("追加识别记录到: {}", path.display());
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self::from_writer(file))
  }
}

impl Render<DynamicImage, PageOutcome> for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn render_result(
    &self,
    _frame: Option<&DynamicImage>,
    result: &PageOutcome,
  ) -> Result<(), Self::Error> {
    let line = serde_json::to_string(&PageRecord::from(result))?;
    let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
  }
}
