// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/input.rs - 扫描件输入
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

use image::{DynamicImage, ImageReader};
use thiserror::Error;

use crate::{FromUrl, error::DecodeError};

/// 一页扫描件。解码失败的页面同样会产出，由调用方转入人工录入。
#[derive(Debug)]
pub struct ScanPage {
  pub source: PathBuf,
  pub content: Result<DynamicImage, DecodeError>,
}

impl ScanPage {
  pub fn open<P: AsRef<Path>>(path: P) -> Self {
    let source = path.as_ref().to_path_buf();
    let content = load_page(&source);
    Self { source, content }
  }
}

/// 使用 image 解码器读取扫描文件
pub fn load_page<P: AsRef<Path>>(path: P) -> Result<DynamicImage, DecodeError> {
  let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
  Ok(image)
}

/// 从内存中的压缩图像数据解码
pub fn decode_page_bytes(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
  Ok(image::load_from_memory(bytes)?)
}

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ScanFileInput, ScanFileInputError};

#[cfg(feature = "read_image_file")]
mod scan_folder;
#[cfg(feature = "read_image_file")]
pub use self::scan_folder::{ScanFolderInput, ScanFolderInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_image_file")]
  #[error("扫描文件输入错误: {0}")]
  ScanFileInputError(#[from] ScanFileInputError),
  #[cfg(feature = "read_image_file")]
  #[error("扫描目录输入错误: {0}")]
  ScanFolderInputError(#[from] ScanFolderInputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  #[cfg(feature = "read_image_file")]
  ScanFile(ScanFileInput),
  #[cfg(feature = "read_image_file")]
  ScanFolder(ScanFolderInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "read_image_file")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == ScanFileInput::SCHEME {
        return Ok(InputWrapper::ScanFile(ScanFileInput::from_url(url)?));
      }
      if url.scheme() == ScanFolderInput::SCHEME {
        return Ok(InputWrapper::ScanFolder(ScanFolderInput::from_url(url)?));
      }
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl Iterator for InputWrapper {
  type Item = ScanPage;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "read_image_file")]
      InputWrapper::ScanFile(input) => input.next(),
      #[cfg(feature = "read_image_file")]
      InputWrapper::ScanFolder(input) => input.next(),
      // 未启用任何输入时枚举为空
      #[cfg(not(feature = "read_image_file"))]
      _ => None,
    }
  }
}
