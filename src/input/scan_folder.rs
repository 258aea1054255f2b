// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/input/scan_folder.rs - 扫描目录输入
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

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::ScanPage};

const SCAN_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum ScanFolderInputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch { expected: String, found: String },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按文件名顺序逐页读取目录中的扫描件
pub struct ScanFolderInput {
  pending: std::vec::IntoIter<PathBuf>,
}

impl FromUrlWithScheme for ScanFolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for ScanFolderInput {
  type Error = ScanFolderInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ScanFolderInputError::SchemeMismatch {
        expected: Self::SCHEME.to_string(),
        found: url.scheme().to_string(),
      });
    }
    Self::open(url.path())
  }
}

fn is_scan_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      let ext = ext.to_lowercase();
      SCAN_EXTENSIONS.contains(&ext.as_str())
    })
    .unwrap_or(false)
}

impl ScanFolderInput {
  pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self, ScanFolderInputError> {
    let directory = directory.as_ref();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
      let path = entry?.path();
      if path.is_file() && is_scan_file(&path) {
        files.push(path);
      } else {
        debug!("跳过非扫描文件: {}", path.display());
      }
    }
    files.sort();

    info!("扫描目录 {} 共 {} 页", directory.display(), files.len());
    Ok(Self {
      pending: files.into_iter(),
    })
  }

  pub fn remaining(&self) -> usize {
    self.pending.len()
  }
}

impl Iterator for ScanFolderInput {
  type Item = ScanPage;

  fn next(&mut self) -> Option<Self::Item> {
    self.pending.next().map(ScanPage::open)
  }
}
