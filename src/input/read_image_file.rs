// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/input/read_image_file.rs - 单个扫描文件输入
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::ScanPage};

#[derive(Error, Debug)]
pub enum ScanFileInputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch { expected: String, found: String },
}

/// 只产出一页的扫描文件输入，解码推迟到迭代时进行
pub struct ScanFileInput {
  path: Option<PathBuf>,
}

impl FromUrlWithScheme for ScanFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ScanFileInput {
  type Error = ScanFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ScanFileInputError::SchemeMismatch {
        expected: Self::SCHEME.to_string(),
        found: url.scheme().to_string(),
      });
    }

    Ok(ScanFileInput {
      path: Some(PathBuf::from(url.path())),
    })
  }
}

impl ScanFileInput {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self {
      path: Some(path.into()),
    }
  }
}

impl Iterator for ScanFileInput {
  type Item = ScanPage;

  fn next(&mut self) -> Option<Self::Item> {
    self.path.take().map(ScanPage::open)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yields_exactly_one_page() {
    let url = Url::parse("image:///tmp/datika-missing.png").unwrap();
    let mut input = ScanFileInput::from_url(&url).unwrap();
    let page = input.next().expect("one page");
    assert_eq!(page.source, PathBuf::from("/tmp/datika-missing.png"));
    assert!(page.content.is_err());
    assert!(input.next().is_none());
  }

  #[test]
  fn reads_page_from_path() {
    let path = std::env::temp_dir().join(format!("datika-scan-{}.png", std::process::id()));
    image::GrayImage::from_pixel(6, 3, image::Luma([200u8]))
      .save(&path)
      .unwrap();

    let mut input = ScanFileInput::new(&path);
    let page = input.next().expect("one page");
    let image = page.content.unwrap();
    assert_eq!((image.width(), image.height()), (6, 3));
    assert!(input.next().is_none());

    std::fs::remove_file(&path).unwrap();
  }

  #[test]
  fn rejects_other_schemes() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      ScanFileInput::from_url(&url),
      Err(ScanFileInputError::SchemeMismatch { .. })
    ));
  }
}
