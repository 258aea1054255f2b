// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/error.rs - 识别错误定义
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

use thiserror::Error;

/// 学号识别失败的原因
///
/// 除 `CodecFailure` 外都是常见结果（空白或涂改的答题卡很普遍），
/// 调用方应当把页面转入人工录入，而不是猜测一个学号。
#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("模板无效: {0}")]
  InvalidTemplate(String),
  #[error("第 {slot} 位无法识别, 最暗候选灰度 {darkness:.2}")]
  UnreadableSlot { slot: usize, darkness: f64 },
  #[error("识别结果长度不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("图像解码错误: {0}")]
  CodecFailure(#[from] image::ImageError),
}

impl DecodeError {
  /// 写入记录时使用的稳定标签
  pub fn kind(&self) -> &'static str {
    match self {
      DecodeError::InvalidTemplate(_) => "invalid_template",
      DecodeError::UnreadableSlot { .. } => "unreadable_slot",
      DecodeError::LengthMismatch { .. } => "length_mismatch",
      DecodeError::CodecFailure(_) => "codec_failure",
    }
  }

  /// 是否属于可预期的识别结果（而非输入本身损坏）
  pub fn is_expected(&self) -> bool {
    !matches!(self, DecodeError::CodecFailure(_))
  }
}

impl From<std::io::Error> for DecodeError {
  fn from(err: std::io::Error) -> Self {
    DecodeError::CodecFailure(image::ImageError::IoError(err))
  }
}
