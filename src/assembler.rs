// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/assembler.rs - 学号拼接
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

use crate::{error::DecodeError, selector::SlotReading};

/// 按位序拼接各位数字，长度必须与模板位数一致
pub fn assemble(readings: &[SlotReading], expected: usize) -> Result<String, DecodeError> {
  let id: String = readings
    .iter()
    .filter_map(|reading| char::from_digit(reading.digit as u32, 10))
    .collect();

  if id.len() != expected {
    return Err(DecodeError::LengthMismatch {
      expected,
      actual: id.len(),
    });
  }

  Ok(id)
}
