// 该文件是 Datika （答题卡识别） 项目的一部分。
// tests/common/mod.rs - 合成答题卡
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

#![allow(dead_code)]

use datika::Template;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use serde_json::json;

pub const REFERENCE_WIDTH: u32 = 1654;
pub const REFERENCE_HEIGHT: u32 = 2339;
pub const SLOTS: usize = 12;

// 涂黑半径比采样半径（10）略大
const FILL_RADIUS: f64 = 14.0;

pub fn candidate_center(slot: usize, digit: u8) -> (f64, f64) {
  (300.0 + 90.0 * slot as f64, 600.0 + 60.0 * digit as f64)
}

/// 不带参考尺寸的学号模板，使用默认 A4 参考尺寸与默认半径
pub fn template_json(slots: usize, reversed: bool) -> serde_json::Value {
  let slots: Vec<_> = (0..slots)
    .map(|s| {
      let mut digits: Vec<u8> = (0..10).collect();
      if reversed {
        digits.reverse();
      }
      let candidates: Vec<_> = digits
        .into_iter()
        .map(|d| {
          let (x, y) = candidate_center(s, d);
          json!({ "digit": d, "x": x, "y": y })
        })
        .collect();
      json!({ "candidates": candidates })
    })
    .collect();
  json!({ "slots": slots })
}

pub fn id_template() -> Template {
  Template::from_value(template_json(SLOTS, false)).expect("synthetic template is valid")
}

/// 在给定尺寸的白纸上按各位数字涂黑，坐标按参考尺寸线性缩放
pub fn paint_sheet(width: u32, height: u32, digits: &[u8]) -> GrayImage {
  let sx = width as f64 / REFERENCE_WIDTH as f64;
  let sy = height as f64 / REFERENCE_HEIGHT as f64;
  let radius = (FILL_RADIUS * sx.min(sy)).ceil() as i32;

  let mut image = GrayImage::from_pixel(width, height, Luma([255u8]));
  for (slot, digit) in digits.iter().enumerate() {
    let (x, y) = candidate_center(slot, *digit);
    let center = ((x * sx).round() as i32, (y * sy).round() as i32);
    draw_filled_circle_mut(&mut image, center, radius, Luma([0u8]));
  }
  image
}

pub fn digits_of(id: &str) -> Vec<u8> {
  id.bytes().map(|b| b - b'0').collect()
}
