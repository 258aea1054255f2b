// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/sampler.rs - 涂卡圆灰度采样
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

use image::{GenericImageView, Pixel};

/// 无法采样时返回的灰度，等同于完全空白
pub const EMPTY_DARKNESS: f64 = 255.0;

// 裁剪后的采样框任一边小于该值时不再采样
const MIN_REGION_SIDE: u32 = 2;

/// 图像中的采样框（已裁剪到图像边界内）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRegion {
  pub left: u32,
  pub top: u32,
  pub width: u32,
  pub height: u32,
}

impl SampleRegion {
  /// 以 (cx, cy) 为中心、边长 `max(2, ceil(radius * box_factor))` 的正方形，裁剪到图像内
  pub fn around(
    cx: f64,
    cy: f64,
    radius: f64,
    box_factor: f64,
    image_width: u32,
    image_height: u32,
  ) -> Self {
    let side = (radius * box_factor).ceil().max(MIN_REGION_SIDE as f64) as i64;

    let clip = |center: f64, limit: u32| {
      let start = (center - side as f64 / 2.0).round() as i64;
      let end = start.saturating_add(side);
      let limit = limit as i64;
      (start.clamp(0, limit), end.clamp(0, limit))
    };

    let (left, right) = clip(cx, image_width);
    let (top, bottom) = clip(cy, image_height);

    Self {
      left: left as u32,
      top: top as u32,
      width: (right - left) as u32,
      height: (bottom - top) as u32,
    }
  }

  pub fn is_degenerate(&self) -> bool {
    self.width < MIN_REGION_SIDE || self.height < MIN_REGION_SIDE
  }
}

/// 计算圆形掩膜内的平均灰度（0 为全黑，255 为全白）
///
/// 纯函数，只读访问图像，可在多个线程中对同一图像并发调用。
pub fn sample_darkness<I>(image: &I, cx: f64, cy: f64, radius: f64, box_factor: f64) -> f64
where
  I: GenericImageView,
  I::Pixel: Pixel<Subpixel = u8>,
{
  let (width, height) = image.dimensions();
  let region = SampleRegion::around(cx, cy, radius, box_factor, width, height);
  if region.is_degenerate() {
    return EMPTY_DARKNESS;
  }

  let radius_sq = radius * radius;
  let mut sum = 0u64;
  let mut count = 0u64;

  for y in region.top..region.top + region.height {
    let dy = y as f64 - cy;
    for x in region.left..region.left + region.width {
      let dx = x as f64 - cx;
      if dx * dx + dy * dy <= radius_sq {
        sum += image.get_pixel(x, y).to_luma()[0] as u64;
        count += 1;
      }
    }
  }

  if count == 0 {
    return EMPTY_DARKNESS;
  }

  sum as f64 / count as f64
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{GrayImage, Luma, Rgb, RgbImage};
  use imageproc::drawing::draw_filled_circle_mut;

  #[test]
  fn region_is_centered_and_sized_by_factor() {
    let region = SampleRegion::around(100.0, 200.0, 10.0, 2.5, 1000, 1000);
    assert_eq!(region.width, 25);
    assert_eq!(region.height, 25);
    // round(100 - 12.5) = 88
    assert_eq!(region.left, 88);
    assert_eq!(region.top, 188);
  }

  #[test]
  fn region_is_clipped_to_image() {
    let region = SampleRegion::around(2.0, 98.0, 10.0, 2.5, 100, 100);
    assert_eq!(region.left, 0);
    assert_eq!(region.top, 86);
    // round(2 - 12.5) = -11，右边界为 -11 + 25 = 14
    assert_eq!(region.left + region.width, 14);
    assert_eq!(region.top + region.height, 100);
    assert!(!region.is_degenerate());

    let outside = SampleRegion::around(-100.0, 50.0, 10.0, 2.5, 100, 100);
    assert_eq!(outside.width, 0);
    assert!(outside.is_degenerate());
  }

  #[test]
  fn uniform_image_yields_its_intensity() {
    let image = GrayImage::from_pixel(64, 64, Luma([100u8]));
    assert_eq!(sample_darkness(&image, 32.0, 32.0, 10.0, 2.5), 100.0);
  }

  #[test]
  fn filled_mark_is_black_and_blank_is_white() {
    let mut image = GrayImage::from_pixel(200, 200, Luma([255u8]));
    draw_filled_circle_mut(&mut image, (60, 60), 12, Luma([0u8]));

    assert_eq!(sample_darkness(&image, 60.0, 60.0, 10.0, 2.5), 0.0);
    assert_eq!(sample_darkness(&image, 140.0, 140.0, 10.0, 2.5), 255.0);
  }

  #[test]
  fn mask_is_circular_not_square() {
    // 仅在采样框四角涂黑，圆形掩膜内应保持全白
    let mut image = GrayImage::from_pixel(100, 100, Luma([255u8]));
    for (x, y) in [(38, 38), (62, 38), (38, 62), (62, 62)] {
      image.put_pixel(x, y, Luma([0u8]));
    }
    assert_eq!(sample_darkness(&image, 50.0, 50.0, 10.0, 2.5), 255.0);
  }

  #[test]
  fn color_pixels_are_reduced_to_luma() {
    let image = RgbImage::from_pixel(40, 40, Rgb([0u8, 0, 0]));
    assert_eq!(sample_darkness(&image, 20.0, 20.0, 5.0, 2.5), 0.0);
  }

  #[test]
  fn out_of_bounds_center_reads_as_empty() {
    let image = GrayImage::from_pixel(50, 50, Luma([0u8]));
    assert_eq!(sample_darkness(&image, 500.0, 500.0, 10.0, 2.5), EMPTY_DARKNESS);
    assert_eq!(sample_darkness(&image, 49.9, 25.0, 10.0, 2.5), 0.0);
  }
}
