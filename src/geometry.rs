// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/geometry.rs - 参考坐标到图像坐标的缩放
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

use serde::{Deserialize, Serialize};

/// 模板坐标所在的参考空间尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ReferenceSize {
  pub width: f64,
  pub height: f64,
}

impl ReferenceSize {
  pub fn is_usable(&self) -> bool {
    self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
  }
}

/// 水平与垂直方向独立的缩放系数
///
/// 扫描件可能被非等比拉伸，两个方向从不耦合。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
  pub x: f64,
  pub y: f64,
}

impl Scale {
  pub fn between(reference: ReferenceSize, width: u32, height: u32) -> Self {
    Self {
      x: width as f64 / reference.width,
      y: height as f64 / reference.height,
    }
  }

  pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
    (x * self.x, y * self.y)
  }

  /// 采样半径取较小的缩放系数，拉伸后的圆也不会超出被压缩方向上的真实涂卡区域
  pub fn radius(&self, radius: f64, min_radius: f64) -> f64 {
    (radius * self.x.min(self.y)).max(min_radius)
  }
}
