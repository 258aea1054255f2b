// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/selector.rs - 每一位的数字选择
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

use serde::Serialize;
use tracing::debug;

use crate::error::DecodeError;

/// 一位的识别结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotReading {
  pub slot: usize,
  pub digit: u8,
  pub darkness: f64,
}

/// 在 (数字, 灰度) 序列中选出最暗的候选
///
/// 灰度相同时保留最先出现的候选。最暗候选的灰度严格大于 `blank_threshold`
/// 时整位判为无法识别。
pub fn select_digit<S>(slot: usize, scores: S, blank_threshold: f64) -> Result<SlotReading, DecodeError>
where
  S: IntoIterator<Item = (u8, f64)>,
{
  let mut best: Option<(u8, f64)> = None;
  for (digit, darkness) in scores {
    match best {
      Some((_, min)) if darkness >= min => {}
      _ => best = Some((digit, darkness)),
    }
  }

  let Some((digit, darkness)) = best else {
    return Err(DecodeError::UnreadableSlot {
      slot,
      darkness: crate::sampler::EMPTY_DARKNESS,
    });
  };

  if darkness > blank_threshold {
    debug!("第 {} 位最暗候选 {} 灰度 {:.2}, 超过阈值", slot, digit, darkness);
    return Err(DecodeError::UnreadableSlot { slot, darkness });
  }

  debug!("第 {} 位识别为 {} (灰度 {:.2})", slot, digit, darkness);
  Ok(SlotReading {
    slot,
    digit,
    darkness,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scores(best_digit: u8, best: f64) -> Vec<(u8, f64)> {
    (0..10)
      .map(|d| (d, if d == best_digit { best } else { 255.0 }))
      .collect()
  }

  #[test]
  fn picks_darkest_candidate() {
    let reading = select_digit(3, scores(7, 12.5), 240.0).unwrap();
    assert_eq!(reading.slot, 3);
    assert_eq!(reading.digit, 7);
    assert_eq!(reading.darkness, 12.5);
  }

  #[test]
  fn threshold_is_inclusive() {
    let reading = select_digit(0, scores(4, 240.0), 240.0).unwrap();
    assert_eq!(reading.digit, 4);
  }

  #[test]
  fn just_above_threshold_is_unreadable() {
    let err = select_digit(5, scores(4, 240.0001), 240.0).unwrap_err();
    match err {
      DecodeError::UnreadableSlot { slot, darkness } => {
        assert_eq!(slot, 5);
        assert_eq!(darkness, 240.0001);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn ties_keep_first_in_list_order() {
    let tied = vec![(9, 30.0), (2, 10.0), (5, 10.0), (0, 10.0)];
    for _ in 0..5 {
      assert_eq!(select_digit(0, tied.clone(), 240.0).unwrap().digit, 2);
    }
  }

  #[test]
  fn empty_scores_are_unreadable() {
    assert!(matches!(
      select_digit(1, Vec::new(), 240.0),
      Err(DecodeError::UnreadableSlot { slot: 1, .. })
    ));
  }
}
