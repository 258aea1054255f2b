// 该文件是 Datika （答题卡识别） 项目的一部分。
// tests/decode.rs - 学号识别端到端测试
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

mod common;

use common::{
  REFERENCE_HEIGHT, REFERENCE_WIDTH, SLOTS, digits_of, id_template, paint_sheet, template_json,
};
use datika::{
  DecodeConfig, DecodeError, Decoder, Template, decode, decode_report, decode_value,
  input::decode_page_bytes,
};
use image::{GrayImage, Luma, imageops::FilterType};

const SCENARIO_ID: &str = "705318642097";

fn reference_sheet() -> GrayImage {
  paint_sheet(REFERENCE_WIDTH, REFERENCE_HEIGHT, &digits_of(SCENARIO_ID))
}

#[test]
fn filled_seven_in_first_slot_decodes_first() {
  let id = decode(&reference_sheet(), &id_template()).expect("sheet should decode");
  assert!(id.starts_with('7'));
  assert_eq!(id, SCENARIO_ID);
}

#[test]
fn blank_sheet_fails_on_first_slot() {
  let blank = GrayImage::from_pixel(REFERENCE_WIDTH, REFERENCE_HEIGHT, Luma([255u8]));
  match decode(&blank, &id_template()) {
    Err(DecodeError::UnreadableSlot { slot, darkness }) => {
      assert_eq!(slot, 0);
      assert_eq!(darkness, 255.0);
    }
    other => panic!("expected unreadable slot, got {:?}", other),
  }
}

#[test]
fn half_sized_sheet_decodes_identically() {
  let half = paint_sheet(REFERENCE_WIDTH / 2, REFERENCE_HEIGHT / 2, &digits_of(SCENARIO_ID));
  let full = decode(&reference_sheet(), &id_template()).unwrap();
  assert_eq!(decode(&half, &id_template()).unwrap(), full);
}

#[test]
fn resampled_sheets_decode_identically() {
  let reference = reference_sheet();
  let template = id_template();
  let expected = decode(&reference, &template).unwrap();

  let up = image::imageops::resize(
    &reference,
    REFERENCE_WIDTH * 2,
    REFERENCE_HEIGHT * 2,
    FilterType::Nearest,
  );
  let down = image::imageops::resize(
    &reference,
    REFERENCE_WIDTH / 2,
    REFERENCE_HEIGHT / 2,
    FilterType::Nearest,
  );
  assert_eq!(decode(&up, &template).unwrap(), expected);
  assert_eq!(decode(&down, &template).unwrap(), expected);
}

#[test]
fn non_uniform_stretch_scales_axes_independently() {
  let stretched = paint_sheet(REFERENCE_WIDTH, REFERENCE_HEIGHT * 2, &digits_of(SCENARIO_ID));
  let report = decode_report(&stretched, &id_template(), &DecodeConfig::default()).unwrap();
  assert_eq!(report.id, SCENARIO_ID);
  assert_eq!(report.scale.x, 1.0);
  assert_eq!(report.scale.y, 2.0);
  // 采样半径取较小的缩放系数
  assert!(report.marks.iter().all(|m| m.radius == 10.0));
}

#[test]
fn decoding_is_idempotent() {
  let sheet = reference_sheet();
  let template = id_template();
  let first = decode_report(&sheet, &template, &DecodeConfig::default()).unwrap();
  let second = decode_report(&sheet, &template, &DecodeConfig::default()).unwrap();
  assert_eq!(first, second);
}

#[test]
fn threshold_boundary_is_inclusive() {
  let template = id_template();
  let gray = GrayImage::from_pixel(REFERENCE_WIDTH, REFERENCE_HEIGHT, Luma([240u8]));

  // 恰好 240 可以识别
  let id = decode(&gray, &template).expect("darkness 240 must decode");
  assert_eq!(id.len(), SLOTS);

  // 最暗候选超出阈值 0.0001 即失败
  let strict = DecodeConfig::default().with_blank_threshold(239.9999);
  assert!(matches!(
    decode_report(&gray, &template, &strict),
    Err(DecodeError::UnreadableSlot { slot: 0, .. })
  ));

  let lighter = GrayImage::from_pixel(REFERENCE_WIDTH, REFERENCE_HEIGHT, Luma([241u8]));
  assert!(matches!(
    decode(&lighter, &template),
    Err(DecodeError::UnreadableSlot { slot: 0, .. })
  ));
}

#[test]
fn ties_resolve_to_first_candidate_in_list_order() {
  let gray = GrayImage::from_pixel(REFERENCE_WIDTH, REFERENCE_HEIGHT, Luma([100u8]));

  let forward = Template::from_value(template_json(SLOTS, false)).unwrap();
  let reversed = Template::from_value(template_json(SLOTS, true)).unwrap();
  for _ in 0..3 {
    assert_eq!(decode(&gray, &forward).unwrap(), "0".repeat(SLOTS));
    assert_eq!(decode(&gray, &reversed).unwrap(), "9".repeat(SLOTS));
  }
}

#[test]
fn output_length_always_matches_slot_count() {
  let template = id_template();
  let patterns: [&[u8]; 4] = [
    &[0; SLOTS],
    &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 9, 8],
    &[1, 2, 3],
    &[],
  ];
  for pattern in patterns {
    let sheet = paint_sheet(REFERENCE_WIDTH, REFERENCE_HEIGHT, pattern);
    match decode(&sheet, &template) {
      Ok(id) => {
        assert_eq!(id.len(), SLOTS);
        assert!(id.bytes().all(|b| b.is_ascii_digit()));
      }
      Err(err) => assert!(matches!(err, DecodeError::UnreadableSlot { .. })),
    }
  }
}

#[test]
fn unexpected_slot_count_is_invalid_template() {
  let sheet = reference_sheet();
  let config = DecodeConfig::default().with_expected_slots(Some(SLOTS));
  assert!(matches!(
    decode_value(&sheet, &template_json(8, false), &config),
    Err(DecodeError::InvalidTemplate(_))
  ));
  assert_eq!(
    decode_value(&sheet, &template_json(SLOTS, false), &config).unwrap(),
    SCENARIO_ID
  );
}

#[test]
fn encoded_scan_decodes_through_codec() {
  let mut bytes = Vec::new();
  reference_sheet()
    .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
    .unwrap();
  let page = decode_page_bytes(&bytes).unwrap();

  let decoder = Decoder::new(id_template(), DecodeConfig::default()).unwrap();
  assert_eq!(decoder.decode(&page).unwrap(), SCENARIO_ID);

  let rgb = page.to_rgb8();
  assert_eq!(decoder.decode(&rgb).unwrap(), SCENARIO_ID);

  assert!(matches!(
    decode_page_bytes(&bytes[..bytes.len() / 2]),
    Err(DecodeError::CodecFailure(_))
  ));
}

#[test]
fn concurrent_decodes_share_nothing() {
  let decoder = Decoder::new(id_template(), DecodeConfig::default()).unwrap();
  let sheets: Vec<_> = ["111111111111", "222222222222", SCENARIO_ID]
    .iter()
    .map(|id| (id.to_string(), paint_sheet(REFERENCE_WIDTH, REFERENCE_HEIGHT, &digits_of(id))))
    .collect();

  std::thread::scope(|scope| {
    for (id, sheet) in &sheets {
      let decoder = decoder.clone();
      scope.spawn(move || assert_eq!(&decoder.decode(sheet).unwrap(), id));
    }
  });
}
