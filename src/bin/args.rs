// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/bin/args.rs - 命令行公共参数
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

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use url::Url;

use datika::{DecodeConfig, Decoder, Template};

/// 识别相关的公共参数
#[derive(Args, Debug)]
pub struct DecodeArgs {
  /// 模板文件路径（JSON）
  #[arg(long, value_name = "FILE")]
  pub template: PathBuf,
  /// 输入来源，例如 image:///scans/001.png 或 folder:///scans
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，例如 jsonl:- 或 folder:///records?failed
  #[arg(long, value_name = "OUTPUT", default_value = "jsonl:-")]
  pub output: Url,
  /// 识别参数配置文件（JSON），缺省使用内置参数
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,
  /// 期望的学号位数
  #[arg(long, value_name = "COUNT")]
  pub digits: Option<usize>,
  /// 关闭并行采样
  #[arg(long)]
  pub sequential: bool,
}

impl DecodeArgs {
  pub fn build_decoder(&self) -> Result<Decoder> {
    info!("模板文件路径: {}", self.template.display());
    info!("输入来源: {}", self.input);
    info!("输出路径: {}", self.output);

    let mut config = match &self.config {
      Some(path) => DecodeConfig::from_json_file(path)
        .with_context(|| format!("无法读取识别配置: {}", path.display()))?,
      None => DecodeConfig::default(),
    };
    if self.digits.is_some() {
      config = config.with_expected_slots(self.digits);
    }
    if self.sequential {
      config = config.with_parallel(false);
    }
    config.validate()?;

    let template = Template::from_json_file(&self.template)
      .with_context(|| format!("无法加载模板: {}", self.template.display()))?;
    info!("模板共 {} 位", template.len());

    Ok(Decoder::new(template, config)?)
  }
}
