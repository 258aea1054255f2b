// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/bin/batch_continueshot.rs - 批量识别答题卡
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

mod args;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use datika::{
  FromUrl,
  input::InputWrapper,
  output::OutputWrapper,
  task::{BatchTask, Task},
};

/// Datika 批量识别参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  #[command(flatten)]
  pub decode: args::DecodeArgs,
  /// 单页识别超时（毫秒），0 表示不限制
  #[arg(long, value_name = "MILLIS", default_value = "2000")]
  pub timeout_ms: u64,
  /// 最多处理的页数
  #[arg(long, value_name = "PAGE_NUMBER")]
  pub page_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let cli = Cli::parse();
  let decoder = cli.decode.build_decoder()?;
  let input = InputWrapper::from_url(&cli.decode.input)?;
  let output = OutputWrapper::from_url(&cli.decode.output)?;

  let timeout = (cli.timeout_ms > 0).then(|| Duration::from_millis(cli.timeout_ms));
  let summary = BatchTask::default()
    .with_timeout(timeout)
    .with_page_limit(cli.page_number)
    .with_interrupt(true)
    .run_task(input, decoder, output)?;

  info!(
    "识别 {} 页, 转人工录入 {} 页",
    summary.decoded, summary.manual_entry
  );
  Ok(())
}
