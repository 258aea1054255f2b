// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/bin/benchmark_repeatshot.rs - 识别耗时测试
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

use anyhow::Result;
use clap::Parser;

use datika::{
  FromUrl,
  input::InputWrapper,
  output::OutputWrapper,
  task::{RepeatShotTask, Task},
};

/// Datika 耗时测试参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  #[command(flatten)]
  pub decode: args::DecodeArgs,
  /// 重复识别次数
  #[arg(long, value_name = "COUNT", default_value = "1000")]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let cli = Cli::parse();
  let decoder = cli.decode.build_decoder()?;
  let input = InputWrapper::from_url(&cli.decode.input)?;
  let output = OutputWrapper::from_url(&cli.decode.output)?;

  RepeatShotTask::default()
    .with_repeat(cli.repeat)
    .run_task(input, decoder, output)?;

  Ok(())
}
