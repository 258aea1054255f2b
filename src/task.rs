// 该文件是 Datika （答题卡识别） 项目的一部分。
// src/task.rs - 识别任务
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

use std::{
  path::PathBuf,
  sync::{
    Arc,
    mpsc::{self, RecvTimeoutError},
  },
  thread,
  time::{Duration, Instant},
};

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
  decoder::{DecodeReport, Mark, Model},
  error::DecodeError,
  input::ScanPage,
  output::Render,
};

/// 页面转入人工录入的原因
#[derive(Error, Debug)]
pub enum PageFailure {
  #[error("{0}")]
  Decode(#[from] DecodeError),
  #[error("识别超时 ({0:?})")]
  TimedOut(Duration),
  #[error("识别线程意外退出")]
  WorkerLost,
}

impl PageFailure {
  pub fn kind(&self) -> &'static str {
    match self {
      PageFailure::Decode(err) => err.kind(),
      PageFailure::TimedOut(_) => "timeout",
      PageFailure::WorkerLost => "worker_lost",
    }
  }
}

#[derive(Debug)]
pub enum PageStatus {
  Decoded(DecodeReport),
  /// 任何失败都只能转人工录入或重新扫描，不会自动填入猜测的学号
  ManualEntry(PageFailure),
}

#[derive(Debug)]
pub struct PageOutcome {
  pub source: PathBuf,
  pub status: PageStatus,
  pub elapsed: Duration,
  /// 全部候选在本页图像上的位置，图像无法解码时为空
  pub candidates: Vec<Mark>,
}

impl PageOutcome {
  pub fn id(&self) -> Option<&str> {
    match &self.status {
      PageStatus::Decoded(report) => Some(&report.id),
      PageStatus::ManualEntry(_) => None,
    }
  }

  pub fn is_decoded(&self) -> bool {
    matches!(self.status, PageStatus::Decoded(_))
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
  pub pages: usize,
  pub decoded: usize,
  pub manual_entry: usize,
}

impl TaskSummary {
  fn count(&mut self, outcome: &PageOutcome) {
    self.pages += 1;
    if outcome.is_decoded() {
      self.decoded += 1;
    } else {
      self.manual_entry += 1;
    }
  }
}

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<TaskSummary, Self::Error>;
}

/// 在工作线程中识别，超过 `timeout` 仍未完成时只判定本页失败
///
/// 超时的线程不会被强制终止，它只读共享图像，结束后结果被丢弃。
pub fn decode_with_timeout<M>(
  model: &M,
  image: Arc<DynamicImage>,
  timeout: Option<Duration>,
) -> Result<DecodeReport, PageFailure>
where
  M: Model<DynamicImage, Output = DecodeReport, Error = DecodeError> + Clone + Send + 'static,
{
  let Some(timeout) = timeout else {
    return model.infer(&image).map_err(PageFailure::from);
  };

  let (tx, rx) = mpsc::channel();
  let worker = model.clone();
  thread::spawn(move || {
    let _ = tx.send(worker.infer(&image));
  });

  match rx.recv_timeout(timeout) {
    Ok(result) => result.map_err(PageFailure::from),
    Err(RecvTimeoutError::Timeout) => Err(PageFailure::TimedOut(timeout)),
    Err(RecvTimeoutError::Disconnected) => Err(PageFailure::WorkerLost),
  }
}

fn process_page<M, O>(
  page: ScanPage,
  model: &M,
  output: &O,
  timeout: Option<Duration>,
) -> Result<PageOutcome, O::Error>
where
  M: Model<DynamicImage, Output = DecodeReport, Error = DecodeError> + Clone + Send + 'static,
  O: Render<DynamicImage, PageOutcome>,
{
  let ScanPage { source, content } = page;
  let now = Instant::now();

  let (image, status, candidates) = match content {
    Ok(image) => {
      let image = Arc::new(image);
      let status = match decode_with_timeout(model, Arc::clone(&image), timeout) {
        Ok(report) => PageStatus::Decoded(report),
        Err(failure) => PageStatus::ManualEntry(failure),
      };
      let candidates = model.candidates(&*image);
      (Some(image), status, candidates)
    }
    Err(err) => {
      error!("无法解码扫描件 {}: {}", source.display(), err);
      (None, PageStatus::ManualEntry(PageFailure::Decode(err)), Vec::new())
    }
  };

  let outcome = PageOutcome {
    source,
    status,
    elapsed: now.elapsed(),
    candidates,
  };

  match &outcome.status {
    PageStatus::Decoded(report) => info!(
      "{} 识别为 {}, 耗时: {:.2?}",
      outcome.source.display(),
      report.id,
      outcome.elapsed
    ),
    PageStatus::ManualEntry(failure) => warn!(
      "{} 转人工录入 ({}): {}",
      outcome.source.display(),
      failure.kind(),
      failure
    ),
  }

  output.render_result(image.as_deref(), &outcome)?;
  Ok(outcome)
}

pub struct OneShotTask;

impl<I, M, O, RE> Task<I, M, O> for OneShotTask
where
  I: Iterator<Item = ScanPage>,
  M: Model<DynamicImage, Output = DecodeReport, Error = DecodeError> + Clone + Send + 'static,
  O: Render<DynamicImage, PageOutcome, Error = RE>,
  RE: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let page = input.next().ok_or_else(|| anyhow::anyhow!("没有输入扫描件"))?;
    let outcome = process_page(page, &model, &output, None)?;

    let mut summary = TaskSummary::default();
    summary.count(&outcome);
    Ok(summary)
  }
}

/// 重复识别同一页，用于测量识别耗时
pub struct RepeatShotTask {
  repeat: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat: 100 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat.max(1);
    self
  }
}

impl<I, M, O, RE> Task<I, M, O> for RepeatShotTask
where
  I: Iterator<Item = ScanPage>,
  M: Model<DynamicImage, Output = DecodeReport, Error = DecodeError> + Clone + Send + 'static,
  O: Render<DynamicImage, PageOutcome, Error = RE>,
  RE: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let page = input.next().ok_or_else(|| anyhow::anyhow!("没有输入扫描件"))?;
    let source = page.source;
    let image = page.content?;
    info!("扫描件读取成功，开始识别...");

    let mut summary = TaskSummary::default();
    let candidates = model.candidates(&image);
    let mut times = Vec::with_capacity(self.repeat);
    for i in 0..self.repeat {
      let now = Instant::now();
      let status = match model.infer(&image) {
        Ok(report) => PageStatus::Decoded(report),
        Err(err) => PageStatus::ManualEntry(PageFailure::Decode(err)),
      };
      let elapsed = now.elapsed();
      info!("({})识别完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);

      let outcome = PageOutcome {
        source: source.clone(),
        status,
        elapsed,
        candidates: if i == 0 { candidates.clone() } else { Vec::new() },
      };
      summary.count(&outcome);
      // 只记录首次结果，避免重复输出
      if i == 0 {
        output.render_result(Some(&image), &outcome)?;
      }
    }

    // 跳过预热的前两次
    let warm = if times.len() > 2 { &times[2..] } else { &times[..] };
    warn!(
      "平均识别时间: {:.2?}",
      warm.iter().sum::<Duration>() / warm.len() as u32
    );

    Ok(summary)
  }
}

/// 逐页识别整批扫描件
#[derive(Default, Debug)]
pub struct BatchTask {
  timeout: Option<Duration>,
  page_limit: Option<usize>,
  handle_interrupt: bool,
}

impl BatchTask {
  /// 单页识别超时，超时只影响当前页
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_page_limit(mut self, page_limit: Option<usize>) -> Self {
    self.page_limit = page_limit;
    self
  }

  /// 安装 Ctrl-C 处理，收到信号后处理完当前页即退出
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<I, M, O, RE> Task<I, M, O> for BatchTask
where
  I: Iterator<Item = ScanPage>,
  M: Model<DynamicImage, Output = DecodeReport, Error = DecodeError> + Clone + Send + 'static,
  O: Render<DynamicImage, PageOutcome, Error = RE>,
  RE: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let (tx, rx) = mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，处理完当前页后退出...");
        let _ = tx.send(());
      })?;
    }

    let mut summary = TaskSummary::default();
    for page in input {
      if self.page_limit.is_some_and(|n| summary.pages >= n) {
        info!("达到指定页数 {}, 退出任务循环", summary.pages);
        break;
      }

      let outcome = process_page(page, &model, &output, self.timeout)?;
      summary.count(&outcome);

      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!(
      "任务完成: 共 {} 页, 识别 {} 页, 转人工录入 {} 页",
      summary.pages, summary.decoded, summary.manual_entry
    );
    Ok(summary)
  }
}
