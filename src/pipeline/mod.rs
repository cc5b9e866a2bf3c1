//! Deferred-operation pipeline between the series evaluator and its
//! worker thread
//!
//! The series evaluator overlaps the two independent sub-chains of each
//! Taylor iteration: while it divides the current power term and folds it
//! into the accumulator, the next power term is being advanced on a
//! second thread. This module is the boundary between the two.
//!
//! # Architecture
//!
//! Two bounded crossbeam channels connect producer and consumer:
//!
//! - [`Command`] - deferred arithmetic operations plus a barrier,
//!   submitted by the evaluator, executed in FIFO order by the worker
//! - completions - one message per [`Command::Barrier`], carrying the
//!   worker's held buffer back (or the first fault of the batch)
//!
//! `submit` blocks indefinitely when the command queue is full
//! (backpressure); [`Pipeline::wait`] blocks until a barrier completion
//! arrives. These are the only synchronization points; there is no
//! per-operation acknowledgment and no timeout, because a stuck worker
//! is a bug and not a runtime condition to paper over.
//!
//! # Buffer ownership
//!
//! Each ping-pong buffer is exclusively owned by one side at any
//! instant. Ownership moves *inside* the channel messages: a
//! [`Command::Load`] transfers the destination buffer to the worker, the
//! barrier completion transfers it back. The shared source is an
//! `Arc<Fixed>` snapshot the worker only reads and drops before posting
//! the completion, so after a `wait` the producer can reclaim sole
//! ownership of it. A violation of this discipline surfaces as an error,
//! not a data race.

pub mod worker;

pub use worker::WorkerMetrics;

use crate::error::{PiError, Result};
use crate::fixed::Fixed;
use crate::formula::Step;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use worker::Worker;

/// Command queue depth (evaluator to worker).
pub const COMMAND_QUEUE_DEPTH: usize = 32;
/// Completion queue depth (worker to evaluator).
pub const COMPLETION_QUEUE_DEPTH: usize = 32;

/// Observability callback toggled around the worker's blocking receive:
/// `false` while idle, `true` while holding a command.
///
/// Stands in for the original's activity LED; the binary wires a tracing
/// hook when the `activity_indicator` option is set.
pub type ActivityHook = Box<dyn Fn(bool) + Send>;

/// A deferred operation on the worker's held buffer, or a barrier.
///
/// A well-formed batch is `Load`, zero or more operations, `Barrier`.
#[derive(Debug)]
pub enum Command {
    /// Transfer `dst` to the worker and seed it from `src`'s window
    Load {
        /// Buffer the worker holds until the next barrier
        dst: Fixed,
        /// Shared read-only source, dropped before the barrier completes
        src: Arc<Fixed>,
    },
    /// Add `src`'s window into the held buffer
    Add(Arc<Fixed>),
    /// Subtract `src`'s window from the held buffer
    Sub(Arc<Fixed>),
    /// Multiply the held buffer by a scalar
    MulScalar(u32),
    /// Divide the held buffer by a scalar
    DivScalar(u32),
    /// Shift the held buffer right by a bit count
    ShiftRight(u32),
    /// Post a completion carrying the held buffer back
    Barrier,
}

impl From<Step> for Command {
    fn from(step: Step) -> Self {
        match step {
            Step::MulScalar(m) => Command::MulScalar(m),
            Step::DivScalar(d) => Command::DivScalar(d),
            Step::ShiftRight(shift) => Command::ShiftRight(shift),
        }
    }
}

/// One message per barrier: the held buffer, or the batch's first fault.
pub(crate) type Completion = Result<Fixed>;

/// Where the series evaluator sends the one-iteration-ahead advance of
/// its power term.
///
/// [`Pipeline`] runs batches on the worker thread; [`Inline`] executes
/// them on the calling thread. Both consume the same [`Step`] plan, so a
/// formula evaluated through either produces bit-identical results.
pub trait Offload {
    /// Queue the batch that seeds `dst` from `src` and applies `steps`,
    /// ending with a barrier.
    fn submit_batch(&mut self, dst: Fixed, src: Arc<Fixed>, steps: &[Step]) -> Result<()>;

    /// Block until the queued batch has finished and reclaim its buffer.
    fn wait(&mut self) -> Result<Fixed>;
}

/// Producer-side handle to the worker thread.
pub struct Pipeline {
    commands: Sender<Command>,
    completions: Receiver<Completion>,
    handle: JoinHandle<WorkerMetrics>,
    wait_time: Duration,
}

/// Metrics owned by one formula run: the worker's view plus the
/// producer-side time spent blocked on barriers.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Busy time and operation count accumulated by the worker
    pub metrics: WorkerMetrics,
    /// Cumulative time the evaluator spent blocked in [`Pipeline::wait`]
    pub wait: Duration,
}

impl Pipeline {
    /// Spawn the worker thread and its queue pair.
    ///
    /// Failure to create the thread is fatal at startup, per the error
    /// policy; queue creation itself cannot fail.
    pub fn spawn(activity: Option<ActivityHook>) -> Result<Self> {
        let (commands, command_rx) = bounded(COMMAND_QUEUE_DEPTH);
        let (completion_tx, completions) = bounded(COMPLETION_QUEUE_DEPTH);
        let worker = Worker::new(command_rx, completion_tx, activity);
        let handle = std::thread::Builder::new()
            .name("pi-worker".into())
            .spawn(move || worker.run())?;
        Ok(Self {
            commands,
            completions,
            handle,
            wait_time: Duration::ZERO,
        })
    }

    /// Enqueue one command, blocking while the queue is full.
    pub fn submit(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PiError::PipelineClosed("command queue"))
    }

    /// Block until the worker has processed a barrier, proving every
    /// command submitted before it has finished, and take back the
    /// buffer the batch was working on.
    pub fn wait(&mut self) -> Result<Fixed> {
        let t0 = Instant::now();
        let completion = self
            .completions
            .recv()
            .map_err(|_| PiError::PipelineClosed("completion queue"))?;
        self.wait_time += t0.elapsed();
        completion
    }

    /// Shut the worker down and collect the run's metrics.
    pub fn finish(self) -> Result<PipelineReport> {
        drop(self.commands);
        let metrics = self.handle.join().map_err(|_| PiError::WorkerPanicked)?;
        Ok(PipelineReport {
            metrics,
            wait: self.wait_time,
        })
    }
}

impl Offload for Pipeline {
    fn submit_batch(&mut self, dst: Fixed, src: Arc<Fixed>, steps: &[Step]) -> Result<()> {
        self.submit(Command::Load { dst, src })?;
        for &step in steps {
            self.submit(step.into())?;
        }
        self.submit(Command::Barrier)
    }

    fn wait(&mut self) -> Result<Fixed> {
        Pipeline::wait(self)
    }
}

/// Same-thread stand-in for the pipeline.
///
/// Used by the serial mode and by the determinism tests: batches run
/// immediately on submit, `wait` just hands the finished buffer back.
#[derive(Default)]
pub struct Inline {
    pending: Option<Fixed>,
}

impl Offload for Inline {
    fn submit_batch(&mut self, mut dst: Fixed, src: Arc<Fixed>, steps: &[Step]) -> Result<()> {
        dst.copy_window(&src);
        for step in steps {
            step.apply(&mut dst)?;
        }
        self.pending = Some(dst);
        Ok(())
    }

    fn wait(&mut self) -> Result<Fixed> {
        self.pending
            .take()
            .ok_or(PiError::Protocol("wait with no batch submitted"))
    }
}
