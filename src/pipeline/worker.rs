//! Pipeline worker loop
//!
//! A single long-lived thread that drains the command queue in FIFO
//! order. Real operations execute synchronously against the buffer the
//! worker currently holds, accumulating busy-time and count metrics; a
//! barrier posts a completion carrying that buffer (or the batch's first
//! fault) back to the evaluator. The loop ends when the command channel
//! disconnects, and the metrics travel back through the thread's join
//! handle so they end up owned by the formula run that spawned it.
//!
//! Faults inside a batch - an out-of-range shift, or an operation
//! arriving with no buffer loaded - do not kill the worker. The fault is
//! recorded, the rest of the batch is skipped, and the error surfaces on
//! the producer side when it waits on the barrier.

use crate::error::{PiError, Result};
use crate::fixed::Fixed;
use crate::pipeline::{ActivityHook, Command, Completion};
use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

/// Busy time and operation count accumulated by one worker.
#[derive(Debug, Clone, Default)]
pub struct WorkerMetrics {
    /// Total time spent executing commands
    pub busy: Duration,
    /// Number of non-barrier commands executed
    pub executed: u64,
}

/// The consumer side of the pipeline.
pub(crate) struct Worker {
    commands: Receiver<Command>,
    completions: Sender<Completion>,
    /// Buffer owned by the worker between a `Load` and the next barrier
    bench: Option<Fixed>,
    /// First fault of the current batch, delivered at the barrier
    fault: Option<PiError>,
    metrics: WorkerMetrics,
    activity: Option<ActivityHook>,
}

impl Worker {
    pub(crate) fn new(
        commands: Receiver<Command>,
        completions: Sender<Completion>,
        activity: Option<ActivityHook>,
    ) -> Self {
        Self {
            commands,
            completions,
            bench: None,
            fault: None,
            metrics: WorkerMetrics::default(),
            activity,
        }
    }

    /// Run until the command channel disconnects; returns the metrics.
    pub(crate) fn run(mut self) -> WorkerMetrics {
        tracing::debug!("pipeline worker started");
        loop {
            self.signal(false);
            let Ok(command) = self.commands.recv() else {
                break;
            };
            self.signal(true);

            if let Command::Barrier = command {
                let completion = match self.fault.take() {
                    Some(err) => Err(err),
                    None => self
                        .bench
                        .take()
                        .ok_or(PiError::Protocol("barrier with no held buffer")),
                };
                if self.completions.send(completion).is_err() {
                    break;
                }
                continue;
            }

            if self.fault.is_some() {
                // batch already failed; drop the rest of it
                continue;
            }
            let t0 = Instant::now();
            if let Err(err) = self.execute(command) {
                tracing::error!("pipeline operation failed: {}", err);
                self.fault = Some(err);
            }
            self.metrics.busy += t0.elapsed();
            self.metrics.executed += 1;
        }
        tracing::debug!(
            "pipeline worker stopped after {} operations",
            self.metrics.executed
        );
        self.metrics
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Load { mut dst, src } => {
                if self.bench.is_some() {
                    return Err(PiError::Protocol("load with a buffer already held"));
                }
                dst.copy_window(&src);
                self.bench = Some(dst);
                Ok(())
            }
            Command::Add(src) => {
                self.bench_mut()?.add(&src);
                Ok(())
            }
            Command::Sub(src) => {
                self.bench_mut()?.sub(&src);
                Ok(())
            }
            Command::MulScalar(m) => {
                self.bench_mut()?.mul_scalar_assign(m);
                Ok(())
            }
            Command::DivScalar(d) => {
                self.bench_mut()?.div_scalar_assign(d);
                Ok(())
            }
            Command::ShiftRight(shift) => self.bench_mut()?.shift_right_assign(shift),
            Command::Barrier => unreachable!("barriers are handled in the loop"),
        }
    }

    fn bench_mut(&mut self) -> Result<&mut Fixed> {
        self.bench
            .as_mut()
            .ok_or(PiError::Protocol("operation with no held buffer"))
    }

    fn signal(&self, busy: bool) {
        if let Some(hook) = &self.activity {
            hook(busy);
        }
    }
}
