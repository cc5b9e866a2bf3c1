//! Formula driver
//!
//! Runs one formula end to end: derives the word capacity from the
//! configured index span, evaluates each arctangent term into the shared
//! accumulator (pipelined or serial per config), unparses the result,
//! and collects everything a caller needs to report - digits, per-term
//! counts, elapsed time, worker metrics, wait time. Rendering is a pure
//! function on the finished report so the console layout (including the
//! middle-digit suppression) is testable without running a computation.

use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::error::{PiError, Result};
use crate::fixed::{DecimalDigits, Fixed};
use crate::formula::{Formula, Term};
use crate::pipeline::{ActivityHook, Inline, Pipeline, WorkerMetrics};
use crate::series::arctan_series;

/// Word capacity for a formula at a given index span, from the first
/// term's ratio. Bigger ratios converge faster per term, so they earn
/// proportionally more words for the same series length.
pub fn capacity_words(index_span: u32, first: &Term) -> usize {
    let ratio = f64::from(first.divisor) / f64::from(first.dividend);
    let words =
        (f64::from(index_span) * ratio.ln() / (32.0 * std::f64::consts::LN_2) + 1.0) as usize;
    words.max(2) & !1
}

/// Everything one formula run produced.
#[derive(Debug, Clone)]
pub struct FormulaReport {
    /// Formula name
    pub name: &'static str,
    /// Symbolic `pi/4 = ...` expansion
    pub expansion: String,
    /// Word capacity the run used
    pub capacity: usize,
    /// Unparsed decimal result
    pub digits: DecimalDigits,
    /// Series terms summed per arctangent
    pub term_counts: Vec<usize>,
    /// Wall-clock computation time (excludes unparsing)
    pub elapsed: Duration,
    /// Worker busy time and operation count
    pub worker: WorkerMetrics,
    /// Producer time spent blocked on barriers
    pub wait: Duration,
}

/// Compute one formula under the given config.
pub fn run_formula(formula: &Formula, config: &RunConfig) -> Result<FormulaReport> {
    let first = formula
        .terms
        .first()
        .ok_or_else(|| PiError::Formula(format!("formula {} has no terms", formula.name)))?;
    let capacity = capacity_words(config.index_span, first);
    tracing::info!(
        "computing {} at {} words ({})",
        formula.name,
        capacity,
        if config.serial { "serial" } else { "pipelined" }
    );

    let mut pi = Fixed::new(capacity);
    let mut term_counts = Vec::with_capacity(formula.terms.len());
    let started = Instant::now();

    let (worker, wait) = if config.serial {
        let mut lane = Inline::default();
        for term in formula.terms {
            term_counts.push(arctan_series(&mut pi, term, &mut lane)?);
        }
        (WorkerMetrics::default(), Duration::ZERO)
    } else {
        let mut lane = Pipeline::spawn(activity_hook(config))?;
        for term in formula.terms {
            term_counts.push(arctan_series(&mut pi, term, &mut lane)?);
        }
        let report = lane.finish()?;
        (report.metrics, report.wait)
    };

    let elapsed = started.elapsed();
    let digits = pi.unparse_decimal();

    Ok(FormulaReport {
        name: formula.name,
        expansion: formula.to_string(),
        capacity,
        digits,
        term_counts,
        elapsed,
        worker,
        wait,
    })
}

fn activity_hook(config: &RunConfig) -> Option<ActivityHook> {
    if config.activity_indicator {
        Some(Box::new(|busy| tracing::trace!(busy, "worker activity")))
    } else {
        None
    }
}

impl FormulaReport {
    /// Console rendering of the result: digit groups ten to a line, the
    /// term-count sum, and the timing breakdown. With `suppress_middle`
    /// only the first and last ~10 groups are printed.
    pub fn render(&self, suppress_middle: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("pi = {}.\n", self.digits.integer));

        let total = self.digits.groups.len();
        let tail_start = total.saturating_sub(10 + total % 10);
        for (j, group) in self.digits.groups.iter().enumerate() {
            if suppress_middle {
                if j == 10 {
                    out.push_str("\tpi digits suppressed... rerun without suppression to print everything\n");
                }
                if j >= 10 && j < tail_start {
                    continue;
                }
            }
            out.push_str(&group.to_string());
            out.push(if j % 10 == 9 { '\n' } else { ' ' });
        }
        out.push_str(&format!("\n{} digits\n", self.digits.digit_count()));

        out.push_str("factors: ");
        for (i, count) in self.term_counts.iter().enumerate() {
            if i > 0 {
                out.push_str(" + ");
            }
            out.push_str(&count.to_string());
        }
        let sum: usize = self.term_counts.iter().sum();
        out.push_str(&format!(" = {}\n", sum));

        out.push_str(&format!("calc time = {} sec\n", fmt_secs(self.elapsed)));
        out.push_str(&format!(
            "worker time = {} sec, operation count = {}\n",
            fmt_secs(self.worker.busy),
            self.worker.executed
        ));
        out.push_str(&format!("wait time: {} sec\n", fmt_secs(self.wait)));
        out
    }
}

fn fmt_secs(d: Duration) -> String {
    format!("{}.{:06}", d.as_secs(), d.subsec_micros())
}
