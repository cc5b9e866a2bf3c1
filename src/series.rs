//! Arctangent Taylor series evaluation
//!
//! Computes `4 * coeff * arctan(dividend/divisor)` as a fixed-point
//! series `sum((-1)^i * x^(2i+1) / (2i+1))` and folds each term into a
//! caller-supplied accumulator, alternating add and subtract.
//!
//! # Pipelining
//!
//! Each iteration has two independent sub-chains: dividing the current
//! power term by `2i+1` and folding it into the accumulator, and
//! advancing the power term by `x^2` for the next iteration. The advance
//! is offloaded through [`Offload`] one iteration ahead of need, with
//! two power-term buffers in a ping-pong arrangement: while iteration
//! `i` consumes buffer A, the worker computes `B = A * x^2` for
//! iteration `i+1`, and the buffers swap roles at the barrier.
//!
//! The consumed buffer is held as an `Arc` while the worker reads it;
//! the worker drops its clone before the barrier completes, so the
//! producer reclaims sole ownership on every swap. On the very first
//! iteration there is nothing to await.

use std::sync::Arc;

use crate::error::{PiError, Result};
use crate::fixed::Fixed;
use crate::formula::Term;
use crate::pipeline::Offload;

/// Largest series index `n = 2i+1` the window representation supports.
///
/// Reaching it mid-series is a soft precision ceiling: the terms summed
/// so far already carry every representable bit, so the evaluator stops
/// early instead of failing.
pub const TERM_INDEX_CEILING: usize = u16::MAX as usize;

/// Sum `4 * coeff * arctan(dividend/divisor)` into `pi`.
///
/// Returns the number of series terms actually summed, which matches the
/// closed-form iteration budget unless the index ceiling cut the series
/// short.
pub fn arctan_series(pi: &mut Fixed, term: &Term, offload: &mut dyn Offload) -> Result<usize> {
    let capacity = pi.capacity();
    let mut work = Fixed::new(capacity);
    let mut term_buf = Fixed::new(capacity);

    let mut additive = term.coeff >= 0;
    let value = term
        .coeff
        .unsigned_abs()
        .checked_mul(4)
        .and_then(|v| v.checked_mul(term.dividend))
        .ok_or_else(|| PiError::Formula(format!("coefficient out of range: {}", term.coeff)))?;

    // First term: x = value / divisor, straight into the accumulator.
    work.set_int(value);
    for step in term.reciprocal_steps()? {
        step.apply(&mut work)?;
    }
    if additive {
        pi.add(&work);
    } else {
        pi.sub(&work);
    }
    additive = !additive;

    // Advance once to x^3: the running power term for i = 1. The same
    // plan is replayed by the offload for every later advance.
    let square = term.square_steps()?;
    for step in &square {
        step.apply(&mut work)?;
    }

    let budget = term.iteration_budget(capacity);
    let mut power = Arc::new(work);
    let mut spare = Some(Fixed::new(capacity));
    let mut summed = 1usize;

    for i in 1..budget {
        let n = 2 * i + 1;
        if n > TERM_INDEX_CEILING {
            tracing::warn!(
                "series index {} beyond the window ceiling, truncating after {} terms",
                n,
                summed
            );
            break;
        }

        if i > 1 {
            // Reclaim the advance submitted last iteration and swap the
            // ping-pong roles: the advanced buffer becomes the power
            // term, the consumed one becomes the next advance target.
            let advanced = offload.wait()?;
            let retired = Arc::try_unwrap(power).map_err(|_| PiError::BufferShared)?;
            power = Arc::new(advanced);
            spare = Some(retired);
        }

        if i + 1 < budget {
            if let Some(dst) = spare.take() {
                offload.submit_batch(dst, Arc::clone(&power), &square)?;
            }
        }

        term_buf.div_scalar(&power, n as u32);
        if additive {
            pi.add(&term_buf);
        } else {
            pi.sub(&term_buf);
        }
        additive = !additive;
        summed += 1;
    }

    // The ceiling can break the loop with an advance still in flight;
    // reclaim it before the buffers go away.
    if spare.is_none() {
        let _ = offload.wait()?;
    }
    Ok(summed)
}
