//! Machin-like formula table and divisor decomposition
//!
//! A Machin-like formula expresses `pi/4` as an integer-weighted sum of
//! `arctan(dividend/divisor)` terms for small integers. This module holds
//! the static catalog of known formulas and the per-term planning that
//! turns a divisor into the sequence of scalar operations the arithmetic
//! engine supports.
//!
//! # Divisor decomposition
//!
//! The engine only divides by one 32-bit scalar at a time, and the
//! long-division remainder discipline keeps each divisor under 2^16 per
//! step. The planner maps a term onto that:
//!
//! - power-of-two divisors become logical right shifts;
//! - divisors below 65536 become one divide (or `d^2` in a single divide
//!   when `d < 256`);
//! - larger divisors are split into two factors below 65536, when they
//!   have such a factorization (Takano's 110443 = 179 * 617), and divided
//!   through factor by factor.
//!
//! Anything else is a fatal configuration error.

use std::fmt;

use crate::error::{PiError, Result};
use crate::fixed::Fixed;

/// One `coeff * arctan(dividend/divisor)` term of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Integer weight, negative for subtracted terms
    pub coeff: i32,
    /// Numerator of the arctangent argument
    pub dividend: u32,
    /// Denominator of the arctangent argument
    pub divisor: u32,
}

impl Term {
    /// Const constructor for the static catalog.
    pub const fn new(coeff: i32, dividend: u32, divisor: u32) -> Self {
        Self {
            coeff,
            dividend,
            divisor,
        }
    }

    /// Plan for dividing a freshly set integer by `divisor`: the first
    /// series term `x = value / divisor`.
    pub fn reciprocal_steps(&self) -> Result<Vec<Step>> {
        let d = self.divisor;
        if let Some(shift) = pow2_shift(d) {
            return Ok(vec![Step::ShiftRight(shift)]);
        }
        if d < 65536 {
            return Ok(vec![Step::DivScalar(d)]);
        }
        let (f1, f2) = split_u16(d).ok_or(PiError::DivisorTooLarge(d))?;
        Ok(vec![Step::DivScalar(f1), Step::DivScalar(f2)])
    }

    /// Plan for advancing the power term by `x^2`: multiply by
    /// `dividend^2`, then divide by `divisor^2` in supported pieces.
    pub fn square_steps(&self) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        if self.dividend > 1 {
            let m = self
                .dividend
                .checked_mul(self.dividend)
                .ok_or_else(|| PiError::Formula(format!("dividend too large: {}", self.dividend)))?;
            steps.push(Step::MulScalar(m));
        }
        let d = self.divisor;
        if let Some(shift) = pow2_shift(d) {
            steps.push(Step::ShiftRight(2 * shift));
        } else if d < 65536 {
            push_square_divides(&mut steps, d);
        } else {
            let (f1, f2) = split_u16(d).ok_or(PiError::DivisorTooLarge(d))?;
            push_square_divides(&mut steps, f1);
            push_square_divides(&mut steps, f2);
        }
        Ok(steps)
    }

    /// Closed-form estimate of the series length at a given word
    /// capacity: the least number of terms whose tail falls below the
    /// representable precision.
    pub fn iteration_budget(&self, capacity: usize) -> usize {
        let ratio = f64::from(self.divisor) / f64::from(self.dividend);
        ((capacity as f64 - 1.0) * 32.0 * std::f64::consts::LN_2 / (2.0 * ratio.ln()) + 1.0)
            as usize
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:+}*arctan({}/{})",
            self.coeff, self.dividend, self.divisor
        )
    }
}

/// Divide by `d^2`, either as one scalar when it stays below 2^16 or as
/// two divides by `d`.
fn push_square_divides(steps: &mut Vec<Step>, d: u32) {
    if d < 256 {
        steps.push(Step::DivScalar(d * d));
    } else {
        steps.push(Step::DivScalar(d));
        steps.push(Step::DivScalar(d));
    }
}

/// Shift amount for power-of-two divisors small enough that both the
/// reciprocal and the squared plan stay within a 31-bit shift.
fn pow2_shift(d: u32) -> Option<u32> {
    if d > 1 && d.is_power_of_two() && d.trailing_zeros() <= 15 {
        Some(d.trailing_zeros())
    } else {
        None
    }
}

/// Split `d` into two factors that both fit in 16 bits, preferring the
/// smallest leading factor.
fn split_u16(d: u32) -> Option<(u32, u32)> {
    let mut f = 2u32;
    while u64::from(f) * u64::from(f) <= u64::from(d) {
        if d % f == 0 && d / f <= u32::from(u16::MAX) {
            return Some((f, d / f));
        }
        f += 1;
    }
    None
}

/// One deferred scalar operation on a power-term buffer.
///
/// The same plan drives both the in-place synchronous path and the
/// offloaded pipeline path, so the two are identical by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Multiply the buffer by a scalar
    MulScalar(u32),
    /// Divide the buffer by a scalar
    DivScalar(u32),
    /// Shift the buffer right by a bit count
    ShiftRight(u32),
}

impl Step {
    /// Apply this step to a buffer in place.
    pub fn apply(self, buf: &mut Fixed) -> Result<()> {
        match self {
            Step::MulScalar(m) => buf.mul_scalar_assign(m),
            Step::DivScalar(d) => buf.div_scalar_assign(d),
            Step::ShiftRight(shift) => buf.shift_right_assign(shift)?,
        }
        Ok(())
    }
}

/// A named formula: an ordered list of terms summing to `pi/4`.
#[derive(Debug, Clone, Copy)]
pub struct Formula {
    /// Display name
    pub name: &'static str,
    /// Terms in evaluation order
    pub terms: &'static [Term],
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pi/4 = ")?;
        for term in self.terms {
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

/// The known Machin-like formulas, in the order they are run.
pub const CATALOG: &[Formula] = &[
    Formula {
        name: "Machin",
        terms: &[Term::new(4, 1, 5), Term::new(-1, 1, 239)],
    },
    Formula {
        name: "Klingenstierna",
        terms: &[
            Term::new(8, 1, 10),
            Term::new(-1, 1, 239),
            Term::new(-4, 1, 515),
        ],
    },
    Formula {
        name: "Euler",
        terms: &[Term::new(5, 1, 7), Term::new(2, 3, 79)],
    },
    Formula {
        name: "Euler (2)",
        terms: &[
            Term::new(4, 1, 5),
            Term::new(-1, 1, 70),
            Term::new(1, 1, 99),
        ],
    },
    Formula {
        name: "Gauss",
        terms: &[
            Term::new(12, 1, 18),
            Term::new(8, 1, 57),
            Term::new(-5, 1, 239),
        ],
    },
    Formula {
        name: "Stormer",
        terms: &[
            Term::new(6, 1, 8),
            Term::new(2, 1, 57),
            Term::new(1, 1, 239),
        ],
    },
    Formula {
        name: "Stormer (2)",
        terms: &[
            Term::new(44, 1, 57),
            Term::new(7, 1, 239),
            Term::new(-12, 1, 682),
            Term::new(24, 1, 12943),
        ],
    },
    Formula {
        name: "Takano",
        terms: &[
            Term::new(12, 1, 49),
            Term::new(32, 1, 57),
            Term::new(-5, 1, 239),
            Term::new(12, 1, 110443),
        ],
    },
];

/// Look up a catalog formula by case-insensitive name.
pub fn find(name: &str) -> Option<&'static Formula> {
    CATALOG.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reciprocal_small_divisor() {
        let t = Term::new(4, 1, 5);
        assert_eq!(t.reciprocal_steps().unwrap(), vec![Step::DivScalar(5)]);
    }

    #[test]
    fn test_reciprocal_power_of_two() {
        let t = Term::new(6, 1, 8);
        assert_eq!(t.reciprocal_steps().unwrap(), vec![Step::ShiftRight(3)]);
        assert_eq!(t.square_steps().unwrap(), vec![Step::ShiftRight(6)]);
    }

    #[test]
    fn test_reciprocal_split_divisor() {
        let t = Term::new(12, 1, 110443);
        assert_eq!(
            t.reciprocal_steps().unwrap(),
            vec![Step::DivScalar(179), Step::DivScalar(617)]
        );
    }

    #[test]
    fn test_square_steps_thresholds() {
        // d < 256: one divide by d^2
        let t = Term::new(4, 1, 5);
        assert_eq!(t.square_steps().unwrap(), vec![Step::DivScalar(25)]);

        // 256 <= d < 65536: divide by d twice
        let t = Term::new(-4, 1, 515);
        assert_eq!(
            t.square_steps().unwrap(),
            vec![Step::DivScalar(515), Step::DivScalar(515)]
        );

        // split divisor: small factor squared, large factor twice
        let t = Term::new(12, 1, 110443);
        assert_eq!(
            t.square_steps().unwrap(),
            vec![
                Step::DivScalar(179 * 179),
                Step::DivScalar(617),
                Step::DivScalar(617)
            ]
        );
    }

    #[test]
    fn test_square_steps_with_dividend() {
        let t = Term::new(2, 3, 79);
        assert_eq!(
            t.square_steps().unwrap(),
            vec![Step::MulScalar(9), Step::DivScalar(79 * 79)]
        );
    }

    #[test]
    fn test_unsplittable_divisor_is_fatal() {
        // A prime above 2^16 has no 16-bit factor pair.
        let t = Term::new(1, 1, 65537);
        assert!(matches!(
            t.reciprocal_steps(),
            Err(PiError::DivisorTooLarge(65537))
        ));
        assert!(matches!(
            t.square_steps(),
            Err(PiError::DivisorTooLarge(65537))
        ));
    }

    #[test]
    fn test_catalog_plans_all_resolve() {
        for formula in CATALOG {
            for term in formula.terms {
                term.reciprocal_steps().unwrap();
                term.square_steps().unwrap();
            }
        }
    }

    #[test]
    fn test_formula_display() {
        let machin = find("machin").unwrap();
        assert_eq!(
            machin.to_string(),
            "pi/4 = +4*arctan(1/5)-1*arctan(1/239)"
        );
    }

    #[test]
    fn test_iteration_budget_machin() {
        let t = Term::new(4, 1, 5);
        let m = t.iteration_budget(206);
        let expect = (205.0 * 32.0 * std::f64::consts::LN_2 / (2.0 * 5f64.ln()) + 1.0) as usize;
        assert_eq!(m, expect);
        // more words, more terms
        assert!(t.iteration_budget(412) > m);
    }
}
