//! # machin-pi: pipelined Machin-formula pi calculator
//!
//! Computes many digits of pi by summing Machin-like arctangent series
//! over a custom fixed-point multiple-precision representation, and
//! overlaps the two independent arithmetic sub-chains of each series
//! term across two threads.
//!
//! ## Architecture
//!
//! - **Arithmetic engine** ([`fixed`]): fixed-capacity 32-bit word
//!   vectors with an active significance window, and the in-place
//!   operations the series needs (add, sub, scalar mul/div, logical
//!   right shift, decimal unparse)
//! - **Series evaluator** ([`series`]): one arctangent Taylor series per
//!   call, folding terms into a shared accumulator while the next power
//!   term is advanced one iteration ahead
//! - **Pipeline** ([`pipeline`]): a worker thread behind bounded
//!   crossbeam channels, executing deferred engine calls in FIFO order
//!   with barrier-only synchronization and ping-pong buffer handoff
//! - **Formula driver** ([`driver`]): runs a formula from the static
//!   [`formula`] catalog end to end and reports digits, term counts and
//!   timing
//!
//! ## Example
//!
//! ```no_run
//! use machin_pi::{config::RunConfig, driver::run_formula, formula};
//!
//! fn main() -> machin_pi::Result<()> {
//!     let config = RunConfig {
//!         index_span: 4096,
//!         ..RunConfig::default()
//!     };
//!     let machin = formula::find("Machin").expect("catalog formula");
//!     let report = run_formula(machin, &config)?;
//!     println!("{}", report.render(config.suppress_middle_digits));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod fixed;
pub mod formula;
pub mod pipeline;
pub mod series;

// Re-export commonly used types
pub use config::RunConfig;
pub use driver::{run_formula, FormulaReport};
pub use error::{PiError, Result};
pub use fixed::{DecimalDigits, DigitGroup, Fixed};
pub use formula::{Formula, Step, Term, CATALOG};
pub use pipeline::{Command, Inline, Offload, Pipeline};
pub use series::arctan_series;
