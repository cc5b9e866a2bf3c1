//! Error handling for machin-pi
//!
//! This module defines the crate error type and a Result alias used
//! throughout the crate. Every variant here is fatal to the computation
//! that raised it: the arithmetic engine and the pipeline never hand a
//! recoverable error back to their callers, they propagate up to the
//! binary's top-level handler which logs the failure and exits non-zero.

use thiserror::Error;

/// Main error type for machin-pi operations
#[derive(Error, Debug)]
pub enum PiError {
    /// Logical right shift outside the supported `[0, 31]` bit range
    #[error("shift out of range: {0}")]
    ShiftOutOfRange(u32),

    /// A divisor that cannot be decomposed into supported scalar divides
    #[error("divisor too large to decompose: {0}")]
    DivisorTooLarge(u32),

    /// A formula term with out-of-range fields
    #[error("formula error: {0}")]
    Formula(String),

    /// The worker thread went away while commands or completions were
    /// still expected
    #[error("pipeline channel closed: {0}")]
    PipelineClosed(&'static str),

    /// A command needed the worker's held buffer but none was loaded
    #[error("pipeline protocol violation: {0}")]
    Protocol(&'static str),

    /// The power buffer was still shared after a barrier completed
    #[error("power buffer still shared after barrier")]
    BufferShared,

    /// The worker thread panicked
    #[error("worker thread panicked")]
    WorkerPanicked,

    /// Errors related to configuration loading
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors (config files, thread spawn)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for machin-pi operations
pub type Result<T> = std::result::Result<T, PiError>;
