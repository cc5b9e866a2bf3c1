//! Run configuration
//!
//! Settings for one invocation of the calculator: which formulas to run,
//! how much precision to carry, and the output/observability switches.
//! A config can come from a TOML file, from CLI flags, or both (the CLI
//! overrides the file); every field has a default so an empty config is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PiError, Result};

/// Default capacity scale, chosen so the series length stays inside the
/// 16-bit term-index ceiling: roughly `span / 2` iterations regardless
/// of the formula.
pub const DEFAULT_INDEX_SPAN: u32 = 65536;

/// Settings for a calculator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Print only the first and last ten groups of digits to bound
    /// console volume
    #[serde(default)]
    pub suppress_middle_digits: bool,

    /// Evaluate on the calling thread instead of offloading to the
    /// worker
    #[serde(default)]
    pub serial: bool,

    /// Emit a trace event around each offloaded batch, for
    /// observability only
    #[serde(default)]
    pub activity_indicator: bool,

    /// Capacity scale: the word capacity for a formula is derived from
    /// this and the first term's ratio
    #[serde(default = "default_index_span")]
    pub index_span: u32,

    /// Formula names to run; empty means the whole catalog
    #[serde(default)]
    pub formulas: Vec<String>,
}

fn default_index_span() -> u32 {
    DEFAULT_INDEX_SPAN
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            suppress_middle_digits: false,
            serial: false,
            activity_indicator: false,
            index_span: DEFAULT_INDEX_SPAN,
            formulas: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| PiError::Config(format!("{}: {}", path.display(), e)))
    }
}
