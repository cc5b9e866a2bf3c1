//! machin-pi - Main Entry Point
//!
//! Command-line front end for the pipelined pi calculator: picks
//! formulas from the catalog, layers CLI flags over an optional TOML
//! config, and prints one report per formula. All fatal conditions
//! propagate here and exit non-zero through a single handler.

use anyhow::bail;
use clap::Parser;
use machin_pi::{
    config::RunConfig,
    driver::run_formula,
    formula::{self, Formula, CATALOG},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "machin-pi",
    version,
    about = "Compute digits of pi with pipelined Machin-like formulas"
)]
struct Cli {
    /// Formula names to run (default: the whole catalog)
    formulas: Vec<String>,

    /// Load settings from a TOML file (flags below override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the known formulas and exit
    #[arg(long)]
    list: bool,

    /// Evaluate on one thread, without the pipeline worker
    #[arg(long)]
    serial: bool,

    /// Print only the first and last ~10 groups of digits
    #[arg(long)]
    suppress_middle: bool,

    /// Emit a trace event around each offloaded batch
    #[arg(long)]
    activity: bool,

    /// Capacity scale; larger means more digits and more work
    #[arg(long, value_name = "SPAN")]
    index_span: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.list {
        for f in CATALOG {
            println!("{:<16} {}", f.name, f);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if cli.serial {
        config.serial = true;
    }
    if cli.suppress_middle {
        config.suppress_middle_digits = true;
    }
    if cli.activity {
        config.activity_indicator = true;
    }
    if let Some(span) = cli.index_span {
        config.index_span = span;
    }
    if !cli.formulas.is_empty() {
        config.formulas = cli.formulas.clone();
    }

    let selected: Vec<&Formula> = if config.formulas.is_empty() {
        CATALOG.iter().collect()
    } else {
        let mut picked = Vec::with_capacity(config.formulas.len());
        for name in &config.formulas {
            match formula::find(name) {
                Some(f) => picked.push(f),
                None => bail!("unknown formula: {} (try --list)", name),
            }
        }
        picked
    };

    for f in selected {
        println!("\ncalculate Pi using {}'s formula", f.name);
        println!("{}", f);
        let report = run_formula(f, &config)?;
        print!("{}", report.render(config.suppress_middle_digits));
    }
    println!("\ndone!");

    Ok(())
}
