//! End-to-end formula runs through the public driver API

use machin_pi::{config::RunConfig, driver::run_formula, formula};

/// First 50 fraction digits of pi.
const PI_50: &str = "14159265358979323846264338327950288419716939937510";

fn config(span: u32, serial: bool) -> RunConfig {
    RunConfig {
        index_span: span,
        serial,
        ..RunConfig::default()
    }
}

#[test]
fn test_machin_fifty_digits_pipelined() {
    let machin = formula::find("Machin").unwrap();
    let report = run_formula(machin, &config(256, false)).unwrap();
    assert_eq!(report.digits.integer, 3);
    assert!(
        report.digits.fraction_string().starts_with(PI_50),
        "got {}...",
        &report.digits.fraction_string()[..50]
    );
}

#[test]
fn test_machin_fifty_digits_serial() {
    let machin = formula::find("Machin").unwrap();
    let report = run_formula(machin, &config(256, true)).unwrap();
    assert!(report.digits.fraction_string().starts_with(PI_50));
}

#[test]
fn test_serial_and_pipelined_agree_bit_for_bit() {
    let machin = formula::find("Machin").unwrap();
    let serial = run_formula(machin, &config(256, true)).unwrap();
    let pipelined = run_formula(machin, &config(256, false)).unwrap();
    assert_eq!(serial.digits, pipelined.digits);
    assert_eq!(serial.term_counts, pipelined.term_counts);
}

#[test]
fn test_formulas_agree_on_leading_digits() {
    // Independent identities must produce the same pi. Gauss covers
    // plain divides, Stormer the shift path, Euler a dividend above 1.
    for name in ["Gauss", "Stormer", "Euler"] {
        let f = formula::find(name).unwrap();
        let report = run_formula(f, &config(256, false)).unwrap();
        assert_eq!(report.digits.integer, 3, "{}", name);
        assert!(
            report.digits.fraction_string().starts_with(PI_50),
            "{} diverged: {}...",
            name,
            &report.digits.fraction_string()[..50]
        );
    }
}

#[test]
fn test_term_counts_match_closed_form() {
    let machin = formula::find("Machin").unwrap();
    let report = run_formula(machin, &config(256, false)).unwrap();
    for (count, term) in report.term_counts.iter().zip(machin.terms) {
        let budget = term.iteration_budget(report.capacity);
        assert!(
            count.abs_diff(budget) <= 1,
            "term {} summed {} vs estimate {}",
            term,
            count,
            budget
        );
    }
}

#[test]
fn test_whole_catalog_runs_at_small_span() {
    for f in formula::CATALOG {
        let report = run_formula(f, &config(128, false)).unwrap();
        assert_eq!(report.digits.integer, 3, "{}", f.name);
        assert!(
            report.digits.fraction_string().starts_with("14159265358979"),
            "{} diverged",
            f.name
        );
        assert_eq!(report.term_counts.len(), f.terms.len());
    }
}

#[test]
fn test_report_mentions_all_factors() {
    let gauss = formula::find("Gauss").unwrap();
    let report = run_formula(gauss, &config(128, true)).unwrap();
    let rendered = report.render(false);
    let sum: usize = report.term_counts.iter().sum();
    assert!(rendered.contains(&format!(" = {}\n", sum)));
    assert!(rendered.contains("digits"));
    assert!(rendered.contains("wait time:"));
}
