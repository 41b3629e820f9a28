//! Output formatting for lint results.

use anyhow::Result;
use layer_lint_core::{LintResult, Severity, ViolationDiagnostic};
use miette::{NamedSource, Report};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::OutputFormat;

/// Source text of reported files, keyed by the path shown in violations.
pub type Sources = BTreeMap<PathBuf, String>;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, sources: &Sources) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, sources),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line(),
            violation.location.column(),
        );
        println!("  {}: {}", severity_indicator, violation.message);
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s) in {} file(s) ({} excluded)\x1b[0m",
        summary_color, errors, warnings, result.files_checked, result.files_excluded
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, sources: &Sources) {
    for violation in &result.violations {
        let diagnostic = ViolationDiagnostic::from(violation);
        match sources.get(&violation.location.file) {
            Some(text) => {
                let name = violation.location.file.display().to_string();
                let report =
                    Report::new(diagnostic).with_source_code(NamedSource::new(name, text.clone()));
                println!("{report:?}");
            }
            None => println!("{}", violation.format()),
        }
    }

    print_summary(result);
}
