use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::bulk::{BatchOutcome, BatchReport};
use crate::features::{configured_range, Feature};
use crate::pipeline::{ErrorKind, ErrorReport};
use crate::report::{Bound, MetricCheck};

/// Format a price with two decimals: "$26.05"
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Single prediction line for the terminal
pub fn format_prediction(price: f64, use_colors: bool) -> String {
    if use_colors {
        format!("Predicted price: {}", format_price(price).green().bold())
    } else {
        format!("Predicted price: {}", format_price(price))
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "invalid",
        ErrorKind::MissingFeature => "missing",
        ErrorKind::Malformed => "malformed",
        ErrorKind::Internal => "internal",
    }
}

/// Format a failed prediction: "Rejected (invalid): invalid value for RM: ..."
pub fn format_error(report: &ErrorReport, use_colors: bool) -> String {
    let prefix = if report.kind == ErrorKind::Internal {
        "Failed"
    } else {
        "Rejected"
    };
    let head = format!("{} ({})", prefix, kind_label(report.kind));
    if use_colors {
        format!("{}: {}", head.red().bold(), report.message)
    } else {
        format!("{}: {}", head, report.message)
    }
}

fn format_outcome(outcome: &BatchOutcome, use_colors: bool) -> String {
    // 1-based index, right-aligned with trailing dot
    let index_str = format!("{:>3}.", outcome.index + 1);

    match (&outcome.prediction, &outcome.error) {
        (Some(price), _) => {
            let price_str = format!("{:>12}", format_price(*price));
            if use_colors {
                format!("{} {}", index_str.dimmed(), price_str.bold())
            } else {
                format!("{} {}", index_str, price_str)
            }
        }
        (None, Some(error)) => {
            let label = format!("{:>12}", kind_label(error.kind));
            if use_colors {
                format!("{} {}  {}", index_str.dimmed(), label.red(), error.message)
            } else {
                format!("{} {}  {}", index_str, label, error.message)
            }
        }
        (None, None) => index_str,
    }
}

/// Format a batch as one line per record followed by a summary line
pub fn format_batch_table(report: &BatchReport, use_colors: bool) -> String {
    if report.results.is_empty() {
        return "No records in batch.".to_string();
    }

    let mut lines: Vec<String> = report
        .results
        .iter()
        .map(|outcome| format_outcome(outcome, use_colors))
        .collect();

    let summary = format!(
        "{} records: {} predicted, {} failed",
        report.total, report.succeeded, report.failed
    );
    lines.push(String::new());
    if use_colors && report.failed > 0 {
        lines.push(summary.yellow().to_string());
    } else {
        lines.push(summary);
    }

    lines.join("\n")
}

fn format_bound(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{}", value)
    }
}

/// Feature catalogue: column order, accepted range and description
pub fn format_feature_table(use_colors: bool) -> String {
    Feature::ALL
        .iter()
        .map(|feature| {
            let range = match configured_range(feature.as_str()) {
                Some(r) => format!("[{}, {}]", format_bound(r.min), format_bound(r.max)),
                None => "unbounded".to_string(),
            };
            let name = format!("{:<8}", feature.as_str());
            let range = format!("{:<12}", range);
            if use_colors {
                format!("  {} {} {}", name.cyan(), range, feature.description().dimmed())
            } else {
                format!("  {} {} {}", name, range, feature.description())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Metrics with their threshold and a pass/fail marker
pub fn format_metric_checks(checks: &[MetricCheck], use_colors: bool) -> String {
    checks
        .iter()
        .map(|check| {
            let op = match check.bound {
                Bound::AtLeast => ">=",
                Bound::AtMost => "<=",
            };
            let status = if check.passed { "ok" } else { "FAIL" };
            let line = format!(
                "  {:<9} {:>8.3}  (want {} {})",
                check.metric, check.value, op, check.threshold
            );
            if use_colors {
                let status = if check.passed {
                    status.green().to_string()
                } else {
                    status.red().bold().to_string()
                };
                format!("{}  {}", line, status)
            } else {
                format!("{}  {}", line, status)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranked feature importances
pub fn format_importance(ranked: &[(String, f64)]) -> String {
    ranked
        .iter()
        .map(|(name, importance)| format!("  {:<8} {:.3}", name, importance))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Elapsed time for verbose output, rounded to milliseconds
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = Duration::from_millis(elapsed.as_millis() as u64);
    humantime::format_duration(millis).to_string()
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}
