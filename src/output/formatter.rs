use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use owo_colors::OwoColorize;
use serde_json::{json, Value};

use crate::batch::BatchSummary;
use crate::similarity::{Assessment, Field};

/// Width of the field-name column in the diagnostics table
const NAME_WIDTH: usize = 8;

/// Format a score out of 100 with one decimal.
/// Colored green from 60, yellow from 30, red below.
pub fn format_score(score: f64, use_colors: bool) -> String {
    let text = format!("{:.1}", score);
    if !use_colors {
        return text;
    }
    if score >= 60.0 {
        text.green().bold().to_string()
    } else if score >= 30.0 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// Format a measurement, trimming to a sensible number of digits
fn format_value(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format one assessment as a headline plus per-field diagnostics.
/// Verbose mode adds the rules that fired and the output-term activations.
pub fn format_assessment(assessment: &Assessment, verbose: bool, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let verdict = assessment.verdict().unwrap_or("-");
    let headline = format!(
        "Earth similarity: {} / 100 ({})",
        format_score(assessment.score, use_colors),
        verdict
    );
    lines.push(if use_colors {
        headline.bold().to_string()
    } else {
        headline
    });

    for field in Field::ALL {
        let Some(diagnostic) = assessment.diagnostic(field) else {
            continue;
        };
        let degree = diagnostic.degree(&diagnostic.dominant_term).unwrap_or(0.0);

        let mut notes = Vec::new();
        if assessment.defaulted.contains(&field) {
            notes.push("default".to_string());
        }
        if diagnostic.was_clamped() {
            notes.push(format!("clamped to {}", format_value(diagnostic.effective_value)));
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!("  [{}]", notes.join(", "))
        };

        let value = format!("{} {}", format_value(diagnostic.value), field.unit());
        let term = format!("{} ({:.2})", diagnostic.dominant_term, degree);
        if use_colors {
            lines.push(format!(
                "  {:<width$} {:>12}  {}{}",
                field.name().cyan(),
                value,
                term,
                notes.dimmed(),
                width = NAME_WIDTH
            ));
        } else {
            lines.push(format!(
                "  {:<width$} {:>12}  {}{}",
                field.name(),
                value,
                term,
                notes,
                width = NAME_WIDTH
            ));
        }
    }

    for issue in &assessment.recovered {
        let warning = format!("  warning: {}", issue);
        lines.push(if use_colors {
            warning.yellow().to_string()
        } else {
            warning
        });
    }

    if verbose {
        lines.push("Rules fired:".to_string());
        let fired: Vec<_> = assessment
            .firings
            .iter()
            .filter(|f| f.strength > 0.0)
            .collect();
        if fired.is_empty() {
            lines.push("  (none)".to_string());
        }
        for firing in fired {
            lines.push(format!(
                "  {:<30} -> {:<10} degree {:.3}  strength {:.3}",
                firing.label, firing.consequent, firing.degree, firing.strength
            ));
        }

        let activations = assessment
            .activations
            .iter()
            .map(|a| format!("{}={:.3}", a.term, a.degree))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(format!("Activations: {}", activations));
    }

    lines.join("\n")
}

/// JSON rendition of an assessment for scripting.
/// Only rules with non-zero strength are listed.
pub fn assessment_to_json(assessment: &Assessment, round_decimals: u32) -> Value {
    let firings: Vec<_> = assessment
        .firings
        .iter()
        .filter(|f| f.strength > 0.0)
        .collect();
    let defaulted: Vec<&str> = assessment.defaulted.iter().map(|f| f.name()).collect();
    let warnings: Vec<String> = assessment.recovered.iter().map(|e| e.to_string()).collect();

    json!({
        "score": assessment.score_rounded(round_decimals),
        "verdict": assessment.verdict(),
        "diagnostics": assessment.diagnostics,
        "activations": assessment.activations,
        "firings": firings,
        "defaulted": defaulted,
        "warnings": warnings,
    })
}

/// Drop sub-millisecond noise before handing a duration to humantime
fn round_duration(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}

/// Format the end-of-run report of a batch
pub fn format_summary(summary: &BatchSummary, output: &Path, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let headline = format!(
        "Scored {} of {} records in {}",
        summary.scored,
        summary.total,
        humantime::format_duration(round_duration(summary.elapsed))
    );
    lines.push(if use_colors {
        headline.bold().to_string()
    } else {
        headline
    });

    let counts = [
        ("already scored", summary.skipped_existing),
        ("ineligible", summary.ineligible),
        ("missing id", summary.missing_id),
        ("resumed from checkpoint", summary.resumed),
        ("checkpoints written", summary.checkpoints_written),
    ];
    for (label, count) in counts {
        if count > 0 {
            lines.push(format!("  {}: {}", label, count));
        }
    }

    if summary.missing_reference > 0 {
        let line = format!(
            "  missing reference row: {} (e.g. {})",
            summary.missing_reference,
            summary.missing_reference_examples.join(", ")
        );
        lines.push(if use_colors {
            line.yellow().to_string()
        } else {
            line
        });
    }

    if summary.failed > 0 {
        let line = format!("  failed: {}", summary.failed);
        lines.push(if use_colors {
            line.red().to_string()
        } else {
            line
        });
    }

    lines.push(format!("Output: {}", output.display()));
    lines.join("\n")
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}
