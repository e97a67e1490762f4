use super::schema::{Config, Eligibility};
use crate::similarity::Field;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for field in Field::ALL {
        let value = config.defaults.get(field);
        if !value.is_finite() {
            errors.push(format!("defaults.{}: must be a finite number", field));
            continue;
        }
        // Every quantity except the period is strictly positive physically
        let ok = match field {
            Field::Period => value >= 0.0,
            _ => value > 0.0,
        };
        if !ok {
            errors.push(format!("defaults.{}: out of physical range ({})", field, value));
        }
    }

    let batch = &config.batch;
    if batch.checkpoint_every == 0 {
        errors.push("batch.checkpoint_every: must be at least 1".to_string());
    }

    if let Err(e) = humantime::parse_duration(batch.progress_interval.trim()) {
        errors.push(format!(
            "batch.progress_interval: invalid duration '{}' - {}",
            batch.progress_interval, e
        ));
    }

    if batch.round_decimals > 6 {
        errors.push(format!(
            "batch.round_decimals: at most 6, got {}",
            batch.round_decimals
        ));
    }

    if matches!(&batch.eligibility, Eligibility::Allow(labels) if labels.is_empty()) {
        errors.push("batch.eligibility.allow: no label would ever be scored".to_string());
    }

    for (name, column) in [
        ("id_column", &batch.id_column),
        ("label_column", &batch.label_column),
        ("score_column", &batch.score_column),
    ] {
        if column.trim().is_empty() {
            errors.push(format!("batch.{}: must not be empty", name));
        }
    }

    if batch.reference_columns.columns().is_empty() && batch.record_columns.columns().is_empty() {
        errors.push("batch: no record or reference columns mapped".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
