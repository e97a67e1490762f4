use serde::{Deserialize, Serialize};

use crate::similarity::{Field, InputDefaults};

/// Top-level configuration file.
///
/// Example YAML:
/// ```yaml
/// defaults:
///   period: 50
/// batch:
///   checkpoint_every: 500
///   progress_interval: "2s"
///   eligibility:
///     deny: ["FALSE POSITIVE"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Values used when a field is missing from the record and the reference table
    pub defaults: InputDefaults,

    pub batch: BatchConfig,
}

/// Settings for scoring a record store in bulk.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct BatchConfig {
    /// Write a checkpoint after this many newly scored records
    pub checkpoint_every: usize,

    /// How often the progress line is refreshed, e.g. "2s" or "500ms"
    pub progress_interval: String,

    /// Decimal places kept in stored scores
    pub round_decimals: u32,

    /// Which record labels are scored
    pub eligibility: Eligibility,

    /// Fill missing reference cells with the column median
    pub impute_medians: bool,

    /// Record key holding the identifier shared with the reference table
    pub id_column: String,

    /// Record key holding the classification label
    pub label_column: String,

    /// Record key the score is written to
    pub score_column: String,

    /// Record keys carrying live measurements
    pub record_columns: ColumnMap,

    /// Reference table columns, used when the record has no value
    pub reference_columns: ColumnMap,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: 500,
            progress_interval: "2s".to_string(),
            round_decimals: 1,
            eligibility: Eligibility::default(),
            impute_medians: false,
            id_column: "object_id".to_string(),
            label_column: "label".to_string(),
            score_column: "earth_similarity".to_string(),
            record_columns: ColumnMap {
                radius: Some("pl_radio".to_string()),
                teq: Some("pl_temperatura_eq".to_string()),
                period: Some("periodo_orbital".to_string()),
                ..ColumnMap::default()
            },
            reference_columns: ColumnMap {
                radius: Some("pl_radio".to_string()),
                teq: Some("pl_temperatura_eq".to_string()),
                insol: Some("insolacion".to_string()),
                period: Some("periodo_orbital".to_string()),
                st_teff: Some("st_temperatura".to_string()),
                st_rad: Some("st_radio".to_string()),
                st_logg: Some("st_gravedad".to_string()),
            },
        }
    }
}

/// Label policy: score only listed labels, or everything except listed labels.
/// Labels are compared upper-cased.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Eligibility {
    Allow(Vec<String>),
    Deny(Vec<String>),
}

impl Default for Eligibility {
    fn default() -> Self {
        Eligibility::Allow(vec!["CONFIRMED".to_string(), "CANDIDATE".to_string()])
    }
}

impl Eligibility {
    pub fn admits(&self, label: &str) -> bool {
        let label = label.trim().to_uppercase();
        match self {
            Eligibility::Allow(labels) => labels.iter().any(|l| l.to_uppercase() == label),
            Eligibility::Deny(labels) => !labels.iter().any(|l| l.to_uppercase() == label),
        }
    }
}

/// Column name per input field; `None` means the source lacks that field.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ColumnMap {
    pub radius: Option<String>,
    pub teq: Option<String>,
    pub insol: Option<String>,
    pub period: Option<String>,
    pub st_teff: Option<String>,
    pub st_rad: Option<String>,
    pub st_logg: Option<String>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<&str> {
        let column = match field {
            Field::Radius => &self.radius,
            Field::Teq => &self.teq,
            Field::Insol => &self.insol,
            Field::Period => &self.period,
            Field::StTeff => &self.st_teff,
            Field::StRad => &self.st_rad,
            Field::StLogg => &self.st_logg,
        };
        column.as_deref()
    }

    /// Mapped columns in field order.
    pub fn columns(&self) -> Vec<(Field, &str)> {
        Field::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|c| (*f, c)))
            .collect()
    }
}
