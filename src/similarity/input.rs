use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fuzzy::FuzzyError;

/// Physical measurements the model consumes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Radius,
    Teq,
    Insol,
    Period,
    StTeff,
    StRad,
    StLogg,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Radius,
        Field::Teq,
        Field::Insol,
        Field::Period,
        Field::StTeff,
        Field::StRad,
        Field::StLogg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Radius => "radius",
            Field::Teq => "teq",
            Field::Insol => "insol",
            Field::Period => "period",
            Field::StTeff => "st_teff",
            Field::StRad => "st_rad",
            Field::StLogg => "st_logg",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Field::Radius => "R⊕",
            Field::Teq => "K",
            Field::Insol => "S⊕",
            Field::Period => "d",
            Field::StTeff => "K",
            Field::StRad => "R☉",
            Field::StLogg => "cgs",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// Values used when a field is missing from every source.
///
/// Example YAML:
/// ```yaml
/// defaults:
///   period: 20
///   st_teff: 5700
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct InputDefaults {
    pub radius: f64,
    pub teq: f64,
    pub insol: f64,
    pub period: f64,
    pub st_teff: f64,
    pub st_rad: f64,
    pub st_logg: f64,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            radius: 1.0,
            teq: 290.0,
            insol: 1.0,
            period: 50.0,
            st_teff: 5777.0,
            st_rad: 1.0,
            st_logg: 4.4,
        }
    }
}

impl InputDefaults {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Radius => self.radius,
            Field::Teq => self.teq,
            Field::Insol => self.insol,
            Field::Period => self.period,
            Field::StTeff => self.st_teff,
            Field::StRad => self.st_rad,
            Field::StLogg => self.st_logg,
        }
    }
}

/// Crisp input for one candidate; `None` means "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputVector {
    values: [Option<f64>; 7],
}

impl InputVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        self.values[field.index()] = value;
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    /// Fields that will fall back to their default.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Crisp values in `Field::ALL` order with defaults filled in.
    pub fn resolve(&self, defaults: &InputDefaults) -> [f64; 7] {
        let mut out = [0.0; 7];
        for field in Field::ALL {
            out[field.index()] = self.get(field).unwrap_or_else(|| defaults.get(field));
        }
        out
    }

    /// Read the seven fields from a JSON object keyed by field name.
    ///
    /// Values that cannot be read as numbers are left missing and reported
    /// as `InvalidInput`; unknown keys are ignored.
    pub fn from_json(object: &Map<String, Value>) -> (Self, Vec<FuzzyError>) {
        let mut input = InputVector::new();
        let mut issues = Vec::new();
        for field in Field::ALL {
            if let Some(raw) = object.get(field.name()) {
                match parse_numeric(raw) {
                    Ok(value) => input.set(field, value),
                    Err(raw) => issues.push(FuzzyError::InvalidInput {
                        field: field.name().to_string(),
                        raw,
                    }),
                }
            }
        }
        (input, issues)
    }
}

/// Interpret a JSON value as an optional finite number.
///
/// `null` and blank strings are missing; numeric strings are parsed. Anything
/// else is rejected with its textual form.
pub fn parse_numeric(value: &Value) -> Result<Option<f64>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        // NaN cells in tabular exports mean "no measurement"
        Some(v) if v.is_nan() => Ok(None),
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(value.to_string()),
    }
}
