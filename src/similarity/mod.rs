//! Earth-similarity scoring on top of the generic fuzzy engine.

pub mod input;
pub mod rules;
pub mod variables;

pub use input::{parse_numeric, Field, InputDefaults, InputVector};

use serde_json::{Map, Value};

use crate::fuzzy::{
    CategoryDiagnostic, FuzzyError, FuzzyResult, InferenceEngine, RuleBase, RuleFiring,
    TermDegree,
};

/// Outcome of scoring one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Centroid of the aggregated output, within 0..=100.
    pub score: f64,
    /// One entry per field, in `Field::ALL` order.
    pub diagnostics: Vec<CategoryDiagnostic>,
    pub firings: Vec<RuleFiring>,
    pub activations: Vec<TermDegree>,
    /// Fields that fell back to their default value.
    pub defaulted: Vec<Field>,
    /// Problems handled locally (invalid values, out-of-universe values).
    pub recovered: Vec<FuzzyError>,
}

impl Assessment {
    /// Score rounded to `decimals` places, as stored by batch runs.
    pub fn score_rounded(&self, decimals: u32) -> f64 {
        round_to(self.score, decimals)
    }

    pub fn diagnostic(&self, field: Field) -> Option<&CategoryDiagnostic> {
        self.diagnostics.iter().find(|d| d.variable == field.name())
    }

    /// Label of the strongest output term.
    pub fn verdict(&self) -> Option<&str> {
        let mut best: Option<&TermDegree> = None;
        for a in &self.activations {
            if best.map_or(true, |b| a.degree > b.degree) {
                best = Some(a);
            }
        }
        best.filter(|b| b.degree > 0.0).map(|b| b.term.as_str())
    }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Scores how Earth-like a planet is from seven physical measurements.
///
/// Built once; `assess` is a pure function of the input, so a single scorer
/// can be shared between threads.
#[derive(Debug, Clone)]
pub struct EarthSimilarity {
    engine: InferenceEngine,
    defaults: InputDefaults,
}

impl EarthSimilarity {
    pub fn new(defaults: InputDefaults) -> FuzzyResult<Self> {
        Self::with_rules(defaults, rules::rule_base())
    }

    /// Same variables with a caller-supplied rule table.
    pub fn with_rules(defaults: InputDefaults, rules: RuleBase) -> FuzzyResult<Self> {
        let engine = InferenceEngine::new(
            variables::input_variables(),
            variables::output_variable(),
            rules,
        )?;
        Ok(Self { engine, defaults })
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn defaults(&self) -> &InputDefaults {
        &self.defaults
    }

    /// Score one candidate. Fails only when no rule fires at all.
    pub fn assess(&self, input: &InputVector) -> FuzzyResult<Assessment> {
        let values = input.resolve(&self.defaults);
        let evaluation = self.engine.evaluate(&values)?;

        let recovered = evaluation
            .diagnostics
            .iter()
            .filter(|d| d.was_clamped())
            .map(|d| FuzzyError::OutOfUniverse {
                variable: d.variable.clone(),
                value: d.value,
                clamped: d.effective_value,
            })
            .collect();

        Ok(Assessment {
            score: evaluation.score,
            diagnostics: evaluation.diagnostics,
            firings: evaluation.firings,
            activations: evaluation.activations,
            defaulted: input.missing(),
            recovered,
        })
    }

    /// Score a JSON object keyed by field name.
    ///
    /// Unparseable fields are replaced by their defaults and reported in
    /// `Assessment::recovered`.
    pub fn assess_json(&self, object: &Map<String, Value>) -> FuzzyResult<Assessment> {
        let (input, mut issues) = InputVector::from_json(object);
        let mut assessment = self.assess(&input)?;
        issues.append(&mut assessment.recovered);
        assessment.recovered = issues;
        Ok(assessment)
    }
}
