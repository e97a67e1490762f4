use serde::Serialize;

use super::error::{FuzzyError, FuzzyResult};
use super::rule::RuleBase;
use super::validation::validate_model;
use super::variable::{CategoryDiagnostic, LinguisticVariable, TermDegree};

/// Firing strength of one rule for one input vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFiring {
    pub label: String,
    pub consequent: String,
    /// Antecedent degree before weighting.
    pub degree: f64,
    /// `weight * degree`, the height the consequent is clipped at.
    pub strength: f64,
}

/// Aggregated fuzzy output sampled over the output universe.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDistribution {
    points: Vec<f64>,
    degrees: Vec<f64>,
}

impl OutputDistribution {
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    pub fn is_zero(&self) -> bool {
        self.degrees.iter().all(|&d| d == 0.0)
    }

    /// Centroid of the distribution: `sum(x * mu(x)) / sum(mu(x))`.
    pub fn centroid(&self) -> FuzzyResult<f64> {
        if self.is_zero() {
            return Err(FuzzyError::UndefinedDefuzzification);
        }
        let (moment, area) = self
            .points
            .iter()
            .zip(&self.degrees)
            .fold((0.0, 0.0), |(m, a), (&x, &mu)| (m + x * mu, a + mu));
        Ok(moment / area)
    }
}

/// Result of running the rule base against one input vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub firings: Vec<RuleFiring>,
    /// Per output term, the maximum strength of the rules concluding it.
    pub activations: Vec<TermDegree>,
    pub distribution: OutputDistribution,
}

/// Full evaluation: fuzzified inputs, inference trace and crisp score.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub diagnostics: Vec<CategoryDiagnostic>,
    pub firings: Vec<RuleFiring>,
    pub activations: Vec<TermDegree>,
}

/// Mamdani inference engine: min implication, max aggregation, centroid
/// defuzzification.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    inputs: Vec<LinguisticVariable>,
    output: LinguisticVariable,
    rules: RuleBase,
    // Output universe grid; term curves are sampled on it by the variable.
    points: Vec<f64>,
}

impl InferenceEngine {
    pub fn new(
        inputs: Vec<LinguisticVariable>,
        output: LinguisticVariable,
        rules: RuleBase,
    ) -> FuzzyResult<Self> {
        validate_model(&inputs, &output, &rules).map_err(FuzzyError::InvalidModel)?;

        let points: Vec<f64> = output.universe().samples().collect();

        Ok(Self {
            inputs,
            output,
            rules,
            points,
        })
    }

    pub fn inputs(&self) -> &[LinguisticVariable] {
        &self.inputs
    }

    pub fn output(&self) -> &LinguisticVariable {
        &self.output
    }

    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// Fuzzify one value per input variable, in declaration order.
    pub fn fuzzify(&self, values: &[f64]) -> FuzzyResult<Vec<CategoryDiagnostic>> {
        if values.len() != self.inputs.len() {
            return Err(FuzzyError::InputArity {
                expected: self.inputs.len(),
                got: values.len(),
            });
        }
        Ok(self
            .inputs
            .iter()
            .zip(values)
            .map(|(var, &v)| var.fuzzify(v))
            .collect())
    }

    /// Fire every rule and aggregate the clipped consequents.
    pub fn infer(&self, diagnostics: &[CategoryDiagnostic]) -> Inference {
        let degree = |variable: &str, term: &str| {
            diagnostics
                .iter()
                .find(|d| d.variable == variable)
                .and_then(|d| d.degree(term))
        };

        let mut activation = vec![0.0_f64; self.output.terms().len()];
        let mut firings = Vec::with_capacity(self.rules.len());

        for rule in self.rules.rules() {
            let fired = rule.antecedent.evaluate(&degree);
            let strength = rule.weight * fired;
            // Consequents were resolved when the engine was built
            if let Some(idx) = self.output.term_index(&rule.consequent) {
                activation[idx] = activation[idx].max(strength);
            }
            firings.push(RuleFiring {
                label: rule.label.clone(),
                consequent: rule.consequent.clone(),
                degree: fired,
                strength,
            });
        }

        let degrees = (0..self.points.len())
            .map(|i| {
                activation
                    .iter()
                    .enumerate()
                    .map(|(t, &height)| self.output.sampled(t)[i].min(height))
                    .fold(0.0, f64::max)
            })
            .collect();

        let activations = self
            .output
            .terms()
            .iter()
            .zip(&activation)
            .map(|(t, &a)| TermDegree {
                term: t.name.clone(),
                degree: a,
            })
            .collect();

        Inference {
            firings,
            activations,
            distribution: OutputDistribution {
                points: self.points.clone(),
                degrees,
            },
        }
    }

    /// Fuzzify, infer and defuzzify in one call.
    pub fn evaluate(&self, values: &[f64]) -> FuzzyResult<Evaluation> {
        let diagnostics = self.fuzzify(values)?;
        let inference = self.infer(&diagnostics);
        let score = inference.distribution.centroid()?;

        Ok(Evaluation {
            score,
            diagnostics,
            firings: inference.firings,
            activations: inference.activations,
        })
    }
}
