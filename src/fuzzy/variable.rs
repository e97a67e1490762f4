use serde::Serialize;

use super::membership::{MembershipFunction, Universe};

/// A named fuzzy category of a linguistic variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: String,
    pub function: MembershipFunction,
}

impl Term {
    pub fn new(name: impl Into<String>, function: MembershipFunction) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

/// A quantity described by overlapping fuzzy terms over a bounded universe.
///
/// Term order is significant: it is the report order and the tie-break order
/// when picking the dominant term. Each term's curve is sampled on the
/// universe grid when the term is added; crisp values are read off those
/// samples by linear interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    pub name: String,
    universe: Universe,
    terms: Vec<Term>,
    curves: Vec<Vec<f64>>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            universe,
            terms: Vec::new(),
            curves: Vec::new(),
        }
    }

    /// Append a term (builder style).
    pub fn term(mut self, name: impl Into<String>, function: MembershipFunction) -> Self {
        self.curves.push(self.universe.sample_curve(&function));
        self.terms.push(Term::new(name, function));
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Terms in declaration order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.iter().position(|t| t.name == name)
    }

    /// Samples of the term at `index` over the universe grid.
    pub fn sampled(&self, index: usize) -> &[f64] {
        &self.curves[index]
    }

    /// Evaluate a crisp value against every term.
    ///
    /// Values outside the universe are read at the nearest edge.
    pub fn fuzzify(&self, value: f64) -> CategoryDiagnostic {
        let effective = self.universe.clamp(value);
        let degrees: Vec<TermDegree> = self
            .terms
            .iter()
            .zip(&self.curves)
            .map(|(t, curve)| TermDegree {
                term: t.name.clone(),
                degree: self.universe.interpolate(curve, effective),
            })
            .collect();

        // Strictly greater keeps the first declared term on ties
        let mut dominant: Option<&TermDegree> = None;
        for d in &degrees {
            if dominant.map_or(true, |best| d.degree > best.degree) {
                dominant = Some(d);
            }
        }
        let dominant_term = dominant.map(|d| d.term.clone()).unwrap_or_default();

        CategoryDiagnostic {
            variable: self.name.clone(),
            value,
            effective_value: effective,
            dominant_term,
            degrees,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermDegree {
    pub term: String,
    pub degree: f64,
}

/// Fuzzified view of one input value: its degree in every term plus the
/// dominant (arg-max) term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDiagnostic {
    pub variable: String,
    /// Value as supplied (after defaults were applied).
    pub value: f64,
    /// Value actually evaluated, clamped into the universe.
    pub effective_value: f64,
    pub dominant_term: String,
    pub degrees: Vec<TermDegree>,
}

impl CategoryDiagnostic {
    pub fn degree(&self, term: &str) -> Option<f64> {
        self.degrees
            .iter()
            .find(|d| d.term == term)
            .map(|d| d.degree)
    }

    pub fn was_clamped(&self) -> bool {
        self.value != self.effective_value
    }
}
