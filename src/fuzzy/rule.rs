use std::fmt;

/// Boolean expression over `(variable, term)` membership degrees.
///
/// AND is the pointwise minimum, OR the maximum and NOT the complement.
#[derive(Debug, Clone, PartialEq)]
pub enum Antecedent {
    Is { variable: String, term: String },
    And(Box<Antecedent>, Box<Antecedent>),
    Or(Box<Antecedent>, Box<Antecedent>),
    Not(Box<Antecedent>),
}

/// Leaf constructor: "`variable` is `term`".
pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Antecedent {
    Antecedent::Is {
        variable: variable.into(),
        term: term.into(),
    }
}

/// Conjunction of `first` and every expression in `rest`, left to right.
pub fn all<I>(first: Antecedent, rest: I) -> Antecedent
where
    I: IntoIterator<Item = Antecedent>,
{
    rest.into_iter().fold(first, Antecedent::and)
}

/// Disjunction of `first` and every expression in `rest`, left to right.
pub fn any<I>(first: Antecedent, rest: I) -> Antecedent
where
    I: IntoIterator<Item = Antecedent>,
{
    rest.into_iter().fold(first, Antecedent::or)
}

impl Antecedent {
    pub fn and(self, other: Antecedent) -> Antecedent {
        Antecedent::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Antecedent) -> Antecedent {
        Antecedent::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Antecedent {
        Antecedent::Not(Box::new(self))
    }

    /// Firing degree given a lookup from `(variable, term)` to membership.
    ///
    /// Unknown leaves evaluate to 0; models are validated before use so this
    /// only matters for hand-built expressions.
    pub fn evaluate<F>(&self, degree: &F) -> f64
    where
        F: Fn(&str, &str) -> Option<f64>,
    {
        match self {
            Antecedent::Is { variable, term } => degree(variable, term).unwrap_or(0.0),
            Antecedent::And(l, r) => l.evaluate(degree).min(r.evaluate(degree)),
            Antecedent::Or(l, r) => l.evaluate(degree).max(r.evaluate(degree)),
            Antecedent::Not(inner) => 1.0 - inner.evaluate(degree),
        }
    }

    /// Every `(variable, term)` leaf, in left-to-right order.
    pub fn leaves(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Antecedent::Is { variable, term } => out.push((variable, term)),
            Antecedent::And(l, r) | Antecedent::Or(l, r) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
            Antecedent::Not(inner) => inner.collect_leaves(out),
        }
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Antecedent::Is { variable, term } => write!(f, "{}[{}]", variable, term),
            Antecedent::And(l, r) => write!(f, "({} & {})", l, r),
            Antecedent::Or(l, r) => write!(f, "({} | {})", l, r),
            Antecedent::Not(inner) => write!(f, "~{}", inner),
        }
    }
}

/// A weighted implication `antecedent => output is consequent`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub label: String,
    pub antecedent: Antecedent,
    pub consequent: String,
    pub weight: f64,
}

/// Immutable, ordered set of rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleBase {
    rules: Vec<Rule>,
}

impl RuleBase {
    pub fn builder() -> RuleBaseBuilder {
        RuleBaseBuilder::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Same rules in reverse declaration order.
    pub fn reversed(&self) -> RuleBase {
        RuleBase {
            rules: self.rules.iter().rev().cloned().collect(),
        }
    }
}

impl FromIterator<Rule> for RuleBase {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        RuleBase {
            rules: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleBaseBuilder {
    rules: Vec<Rule>,
}

impl RuleBaseBuilder {
    pub fn rule(
        mut self,
        label: impl Into<String>,
        antecedent: Antecedent,
        consequent: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.rules.push(Rule {
            label: label.into(),
            antecedent,
            consequent: consequent.into(),
            weight,
        });
        self
    }

    pub fn build(self) -> RuleBase {
        RuleBase { rules: self.rules }
    }
}
