pub mod engine;
pub mod error;
pub mod membership;
pub mod rule;
pub mod validation;
pub mod variable;

pub use engine::{Evaluation, Inference, InferenceEngine, OutputDistribution, RuleFiring};
pub use error::{FuzzyError, FuzzyResult};
pub use membership::{MembershipFunction, Universe};
pub use rule::{all, any, is, Antecedent, Rule, RuleBase, RuleBaseBuilder};
pub use validation::validate_model;
pub use variable::{CategoryDiagnostic, LinguisticVariable, Term, TermDegree};
