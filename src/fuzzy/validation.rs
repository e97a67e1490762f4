use std::collections::HashSet;

use super::rule::RuleBase;
use super::variable::LinguisticVariable;

/// Validate a fuzzy model before it is used.
/// Returns all validation errors at once (not just the first).
pub fn validate_model(
    inputs: &[LinguisticVariable],
    output: &LinguisticVariable,
    rules: &RuleBase,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for var in inputs.iter().chain(std::iter::once(output)) {
        if !seen.insert(var.name.as_str()) {
            errors.push(format!("variable '{}': declared more than once", var.name));
        }
        validate_variable(var, &mut errors);
    }

    if rules.is_empty() {
        errors.push("rules: at least one rule is required".to_string());
    }

    for (i, rule) in rules.rules().iter().enumerate() {
        let at = format!("rules[{}] ({})", i, rule.label);

        if !(rule.weight > 0.0 && rule.weight <= 1.0) {
            errors.push(format!("{}.weight: must be in (0, 1], got {}", at, rule.weight));
        }

        if output.term_index(&rule.consequent).is_none() {
            errors.push(format!(
                "{}.consequent: '{}' is not a term of '{}'",
                at, rule.consequent, output.name
            ));
        }

        for (variable, term) in rule.antecedent.leaves() {
            match inputs.iter().find(|v| v.name == variable) {
                None => errors.push(format!(
                    "{}.antecedent: unknown variable '{}'",
                    at, variable
                )),
                Some(var) if var.term_index(term).is_none() => errors.push(format!(
                    "{}.antecedent: '{}' has no term '{}'",
                    at, variable, term
                )),
                Some(_) => {}
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_variable(var: &LinguisticVariable, errors: &mut Vec<String>) {
    let u = var.universe();
    if !(u.step > 0.0) {
        errors.push(format!("{}.universe: step must be positive, got {}", var.name, u.step));
    }
    if !(u.min < u.max) {
        errors.push(format!(
            "{}.universe: min must be below max ({} >= {})",
            var.name, u.min, u.max
        ));
    }

    if var.terms().is_empty() {
        errors.push(format!("{}: no terms declared", var.name));
    }

    let mut names = HashSet::new();
    for term in var.terms() {
        if !names.insert(term.name.as_str()) {
            errors.push(format!("{}.{}: declared more than once", var.name, term.name));
        }
        for problem in term.function.parameter_errors() {
            errors.push(format!("{}.{}: {}", var.name, term.name, problem));
        }
    }
}
