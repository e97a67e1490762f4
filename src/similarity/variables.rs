//! Linguistic variables of the Earth-similarity model.
//!
//! Universes and breakpoints are anchored to physical units: planet radius in
//! Earth radii, equilibrium temperature in K, insolation in Earth fluxes,
//! orbital period in days, stellar effective temperature in K, stellar radius
//! in Solar radii and stellar surface gravity as log10(cgs).

use crate::fuzzy::{LinguisticVariable, MembershipFunction as Mf, Universe};

use super::input::Field;

pub const OUTPUT: &str = "similaridad_tierra";

/// The seven input variables, in `Field` order.
pub fn input_variables() -> Vec<LinguisticVariable> {
    Field::ALL.iter().map(|f| input_variable(*f)).collect()
}

pub fn input_variable(field: Field) -> LinguisticVariable {
    match field {
        // "pequeño" is tuned not to leak into terrestre, "grande" starts late
        Field::Radius => LinguisticVariable::new(field.name(), Universe::new(0.0, 8.0, 0.01))
            .term("pequeño", Mf::Z { a: 0.8, b: 1.05 })
            .term("terrestre", Mf::Bell { a: 0.35, b: 2.2, c: 1.0 })
            .term("grande", Mf::S { a: 2.2, b: 3.0 }),

        Field::Teq => LinguisticVariable::new(field.name(), Universe::new(100.0, 3000.0, 1.0))
            .term("frío", Mf::Z { a: 240.0, b: 270.0 })
            .term("templado", Mf::Gaussian { mean: 290.0, sigma: 30.0 })
            .term("caliente", Mf::S { a: 320.0, b: 360.0 }),

        Field::Insol => LinguisticVariable::new(field.name(), Universe::new(0.0, 30.0, 0.1))
            .term("baja", Mf::Z { a: 0.5, b: 0.8 })
            .term("terrestre", Mf::Pi { a: 0.85, b: 0.95, c: 1.05, d: 1.20 })
            .term("alta", Mf::S { a: 2.0, b: 3.0 }),

        Field::Period => LinguisticVariable::new(field.name(), Universe::new(0.0, 1000.0, 0.5))
            .term("ultracorto", Mf::Trapezoidal { a: 0.0, b: 0.0, c: 1.0, d: 2.0 })
            .term("corto", Mf::Triangular { a: 2.0, b: 5.0, c: 15.0 })
            .term("medio", Mf::Gaussian { mean: 50.0, sigma: 30.0 })
            .term("largo", Mf::S { a: 100.0, b: 365.0 }),

        Field::StTeff => LinguisticVariable::new(field.name(), Universe::new(2500.0, 10000.0, 10.0))
            .term("fría", Mf::Z { a: 3500.0, b: 4500.0 })
            .term("solar", Mf::Gaussian { mean: 5777.0, sigma: 300.0 })
            .term("caliente", Mf::S { a: 6500.0, b: 8000.0 }),

        Field::StRad => LinguisticVariable::new(field.name(), Universe::new(0.1, 10.0, 0.05))
            .term("enana", Mf::Z { a: 0.4, b: 0.8 })
            .term("solar", Mf::Gaussian { mean: 1.0, sigma: 0.2 })
            .term("gigante", Mf::S { a: 1.8, b: 2.3 }),

        Field::StLogg => LinguisticVariable::new(field.name(), Universe::new(3.0, 5.5, 0.01))
            .term("baja", Mf::Z { a: 3.6, b: 3.9 })
            .term("media", Mf::Bell { a: 0.2, b: 2.0, c: 4.4 })
            .term("alta", Mf::S { a: 4.6, b: 5.0 }),
    }
}

/// Output variable: similarity score on a 0-100 scale.
pub fn output_variable() -> LinguisticVariable {
    LinguisticVariable::new(OUTPUT, Universe::new(0.0, 100.0, 0.1))
        .term("nada", Mf::Trapezoidal { a: 0.0, b: 0.0, c: 20.0, d: 40.0 })
        .term("algo", Mf::Triangular { a: 34.0, b: 46.0, c: 58.0 })
        .term("similar", Mf::Bell { a: 7.0, b: 2.0, c: 62.0 })
        .term("idéntica", Mf::Trapezoidal { a: 78.0, b: 85.0, c: 100.0, d: 100.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let vars = input_variables();
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["radius", "teq", "insol", "period", "st_teff", "st_rad", "st_logg"]
        );
        let term_counts: Vec<usize> = vars.iter().map(|v| v.terms().len()).collect();
        assert_eq!(term_counts, vec![3, 3, 3, 4, 3, 3, 3]);
    }

    #[test]
    fn test_output_terms() {
        let out = output_variable();
        let names: Vec<&str> = out.terms().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["nada", "algo", "similar", "idéntica"]);
        assert_eq!(out.universe().len(), 1001);
    }

    #[test]
    fn test_earth_radius_is_terrestre() {
        let diag = input_variable(Field::Radius).fuzzify(1.0);
        assert_eq!(diag.dominant_term, "terrestre");
        assert_eq!(diag.degree("terrestre"), Some(1.0));
        assert_eq!(diag.degree("grande"), Some(0.0));
        // 1.0 still sits on the tail of the pequeño spline
        let small = diag.degree("pequeño").unwrap();
        assert!((small - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_sun_like_star() {
        let teff = input_variable(Field::StTeff).fuzzify(5777.0);
        assert_eq!(teff.dominant_term, "solar");
        let rad = input_variable(Field::StRad).fuzzify(1.0);
        assert_eq!(rad.dominant_term, "solar");
        let logg = input_variable(Field::StLogg).fuzzify(4.4);
        assert_eq!(logg.dominant_term, "media");
        assert_eq!(logg.degree("media"), Some(1.0));
    }

    #[test]
    fn test_period_terms() {
        let period = input_variable(Field::Period);
        assert_eq!(period.fuzzify(0.5).dominant_term, "ultracorto");
        assert_eq!(period.fuzzify(5.0).dominant_term, "corto");
        assert_eq!(period.fuzzify(50.0).dominant_term, "medio");
        assert_eq!(period.fuzzify(365.0).dominant_term, "largo");
    }

    #[test]
    fn test_hot_teq() {
        let teq = input_variable(Field::Teq).fuzzify(1500.0);
        assert_eq!(teq.dominant_term, "caliente");
        assert_eq!(teq.degree("templado"), Some(0.0));
    }
}
