//! Weighted rule table of the Earth-similarity model.
//!
//! Positive rules push the output towards "similar"/"idéntica" when climate,
//! size and host star look Earth/Sun-like. Veto rules conclude "nada" at full
//! weight; they win through max aggregation, not by suppressing other rules.

use crate::fuzzy::{all, any, is, Antecedent, RuleBase};

use super::input::Field;

fn term(field: Field, term: &str) -> Antecedent {
    is(field.name(), term)
}

fn temperate() -> Antecedent {
    term(Field::Teq, "templado")
}

fn earth_insolation() -> Antecedent {
    term(Field::Insol, "terrestre")
}

fn earth_radius() -> Antecedent {
    term(Field::Radius, "terrestre")
}

/// Temperate, Earth-like insolation and Earth-sized.
fn habitable_core() -> Antecedent {
    all(temperate(), [earth_insolation(), earth_radius()])
}

/// Sun-like temperature or radius, or main-sequence gravity.
fn good_star() -> Antecedent {
    any(
        term(Field::StTeff, "solar"),
        [
            term(Field::StRad, "solar"),
            term(Field::StLogg, "media"),
        ],
    )
}

fn moderate_period() -> Antecedent {
    term(Field::Period, "medio").or(term(Field::Period, "largo"))
}

/// Giant radius or low surface gravity: an evolved host star.
fn evolved_star() -> Antecedent {
    term(Field::StRad, "gigante").or(term(Field::StLogg, "baja"))
}

fn off_size() -> Antecedent {
    term(Field::Radius, "pequeño").or(term(Field::Radius, "grande"))
}

pub fn rule_base() -> RuleBase {
    RuleBase::builder()
        // Habitable core -> idéntica
        .rule(
            "core",
            all(habitable_core(), [good_star(), moderate_period()]),
            "idéntica",
            1.0,
        )
        .rule(
            "core-flexible",
            habitable_core().and(good_star().or(moderate_period())),
            "idéntica",
            0.95,
        )
        .rule(
            "core-strict",
            all(habitable_core(), [evolved_star().not(), off_size().not()]),
            "idéntica",
            0.5,
        )
        // Habitable core without evolved host -> similar
        .rule(
            "similar-gated",
            habitable_core().and(evolved_star().not()),
            "similar",
            0.9,
        )
        .rule(
            "similar-solar-teff",
            all(
                temperate(),
                [
                    earth_insolation(),
                    term(Field::StTeff, "solar"),
                    earth_radius(),
                    evolved_star().not(),
                ],
            ),
            "similar",
            0.8,
        )
        .rule(
            "similar-solar-radius",
            all(
                temperate(),
                [
                    earth_insolation(),
                    term(Field::StRad, "solar"),
                    earth_radius(),
                    evolved_star().not(),
                ],
            ),
            "similar",
            0.8,
        )
        .rule(
            "similar-main-sequence",
            all(
                temperate(),
                [
                    earth_insolation(),
                    term(Field::StLogg, "media"),
                    earth_radius(),
                    evolved_star().not(),
                ],
            ),
            "similar",
            0.8,
        )
        .rule(
            "similar-period",
            all(
                earth_radius(),
                [
                    moderate_period(),
                    earth_insolation().or(temperate()),
                ],
            ),
            "similar",
            0.5,
        )
        // Wrong size, ideal climate -> algo
        .rule(
            "small-ideal-climate",
            all(temperate(), [earth_insolation(), term(Field::Radius, "pequeño")]),
            "algo",
            0.95,
        )
        .rule(
            "large-ideal-climate",
            all(temperate(), [earth_insolation(), term(Field::Radius, "grande")]),
            "algo",
            0.8,
        )
        // Hostile extremes -> nada
        .rule(
            "scorched-or-frozen",
            term(Field::Teq, "caliente")
                .and(term(Field::Insol, "alta"))
                .or(term(Field::Teq, "frío").and(term(Field::Insol, "baja"))),
            "nada",
            1.0,
        )
        .rule(
            "large-and-hot",
            term(Field::Radius, "grande")
                .and(term(Field::Teq, "caliente").or(term(Field::Insol, "alta"))),
            "nada",
            1.0,
        )
        .rule("evolved-star", evolved_star(), "nada", 1.0)
        .rule(
            "ultrashort-irradiated",
            term(Field::Period, "ultracorto").and(term(Field::Insol, "alta")),
            "nada",
            0.9,
        )
        .rule(
            "hot-star-irradiated",
            term(Field::StTeff, "caliente").and(term(Field::Insol, "alta")),
            "nada",
            1.0,
        )
        // M-dwarf compatibility
        .rule(
            "cool-star-habitable",
            all(
                term(Field::StTeff, "fría"),
                [
                    earth_insolation(),
                    temperate(),
                    earth_radius(),
                ],
            ),
            "similar",
            0.85,
        )
        .rule(
            "cool-star-dim",
            all(
                term(Field::StTeff, "fría"),
                [
                    term(Field::Insol, "baja"),
                    earth_radius().not(),
                ],
            ),
            "algo",
            0.7,
        )
        // Period adjustments
        .rule(
            "short-irradiated-earth",
            all(
                term(Field::Period, "corto"),
                [
                    term(Field::Insol, "alta"),
                    earth_radius(),
                ],
            ),
            "algo",
            0.5,
        )
        .rule(
            "long-cold-dim",
            all(
                term(Field::Period, "largo"),
                [
                    term(Field::Insol, "baja"),
                    term(Field::Teq, "frío"),
                ],
            ),
            "algo",
            0.6,
        )
        // Compact, stable host
        .rule(
            "compact-star",
            all(
                earth_insolation(),
                [
                    temperate(),
                    term(Field::StRad, "enana"),
                    term(Field::StLogg, "alta"),
                ],
            ),
            "similar",
            0.85,
        )
        .rule(
            "near-complete-match",
            all(
                temperate(),
                [
                    earth_insolation(),
                    good_star(),
                    moderate_period(),
                    earth_radius(),
                ],
            ),
            "idéntica",
            0.95,
        )
        .rule(
            "off-size-ideal-climate",
            all(temperate(), [earth_insolation(), off_size()]),
            "algo",
            0.8,
        )
        // Evolved host with pleasant climate must not read as "similar"
        .rule(
            "evolved-star-pleasant-climate",
            evolved_star().and(temperate().or(earth_insolation())),
            "nada",
            1.0,
        )
        .rule(
            "earth-analog-not-short",
            all(
                habitable_core(),
                [
                    term(Field::Period, "ultracorto")
                        .or(term(Field::Period, "corto"))
                        .not(),
                    evolved_star().not(),
                ],
            ),
            "idéntica",
            0.7,
        )
        .build()
}
