//! Gravity and ABV formulas
//!
//! Closed-form conversions between gravity readings, alcohol content and
//! fermentable sugar under the linear 46 points/lb/gal model.

use serde::Serialize;

use crate::error::{require, CalcError, CalcResult};

/// Gravity points contributed by one pound of sugar in one gallon
pub const GRAVITY_POINTS_PER_LB_SUGAR_PER_GALLON: f64 = 46.0;
/// ABV per unit of gravity drop
pub const ABV_FACTOR: f64 = 131.25;
/// Fraction of honey's mass that is fermentable sugar
pub const HONEY_FERMENTABLE_FRACTION: f64 = 0.80;

/// Readings outside this range are flagged as implausible
pub const PLAUSIBLE_GRAVITY_MIN: f64 = 0.900;
pub const PLAUSIBLE_GRAVITY_MAX: f64 = 1.300;

/// Result of an OG/FG calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbvResult {
    pub original_gravity: f64,
    pub final_gravity: f64,
    /// Alcohol by volume, percent
    pub abv: f64,
    /// ABV if fermented down to 1.000, percent
    pub potential_abv: f64,
    /// Apparent attenuation, percent
    pub attenuation: f64,
    pub warnings: Vec<String>,
}

/// Sugar needed to reach a target ABV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SugarRequirement {
    pub target_abv: f64,
    pub batch_gallons: f64,
    pub original_gravity: f64,
    pub gravity_points: f64,
    pub sugar_lbs: f64,
}

/// `(SG - 1.000) * 1000`
pub fn gravity_points(sg: f64) -> f64 {
    (sg - 1.0) * 1000.0
}

/// ABV reached by fermenting from `sg` down to 1.000
pub fn potential_abv(sg: f64) -> f64 {
    (sg - 1.0) * ABV_FACTOR
}

fn plausibility_warning(label: &str, reading: f64) -> Option<String> {
    if (PLAUSIBLE_GRAVITY_MIN..=PLAUSIBLE_GRAVITY_MAX).contains(&reading) {
        None
    } else {
        Some(format!(
            "{} {:.3} is outside the usual {:.3}-{:.3} range",
            label, reading, PLAUSIBLE_GRAVITY_MIN, PLAUSIBLE_GRAVITY_MAX
        ))
    }
}

/// ABV, potential ABV and attenuation from original and final gravity
pub fn abv_from_gravities(og: Option<f64>, fg: Option<f64>) -> CalcResult<AbvResult> {
    const MISSING: &str = "Please enter both Original Gravity and Final Gravity";
    let og = require(og, MISSING)?;
    let fg = require(fg, MISSING)?;

    if og <= fg {
        return Err(CalcError::validation(
            "Original Gravity must be higher than Final Gravity",
        ));
    }

    let abv = (og - fg) * ABV_FACTOR;
    let potential = potential_abv(og);
    let attenuation = (og - fg) / (og - 1.0) * 100.0;

    let warnings: Vec<String> = [
        plausibility_warning("Original Gravity", og),
        plausibility_warning("Final Gravity", fg),
    ]
    .into_iter()
    .flatten()
    .collect();
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    Ok(AbvResult {
        original_gravity: og,
        final_gravity: fg,
        abv,
        potential_abv: potential,
        attenuation,
        warnings,
    })
}

/// Specific gravity produced by dissolving `sugar_lbs` into `batch_gallons`
pub fn gravity_from_sugar_mass(sugar_lbs: f64, batch_gallons: f64) -> CalcResult<f64> {
    if !batch_gallons.is_finite() || batch_gallons <= 0.0 {
        return Err(CalcError::validation("Please enter a valid batch size"));
    }
    if !sugar_lbs.is_finite() || sugar_lbs < 0.0 {
        return Err(CalcError::validation("Sugar mass cannot be negative"));
    }

    let points = (sugar_lbs / batch_gallons) * GRAVITY_POINTS_PER_LB_SUGAR_PER_GALLON;
    Ok(1.0 + points / 1000.0)
}

/// Fermentable sugar required to reach `target_abv` in `batch_gallons`,
/// assuming fermentation finishes at 1.000
pub fn required_sugar_mass(target_abv: f64, batch_gallons: f64) -> CalcResult<SugarRequirement> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(target_abv) || !valid(batch_gallons) {
        return Err(CalcError::validation(
            "Please enter valid target ABV and batch size",
        ));
    }

    let original_gravity = 1.0 + target_abv / ABV_FACTOR;
    let points = gravity_points(original_gravity);
    let sugar_lbs = points * batch_gallons / GRAVITY_POINTS_PER_LB_SUGAR_PER_GALLON;
    tracing::debug!(
        "{}% ABV in {} gal needs OG {:.4} and {:.3} lbs sugar",
        target_abv,
        batch_gallons,
        original_gravity,
        sugar_lbs
    );

    Ok(SugarRequirement {
        target_abv,
        batch_gallons,
        original_gravity,
        gravity_points: points,
        sugar_lbs,
    })
}
