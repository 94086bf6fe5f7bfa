//! Recipe planning for a target ABV
//!
//! Combines the sugar requirement with an allocation set to produce the
//! ingredient masses for a batch.

use serde::Serialize;

use super::formulas::{required_sugar_mass, SugarRequirement};
use crate::error::CalcResult;
use crate::models::{AllocationSet, IngredientAmount, HONEY_ID};

/// ABV above which ordinary wine yeasts struggle
pub const HIGH_ABV_WARNING_THRESHOLD: f64 = 18.0;
/// Pounds of honey per gallon above which the must gets hard to ferment
pub const HONEY_CONCENTRATION_WARNING_LBS_PER_GALLON: f64 = 4.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipePlan {
    pub requirement: SugarRequirement,
    pub amounts: Vec<IngredientAmount>,
    pub honey_lbs: f64,
    pub honey_lbs_per_gallon: f64,
    pub warnings: Vec<String>,
}

/// Ingredient masses for `target_abv` in `batch_gallons` using the set's split
pub fn plan_recipe(
    target_abv: f64,
    batch_gallons: f64,
    allocation: &AllocationSet,
) -> CalcResult<RecipePlan> {
    let requirement = required_sugar_mass(target_abv, batch_gallons)?;
    let amounts = allocation.amounts_for_target(requirement.sugar_lbs)?;

    let honey_lbs: f64 = amounts
        .iter()
        .filter(|a| a.ingredient_id == HONEY_ID)
        .map(|a| a.mass_lbs)
        .sum();
    let honey_lbs_per_gallon = honey_lbs / batch_gallons;

    let mut warnings = Vec::new();
    if target_abv > HIGH_ABV_WARNING_THRESHOLD {
        warnings.push(format!(
            "ABV above {}% may require specialized high-alcohol tolerant yeast",
            HIGH_ABV_WARNING_THRESHOLD
        ));
    }
    if honey_lbs_per_gallon > HONEY_CONCENTRATION_WARNING_LBS_PER_GALLON {
        warnings.push(
            "Very high honey concentration - consider nutrient additions and temperature control"
                .to_string(),
        );
    }

    Ok(RecipePlan {
        requirement,
        amounts,
        honey_lbs,
        honey_lbs_per_gallon,
        warnings,
    })
}
