//! Gravity estimates from ingredient masses
//!
//! The "breakdown" direction: absolute masses in, gravity and per-ingredient
//! sugar shares out.

use serde::{Deserialize, Serialize};

use super::formulas::{gravity_from_sugar_mass, gravity_points, potential_abv};
use crate::error::{CalcError, CalcResult};
use crate::measure::units::OZ_PER_LB;
use crate::models::ingredient;

/// An ingredient and how much of it goes into the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientMass {
    pub ingredient_id: String,
    /// Canonical pounds
    pub mass_lbs: f64,
}

impl IngredientMass {
    pub fn new(ingredient_id: impl Into<String>, mass_lbs: f64) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            mass_lbs,
        }
    }
}

/// Fermentable sugar supplied by one ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SugarContribution {
    pub ingredient_id: String,
    pub display_name: String,
    pub mass_lbs: f64,
    pub sugar_lbs: f64,
    /// Share of the batch's total fermentable sugar, percent
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GravityEstimate {
    pub batch_gallons: f64,
    pub contributions: Vec<SugarContribution>,
    pub total_sugar_lbs: f64,
    pub original_gravity: f64,
    pub gravity_points: f64,
    pub potential_abv: f64,
    /// Ounces of fermentable sugar per gallon
    pub sugar_oz_per_gallon: f64,
}

/// Estimate original gravity from the ingredients added to a batch
///
/// Ingredients with no mass are ignored.
pub fn estimate_gravity(
    batch_gallons: f64,
    ingredients: &[IngredientMass],
) -> CalcResult<GravityEstimate> {
    if !batch_gallons.is_finite() || batch_gallons <= 0.0 {
        return Err(CalcError::validation("Please enter a valid batch size"));
    }

    let mut contributions = Vec::new();
    for item in ingredients {
        if !item.mass_lbs.is_finite() {
            return Err(CalcError::validation("Ingredient amount must be a number"));
        }
        if item.mass_lbs <= 0.0 {
            continue;
        }

        let def = ingredient(&item.ingredient_id)?;
        contributions.push(SugarContribution {
            ingredient_id: def.id.to_string(),
            display_name: def.display_name.to_string(),
            mass_lbs: item.mass_lbs,
            sugar_lbs: item.mass_lbs * def.fermentable_fraction,
            share_percent: 0.0,
        });
    }

    let total_sugar_lbs: f64 = contributions.iter().map(|c| c.sugar_lbs).sum();
    if total_sugar_lbs <= 0.0 {
        return Err(CalcError::validation("Please add some fermentable ingredients"));
    }

    for c in &mut contributions {
        c.share_percent = c.sugar_lbs / total_sugar_lbs * 100.0;
    }

    let original_gravity = gravity_from_sugar_mass(total_sugar_lbs, batch_gallons)?;

    Ok(GravityEstimate {
        batch_gallons,
        contributions,
        total_sugar_lbs,
        original_gravity,
        gravity_points: gravity_points(original_gravity),
        potential_abv: potential_abv(original_gravity),
        sugar_oz_per_gallon: total_sugar_lbs / batch_gallons * OZ_PER_LB,
    })
}
