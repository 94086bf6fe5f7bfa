//! Calculator MCP Tools
//!
//! Stateless calculations: ABV from gravities, gravity from ingredients,
//! recipes for a target ABV and scale conversions. Inputs arrive in the
//! session's units and results are rendered back in them.

use serde::Serialize;

use crate::gravity::{
    self, abv_from_gravities, cross_scale_convert, plan_recipe, AbvResult, GravityScale,
    IngredientMass, RecipePlan, ScaleReadings,
};
use crate::measure::{
    canonical_to_display, canonical_to_display_volume, format_mass, format_volume,
    mass_to_canonical, volume_to_canonical, MassUnit, UnitPreferences, VolumeUnit,
};
use crate::models::{all_ingredients, AllocationSet, IngredientDefinition, HONEY};
use crate::session::CalculatorSession;

/// An ingredient amount supplied by the caller
#[derive(Debug, Clone)]
pub struct IngredientInput {
    pub ingredient_id: String,
    pub amount: f64,
    /// Mass unit of `amount`; defaults to the session's main mass unit
    pub unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: &'static str,
    pub display_name: &'static str,
    pub fermentable_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub ingredients: Vec<IngredientSummary>,
    pub count: usize,
}

/// Response for calculate_abv
#[derive(Debug, Serialize)]
pub struct AbvResponse {
    #[serde(flatten)]
    pub result: AbvResult,
    pub abv_display: String,
    pub potential_abv_display: String,
    pub attenuation_display: String,
}

#[derive(Debug, Serialize)]
pub struct ContributionView {
    pub ingredient_id: String,
    pub display_name: String,
    pub mass_lbs: f64,
    pub amount_display: String,
    pub sugar_display: String,
    pub share_percent: f64,
}

/// Response for estimate_gravity
#[derive(Debug, Serialize)]
pub struct EstimateGravityResponse {
    pub batch_gallons: f64,
    pub batch_display: String,
    pub original_gravity: f64,
    pub original_gravity_display: String,
    pub potential_abv: f64,
    pub potential_abv_display: String,
    pub total_sugar_lbs: f64,
    pub total_sugar_display: String,
    pub sugar_concentration_display: String,
    pub ingredients: Vec<ContributionView>,
}

#[derive(Debug, Serialize)]
pub struct AmountView {
    pub entry_id: u32,
    pub ingredient_id: String,
    pub display_name: String,
    pub percentage: f64,
    pub mass_lbs: f64,
    pub mass_display: String,
    pub sugar_display: String,
}

/// A recipe plan rendered in the session's units
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub target_abv: f64,
    pub batch_gallons: f64,
    pub batch_display: String,
    pub target_original_gravity: f64,
    pub target_original_gravity_display: String,
    pub total_sugar_lbs: f64,
    pub total_sugar_display: String,
    pub ingredients: Vec<AmountView>,
    pub honey_concentration_display: Option<String>,
    pub warnings: Vec<String>,
}

/// Response for convert_gravity_scale
#[derive(Debug, Serialize)]
pub struct ScaleResponse {
    pub from: GravityScale,
    pub value: f64,
    pub readings: ScaleReadings,
    pub sg_display: String,
    pub brix_display: String,
    pub baume_display: String,
    pub abv_display: String,
    pub abw_display: String,
}

// ============================================================================
// Input Helpers
// ============================================================================

/// Resolve an optional mass unit string, defaulting to `fallback`
pub fn resolve_mass_unit(unit: Option<&str>, fallback: MassUnit) -> Result<MassUnit, String> {
    match unit {
        None => Ok(fallback),
        Some(u) => MassUnit::parse(u).ok_or_else(|| format!("Unknown mass unit: {}", u)),
    }
}

/// Resolve an optional volume unit string, defaulting to `fallback`
pub fn resolve_volume_unit(unit: Option<&str>, fallback: VolumeUnit) -> Result<VolumeUnit, String> {
    match unit {
        None => Ok(fallback),
        Some(u) => VolumeUnit::parse(u).ok_or_else(|| format!("Unknown volume unit: {}", u)),
    }
}

fn batch_to_gallons(
    units: UnitPreferences,
    batch_size: f64,
    volume_unit: Option<&str>,
) -> Result<f64, String> {
    let unit = resolve_volume_unit(volume_unit, units.volume.volume_unit())?;
    Ok(volume_to_canonical(batch_size, unit))
}

/// Mass per batch volume in the session's units, e.g. "2.48 lbs/gal"
fn concentration_display(mass_lbs: f64, batch_gallons: f64, units: UnitPreferences, sub: bool) -> String {
    let mass_unit = if sub {
        units.mass.sub_mass_unit()
    } else {
        units.mass.main_mass_unit()
    };
    let volume_unit = units.volume.volume_unit();
    let per_volume = canonical_to_display(mass_lbs, mass_unit)
        / canonical_to_display_volume(batch_gallons, volume_unit);

    if sub {
        format!("{:.1} {} per {}", per_volume, mass_unit.symbol(), volume_unit.symbol())
    } else {
        format!("{:.2} {}/{}", per_volume, mass_unit.symbol(), volume_unit.symbol())
    }
}

// ============================================================================
// Calculator Tools
// ============================================================================

/// List honey and every catalog ingredient
pub fn list_ingredients() -> ListIngredientsResponse {
    let summary = |def: &'static IngredientDefinition| IngredientSummary {
        id: def.id,
        display_name: def.display_name,
        fermentable_percent: def.fermentable_fraction * 100.0,
    };

    let ingredients: Vec<IngredientSummary> = std::iter::once(&HONEY)
        .chain(all_ingredients().iter())
        .map(summary)
        .collect();

    ListIngredientsResponse {
        count: ingredients.len(),
        ingredients,
    }
}

/// Calculate ABV from original and final gravity
pub fn calculate_abv(og: Option<f64>, fg: Option<f64>) -> Result<AbvResponse, String> {
    let result = abv_from_gravities(og, fg).map_err(|e| e.to_string())?;

    Ok(AbvResponse {
        abv_display: format!("{:.2}%", result.abv),
        potential_abv_display: format!("{:.2}%", result.potential_abv),
        attenuation_display: format!("{:.1}%", result.attenuation),
        result,
    })
}

/// Estimate original gravity from the ingredients in a batch
pub fn estimate_gravity(
    session: &CalculatorSession,
    batch_size: f64,
    volume_unit: Option<&str>,
    ingredients: &[IngredientInput],
) -> Result<EstimateGravityResponse, String> {
    let units = session.units();
    let batch_gallons = batch_to_gallons(units, batch_size, volume_unit)?;

    let masses = ingredients
        .iter()
        .map(|input| {
            let unit = resolve_mass_unit(input.unit.as_deref(), units.mass.main_mass_unit())?;
            Ok(IngredientMass::new(
                input.ingredient_id.clone(),
                mass_to_canonical(input.amount, unit),
            ))
        })
        .collect::<Result<Vec<_>, String>>()?;

    let estimate = gravity::estimate_gravity(batch_gallons, &masses).map_err(|e| e.to_string())?;

    let views = estimate
        .contributions
        .iter()
        .map(|c| ContributionView {
            ingredient_id: c.ingredient_id.clone(),
            display_name: c.display_name.clone(),
            mass_lbs: c.mass_lbs,
            amount_display: format_mass(c.mass_lbs, units.mass),
            sugar_display: format_mass(c.sugar_lbs, units.mass),
            share_percent: c.share_percent,
        })
        .collect();

    Ok(EstimateGravityResponse {
        batch_gallons,
        batch_display: format_volume(batch_gallons, units.volume),
        original_gravity: estimate.original_gravity,
        original_gravity_display: format!("{:.3}", estimate.original_gravity),
        potential_abv: estimate.potential_abv,
        potential_abv_display: format!("{:.2}%", estimate.potential_abv),
        total_sugar_lbs: estimate.total_sugar_lbs,
        total_sugar_display: format_mass(estimate.total_sugar_lbs, units.mass),
        sugar_concentration_display: concentration_display(
            estimate.total_sugar_lbs,
            batch_gallons,
            units,
            true,
        ),
        ingredients: views,
    })
}

/// Render a recipe plan in the given units
pub fn render_plan(plan: &RecipePlan, units: UnitPreferences) -> PlanResponse {
    let requirement = &plan.requirement;
    let ingredients = plan
        .amounts
        .iter()
        .map(|a| AmountView {
            entry_id: a.entry_id,
            ingredient_id: a.ingredient_id.clone(),
            display_name: a.display_name.clone(),
            percentage: a.percentage,
            mass_lbs: a.mass_lbs,
            mass_display: format_mass(a.mass_lbs, units.mass),
            sugar_display: format_mass(a.sugar_lbs, units.mass),
        })
        .collect();

    let honey_concentration_display = (plan.honey_lbs > 0.0).then(|| {
        concentration_display(plan.honey_lbs, requirement.batch_gallons, units, false)
    });

    PlanResponse {
        target_abv: requirement.target_abv,
        batch_gallons: requirement.batch_gallons,
        batch_display: format_volume(requirement.batch_gallons, units.volume),
        target_original_gravity: requirement.original_gravity,
        target_original_gravity_display: format!("{:.3}", requirement.original_gravity),
        total_sugar_lbs: requirement.sugar_lbs,
        total_sugar_display: format_mass(requirement.sugar_lbs, units.mass),
        ingredients,
        honey_concentration_display,
        warnings: plan.warnings.clone(),
    }
}

/// Plan a honey (or honey + one fruit) recipe for a target ABV
pub fn plan_target_abv(
    session: &CalculatorSession,
    target_abv: f64,
    batch_size: f64,
    volume_unit: Option<&str>,
    honey_percentage: Option<f64>,
    fruit: Option<&str>,
) -> Result<PlanResponse, String> {
    let units = session.units();
    let batch_gallons = batch_to_gallons(units, batch_size, volume_unit)?;

    let honey_percentage = honey_percentage.unwrap_or(100.0);
    if !(0.0..=100.0).contains(&honey_percentage) {
        return Err("Honey percentage must be between 0 and 100".to_string());
    }

    let mut allocation = AllocationSet::with_honey_base();
    let mut notes = Vec::new();
    match fruit.filter(|f| !f.trim().is_empty()) {
        Some(fruit) if honey_percentage < 100.0 => {
            let entry = allocation.add_entry(fruit).map_err(|e| e.to_string())?;
            allocation
                .update_percentage(entry, 100.0 - honey_percentage)
                .map_err(|e| e.to_string())?;
        }
        None if honey_percentage < 100.0 => {
            notes.push("No fruit selected; planning a honey-only recipe".to_string());
        }
        _ => {}
    }

    let plan = plan_recipe(target_abv, batch_gallons, &allocation).map_err(|e| e.to_string())?;
    let mut response = render_plan(&plan, units);
    response.warnings.extend(notes);
    Ok(response)
}

/// Convert a reading on one scale to SG, Brix, Baumé, ABV and ABW
pub fn convert_gravity_scale(value: f64, scale: &str) -> Result<ScaleResponse, String> {
    let from = GravityScale::parse(scale).ok_or_else(|| {
        format!("Unknown scale: {} (expected sg, brix, baume, abv or abw)", scale)
    })?;
    let readings = cross_scale_convert(value, from).map_err(|e| e.to_string())?;

    Ok(ScaleResponse {
        from,
        value,
        sg_display: format!("{:.3}", readings.sg),
        brix_display: format!("{:.1}", readings.brix),
        baume_display: format!("{:.1}", readings.baume),
        abv_display: format!("{:.2}%", readings.abv),
        abw_display: format!("{:.2}%", readings.abw),
        readings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::UnitSystem;

    fn metric_session() -> CalculatorSession {
        CalculatorSession::new(UnitPreferences::new(UnitSystem::Metric, UnitSystem::Metric))
    }

    #[test]
    fn test_list_ingredients_includes_honey_first() {
        let list = list_ingredients();
        assert_eq!(list.count, 22);
        assert_eq!(list.ingredients[0].id, "honey");
        assert!((list.ingredients[0].fermentable_percent - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_abv_displays() {
        let resp = calculate_abv(Some(1.065), Some(1.012)).unwrap();
        assert_eq!(resp.abv_display, "6.96%");
        assert_eq!(resp.potential_abv_display, "8.53%");
        assert_eq!(resp.attenuation_display, "81.5%");
    }

    #[test]
    fn test_calculate_abv_error_message() {
        let err = calculate_abv(None, Some(1.0)).unwrap_err();
        assert_eq!(err, "Please enter both Original Gravity and Final Gravity");
    }

    #[test]
    fn test_estimate_gravity_imperial() {
        let session = CalculatorSession::default();
        let inputs = [IngredientInput {
            ingredient_id: "honey".to_string(),
            amount: 3.0,
            unit: None,
        }];
        let resp = estimate_gravity(&session, 1.0, None, &inputs).unwrap();
        assert_eq!(resp.original_gravity_display, "1.110");
        assert_eq!(resp.total_sugar_display, "2 lbs 6 oz");
        assert_eq!(resp.sugar_concentration_display, "38.4 oz per gal");
        assert_eq!(resp.batch_display, "1.00 gal");
    }

    #[test]
    fn test_estimate_gravity_metric_inputs() {
        let session = metric_session();
        let inputs = [IngredientInput {
            ingredient_id: "honey".to_string(),
            amount: 1.360776,
            unit: None,
        }];
        // 1.360776 kg = 3 lb in 3.78541 L = 1 gal
        let resp = estimate_gravity(&session, 3.78541, None, &inputs).unwrap();
        assert!((resp.original_gravity - 1.1104).abs() < 1e-6);
        assert_eq!(resp.batch_display, "3.79 L");
    }

    #[test]
    fn test_estimate_gravity_bad_unit() {
        let session = CalculatorSession::default();
        let inputs = [IngredientInput {
            ingredient_id: "honey".to_string(),
            amount: 3.0,
            unit: Some("stone".to_string()),
        }];
        let err = estimate_gravity(&session, 1.0, None, &inputs).unwrap_err();
        assert_eq!(err, "Unknown mass unit: stone");
    }

    #[test]
    fn test_plan_target_abv_honey_only() {
        let session = CalculatorSession::default();
        let resp = plan_target_abv(&session, 12.0, 5.0, None, None, None).unwrap();
        assert_eq!(resp.target_original_gravity_display, "1.091");
        assert_eq!(resp.ingredients.len(), 1);
        assert_eq!(resp.ingredients[0].mass_display, "12 lbs 7 oz");
        assert_eq!(resp.honey_concentration_display.as_deref(), Some("2.48 lbs/gal"));
    }

    #[test]
    fn test_plan_target_abv_with_fruit() {
        let session = CalculatorSession::default();
        let resp = plan_target_abv(&session, 12.0, 5.0, Some("gal"), Some(75.0), Some("raspberry")).unwrap();
        assert_eq!(resp.ingredients.len(), 2);
        let fruit = resp.ingredients.iter().find(|a| a.ingredient_id == "raspberry").unwrap();
        assert!((fruit.percentage - 25.0).abs() < 1e-9);
        assert!((fruit.mass_lbs - resp.total_sugar_lbs * 0.25 / 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_plan_target_abv_validation() {
        let session = CalculatorSession::default();
        assert_eq!(
            plan_target_abv(&session, 12.0, 5.0, None, Some(120.0), None).unwrap_err(),
            "Honey percentage must be between 0 and 100"
        );
        assert!(plan_target_abv(&session, 12.0, 5.0, None, Some(50.0), Some("kiwi")).is_err());
        assert!(plan_target_abv(&session, 12.0, 0.0, None, None, None).is_err());

        let resp = plan_target_abv(&session, 12.0, 5.0, None, Some(50.0), None).unwrap();
        assert_eq!(resp.ingredients.len(), 1);
        assert_eq!(resp.warnings.len(), 1);
    }

    #[test]
    fn test_convert_gravity_scale() {
        let resp = convert_gravity_scale(1.050, "sg").unwrap();
        assert_eq!(resp.sg_display, "1.050");
        assert_eq!(resp.brix_display, "12.4");
        assert_eq!(resp.baume_display, "6.9");
        assert!(convert_gravity_scale(1.050, "plato").is_err());
        assert!(convert_gravity_scale(1.5, "sg").is_err());
    }
}
