//! Gravity and ABV formula engine
//!
//! Formulas, scale conversions, ingredient-based estimates and recipe plans.

pub mod estimate;
pub mod formulas;
pub mod plan;
pub mod scales;

pub use estimate::{estimate_gravity, GravityEstimate, IngredientMass, SugarContribution};
pub use formulas::{
    abv_from_gravities, gravity_from_sugar_mass, gravity_points, potential_abv,
    required_sugar_mass, AbvResult, SugarRequirement, ABV_FACTOR,
    GRAVITY_POINTS_PER_LB_SUGAR_PER_GALLON, HONEY_FERMENTABLE_FRACTION,
};
pub use plan::{plan_recipe, RecipePlan};
pub use scales::{cross_scale_convert, GravityScale, ScaleReadings};
