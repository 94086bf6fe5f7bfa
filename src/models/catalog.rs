//! Ingredient catalog
//!
//! Static table of fermentable ingredients and the fraction of their mass that
//! is sugar available to yeast. Honey is kept outside the generic table
//! because it is the default base of every recipe.

use serde::Serialize;

use crate::error::{CalcError, CalcResult};
use crate::gravity::HONEY_FERMENTABLE_FRACTION;

/// Identifier of the synthetic honey entry
pub const HONEY_ID: &str = "honey";

/// A fermentable ingredient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IngredientDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Fraction of the ingredient's mass that is fermentable sugar (0.0 - 1.0)
    pub fermentable_fraction: f64,
}

const fn def(id: &'static str, display_name: &'static str, fraction: f64) -> IngredientDefinition {
    IngredientDefinition {
        id,
        display_name,
        fermentable_fraction: fraction,
    }
}

pub static HONEY: IngredientDefinition = def(HONEY_ID, "Honey", HONEY_FERMENTABLE_FRACTION);

static CATALOG: [IngredientDefinition; 21] = [
    def("apple", "Apple (fresh)", 0.13),
    def("apple-juice", "Apple Juice", 0.24),
    def("blackberry", "Blackberry", 0.10),
    def("blueberry", "Blueberry", 0.14),
    def("cherry", "Cherry (sweet)", 0.16),
    def("cherry-tart", "Cherry (tart)", 0.12),
    def("cranberry", "Cranberry", 0.04),
    def("grape", "Grape (fresh)", 0.16),
    def("grape-juice", "Grape Juice", 0.24),
    def("orange", "Orange", 0.12),
    def("orange-juice", "Orange Juice", 0.21),
    def("peach", "Peach", 0.13),
    def("pear", "Pear", 0.15),
    def("raspberry", "Raspberry", 0.12),
    def("strawberry", "Strawberry", 0.09),
    def("elderberry", "Elderberry", 0.07),
    def("elderflower", "Elderflower", 0.05),
    def("cane-sugar", "Cane Sugar", 1.00),
    def("brown-sugar", "Brown Sugar", 0.97),
    def("maple-syrup", "Maple Syrup", 0.67),
    def("agave", "Agave Nectar", 0.76),
];

/// The generic (non-honey) catalog in display order
pub fn all_ingredients() -> &'static [IngredientDefinition] {
    &CATALOG
}

/// Look up an ingredient by id, including honey
pub fn ingredient(id: &str) -> CalcResult<&'static IngredientDefinition> {
    let key = id.trim().to_lowercase();
    if key == HONEY_ID {
        return Ok(&HONEY);
    }

    CATALOG
        .iter()
        .find(|def| def.id == key)
        .ok_or_else(|| CalcError::not_found(format!("Unknown ingredient: {}", id)))
}
