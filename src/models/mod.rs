//! Data models
//!
//! The ingredient catalog and the allocation sets built from it.

mod allocation;
mod catalog;

pub use allocation::{
    AllocationEntry, AllocationSet, AllocationState, EntryId, IngredientAmount, PERCENT_TOLERANCE,
};
pub use catalog::{all_ingredients, ingredient, IngredientDefinition, HONEY, HONEY_ID};
