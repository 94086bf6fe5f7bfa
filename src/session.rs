//! Calculation session
//!
//! Owns the unit preferences and the allocation sets for one user session.
//! Canonical values never depend on the unit preferences; changing them only
//! changes how results are rendered.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{CalcError, CalcResult};
use crate::measure::UnitPreferences;
use crate::models::AllocationSet;

/// Identifier of an allocation set within a session
pub type SetId = u32;

/// The last recipe plan requested for an allocation set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanRequest {
    pub target_abv: f64,
    pub batch_gallons: f64,
}

/// An allocation set and the plan it last rendered
#[derive(Debug, Clone, Default)]
pub struct SessionAllocation {
    pub set: AllocationSet,
    pub plan: Option<PlanRequest>,
}

#[derive(Debug, Default)]
pub struct CalculatorSession {
    units: UnitPreferences,
    allocations: BTreeMap<SetId, SessionAllocation>,
    next_set_id: SetId,
}

impl CalculatorSession {
    pub fn new(units: UnitPreferences) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    pub fn units(&self) -> UnitPreferences {
        self.units
    }

    /// Change unit preferences, returning the sets whose plans must be re-rendered
    pub fn set_units(&mut self, units: UnitPreferences) -> Vec<SetId> {
        if units != self.units {
            tracing::info!(
                "Unit preferences changed: mass {} -> {}, volume {} -> {}",
                self.units.mass.as_str(),
                units.mass.as_str(),
                self.units.volume.as_str(),
                units.volume.as_str()
            );
        }
        self.units = units;
        self.allocations
            .iter()
            .filter(|(_, a)| a.plan.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Start a new allocation set, optionally seeded with a honey base at 100%
    pub fn create_allocation(&mut self, honey_base: bool) -> SetId {
        let id = self.next_set_id;
        self.next_set_id += 1;
        let set = if honey_base {
            AllocationSet::with_honey_base()
        } else {
            AllocationSet::new()
        };
        self.allocations.insert(id, SessionAllocation { set, plan: None });
        id
    }

    pub fn allocation(&self, id: SetId) -> CalcResult<&SessionAllocation> {
        self.allocations
            .get(&id)
            .ok_or_else(|| CalcError::not_found(format!("Allocation set {} not found", id)))
    }

    pub fn allocation_mut(&mut self, id: SetId) -> CalcResult<&mut SessionAllocation> {
        self.allocations
            .get_mut(&id)
            .ok_or_else(|| CalcError::not_found(format!("Allocation set {} not found", id)))
    }

    pub fn delete_allocation(&mut self, id: SetId) -> CalcResult<()> {
        self.allocations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CalcError::not_found(format!("Allocation set {} not found", id)))
    }

    pub fn allocation_ids(&self) -> Vec<SetId> {
        self.allocations.keys().copied().collect()
    }

    pub fn active_allocations(&self) -> usize {
        self.allocations.len()
    }
}
