//! Allocation MCP Tools
//!
//! Tools for building an ingredient split interactively: create a set, add
//! and remove ingredients, edit percentages, and plan amounts once the split
//! totals 100%.

use serde::Serialize;

use super::calculations::{render_plan, resolve_volume_unit, PlanResponse};
use crate::gravity::plan_recipe;
use crate::measure::volume_to_canonical;
use crate::models::{ingredient, AllocationSet, AllocationState, EntryId};
use crate::session::{CalculatorSession, PlanRequest, SetId};

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub id: EntryId,
    pub ingredient_id: String,
    pub display_name: String,
    pub percentage: f64,
    pub is_base: bool,
}

/// Current contents of an allocation set
#[derive(Debug, Serialize)]
pub struct AllocationView {
    pub id: SetId,
    pub state: AllocationState,
    pub total_percentage: f64,
    pub base_entry_id: Option<EntryId>,
    pub entries: Vec<EntryView>,
    /// Shown while the set is unbalanced
    pub message: Option<String>,
}

/// Response for add_allocation_entry
#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub entry_id: EntryId,
    pub allocation: AllocationView,
}

/// Response for set_allocation_percentage
#[derive(Debug, Serialize)]
pub struct SetPercentageResponse {
    pub entry_id: EntryId,
    pub requested_percentage: f64,
    /// The value actually stored after clamping and rebalancing
    pub stored_percentage: f64,
    pub allocation: AllocationView,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllocationResponse {
    pub success: bool,
    pub deleted_id: SetId,
}

/// A recipe plan tied to the allocation set it came from
#[derive(Debug, Serialize)]
pub struct AllocationPlanResponse {
    pub allocation_id: SetId,
    #[serde(flatten)]
    pub plan: PlanResponse,
}

fn view(id: SetId, set: &AllocationSet) -> AllocationView {
    let base = set.base_id();
    let entries = set
        .entries()
        .iter()
        .map(|e| EntryView {
            id: e.id,
            ingredient_id: e.ingredient_id.clone(),
            display_name: ingredient(&e.ingredient_id)
                .map(|def| def.display_name.to_string())
                .unwrap_or_else(|_| e.ingredient_id.clone()),
            percentage: e.percentage,
            is_base: base == Some(e.id),
        })
        .collect();

    let state = set.state();
    let total = set.total_percentage();
    let message = (state == AllocationState::Unbalanced).then(|| {
        format!(
            "Ingredient percentages must total 100% (currently {:.1}%)",
            total
        )
    });

    AllocationView {
        id,
        state,
        total_percentage: total,
        base_entry_id: base,
        entries,
        message,
    }
}

fn current_view(session: &CalculatorSession, id: SetId) -> Result<AllocationView, String> {
    let allocation = session.allocation(id).map_err(|e| e.to_string())?;
    Ok(view(id, &allocation.set))
}

/// Create a new allocation set
pub fn create_allocation(
    session: &mut CalculatorSession,
    honey_base: bool,
) -> Result<AllocationView, String> {
    let id = session.create_allocation(honey_base);
    tracing::info!("Created allocation set {} (honey base: {})", id, honey_base);
    current_view(session, id)
}

/// Get the current state of an allocation set
pub fn get_allocation(session: &CalculatorSession, id: SetId) -> Result<AllocationView, String> {
    current_view(session, id)
}

/// Add an ingredient to a set at 0%
pub fn add_allocation_entry(
    session: &mut CalculatorSession,
    id: SetId,
    ingredient_id: &str,
) -> Result<AddEntryResponse, String> {
    let allocation = session.allocation_mut(id).map_err(|e| e.to_string())?;
    let entry_id = allocation
        .set
        .add_entry(ingredient_id)
        .map_err(|e| e.to_string())?;

    Ok(AddEntryResponse {
        entry_id,
        allocation: view(id, &allocation.set),
    })
}

/// Edit an entry's percentage; peers of the base rebalance against it
pub fn set_allocation_percentage(
    session: &mut CalculatorSession,
    id: SetId,
    entry_id: EntryId,
    percentage: f64,
) -> Result<SetPercentageResponse, String> {
    let allocation = session.allocation_mut(id).map_err(|e| e.to_string())?;
    let stored = allocation
        .set
        .update_percentage(entry_id, percentage)
        .map_err(|e| e.to_string())?;

    Ok(SetPercentageResponse {
        entry_id,
        requested_percentage: percentage,
        stored_percentage: stored,
        allocation: view(id, &allocation.set),
    })
}

/// Remove an entry; its share returns to the base entry
pub fn remove_allocation_entry(
    session: &mut CalculatorSession,
    id: SetId,
    entry_id: EntryId,
) -> Result<AllocationView, String> {
    let allocation = session.allocation_mut(id).map_err(|e| e.to_string())?;
    allocation
        .set
        .remove_entry(entry_id)
        .map_err(|e| e.to_string())?;
    Ok(view(id, &allocation.set))
}

/// Remove every entry from a set
pub fn reset_allocation(session: &mut CalculatorSession, id: SetId) -> Result<AllocationView, String> {
    let allocation = session.allocation_mut(id).map_err(|e| e.to_string())?;
    allocation.set.reset();
    allocation.plan = None;
    Ok(view(id, &allocation.set))
}

/// Discard a set
pub fn delete_allocation(
    session: &mut CalculatorSession,
    id: SetId,
) -> Result<DeleteAllocationResponse, String> {
    session.delete_allocation(id).map_err(|e| e.to_string())?;
    tracing::info!("Deleted allocation set {}", id);
    Ok(DeleteAllocationResponse {
        success: true,
        deleted_id: id,
    })
}

/// Re-render a set's recorded plan in the session's current units
pub fn render_allocation_plan(
    session: &CalculatorSession,
    id: SetId,
) -> Result<Option<AllocationPlanResponse>, String> {
    let allocation = session.allocation(id).map_err(|e| e.to_string())?;
    let Some(request) = allocation.plan else {
        return Ok(None);
    };

    let plan = plan_recipe(request.target_abv, request.batch_gallons, &allocation.set)
        .map_err(|e| e.to_string())?;
    Ok(Some(AllocationPlanResponse {
        allocation_id: id,
        plan: render_plan(&plan, session.units()),
    }))
}

/// Compute ingredient amounts for a target ABV from a balanced set
pub fn plan_allocation_amounts(
    session: &mut CalculatorSession,
    id: SetId,
    target_abv: f64,
    batch_size: f64,
    volume_unit: Option<&str>,
) -> Result<AllocationPlanResponse, String> {
    let units = session.units();
    let unit = resolve_volume_unit(volume_unit, units.volume.volume_unit())?;
    let batch_gallons = volume_to_canonical(batch_size, unit);

    let allocation = session.allocation_mut(id).map_err(|e| e.to_string())?;
    let plan = plan_recipe(target_abv, batch_gallons, &allocation.set).map_err(|e| e.to_string())?;
    allocation.plan = Some(PlanRequest {
        target_abv,
        batch_gallons,
    });

    Ok(AllocationPlanResponse {
        allocation_id: id,
        plan: render_plan(&plan, units),
    })
}
