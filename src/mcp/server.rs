//! Meadcalc MCP Server Implementation
//!
//! Implements the MCP server with all calculator tools.

use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::session::CalculatorSession;
use crate::tools::allocations;
use crate::tools::calculations::{self, IngredientInput};
use crate::tools::status::StatusTracker;
use crate::tools::units;

/// Meadcalc MCP Service
#[derive(Clone)]
pub struct MeadCalcService {
    status_tracker: Arc<StatusTracker>,
    session: Arc<Mutex<CalculatorSession>>,
    tool_router: ToolRouter<MeadCalcService>,
}

impl MeadCalcService {
    pub fn new(session: CalculatorSession) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new()),
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, CalculatorSession>, McpError> {
        self.session
            .lock()
            .map_err(|_| McpError::internal_error("Calculator session lock poisoned", None))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn invalid(e: String) -> McpError {
    McpError::invalid_params(e, None)
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateAbvParams {
    /// Original gravity before fermentation (e.g. 1.100)
    pub original_gravity: Option<f64>,
    /// Final gravity after fermentation (e.g. 1.010)
    pub final_gravity: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    /// Ingredient id from list_ingredients
    pub ingredient_id: String,
    /// Mass of the ingredient
    pub amount: f64,
    /// Mass unit: lbs, oz, kg or g. Defaults to the session's main mass unit.
    pub unit: Option<String>,
}

impl From<IngredientParam> for IngredientInput {
    fn from(p: IngredientParam) -> Self {
        Self {
            ingredient_id: p.ingredient_id,
            amount: p.amount,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateGravityParams {
    /// Batch volume
    pub batch_size: f64,
    /// Volume unit: gal or L. Defaults to the session's volume unit.
    pub volume_unit: Option<String>,
    pub ingredients: Vec<IngredientParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlanTargetAbvParams {
    /// Target alcohol by volume, in percent
    pub target_abv: f64,
    /// Batch volume
    pub batch_size: f64,
    /// Volume unit: gal or L. Defaults to the session's volume unit.
    pub volume_unit: Option<String>,
    /// Share of sugar from honey, 0-100 (default 100)
    pub honey_percentage: Option<f64>,
    /// Fruit ingredient id supplying the rest of the sugar
    pub fruit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertGravityScaleParams {
    pub value: f64,
    /// Input scale: sg, brix, baume, abv or abw
    pub scale: String,
}

// ============================================================================
// Unit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertMassParams {
    /// Raw entry; empty is allowed and converts to nothing
    pub value: String,
    /// lbs, oz, kg or g
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertVolumeParams {
    /// Raw entry; empty is allowed and converts to nothing
    pub value: String,
    /// gal or L
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NormalizeMassParams {
    /// Whole pounds or kilograms
    pub main: f64,
    /// Ounces or grams
    #[serde(default)]
    pub sub: f64,
    /// imperial or metric
    pub system: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetUnitPreferencesParams {
    /// Mass system: imperial or metric
    pub mass: Option<String>,
    /// Volume system: imperial or metric
    pub volume: Option<String>,
}

// ============================================================================
// Allocation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateAllocationParams {
    /// Seed the set with honey at 100% as its base entry
    #[serde(default = "default_true")]
    pub honey_base: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AllocationIdParams {
    pub allocation_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddAllocationEntryParams {
    pub allocation_id: u32,
    /// Ingredient id from list_ingredients
    pub ingredient_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetAllocationPercentageParams {
    pub allocation_id: u32,
    pub entry_id: u32,
    /// New share of total sugar, 0-100
    pub percentage: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveAllocationEntryParams {
    pub allocation_id: u32,
    pub entry_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlanAllocationAmountsParams {
    pub allocation_id: u32,
    /// Target alcohol by volume, in percent
    pub target_abv: f64,
    /// Batch volume
    pub batch_size: f64,
    /// Volume unit: gal or L. Defaults to the session's volume unit.
    pub volume_unit: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MeadCalcService {
    // --- Status ---

    #[tool(description = "Get the current status of the meadcalc service including build info, unit preferences, and process information")]
    fn meadcalc_status(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let status = self
            .status_tracker
            .get_status(session.units(), session.active_allocations());
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for planning a batch. Call this when starting a new session or when unsure how to use the calculator tools.")]
    fn calculator_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALCULATOR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALCULATOR_INSTRUCTIONS)]))
    }

    // --- Calculator ---

    #[tool(description = "List honey and every fermentable ingredient with its sugar fraction")]
    fn list_ingredients(&self) -> Result<CallToolResult, McpError> {
        json_result(&calculations::list_ingredients())
    }

    #[tool(description = "Calculate ABV, potential ABV and attenuation from original and final gravity")]
    fn calculate_abv(&self, Parameters(p): Parameters<CalculateAbvParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::calculate_abv(p.original_gravity, p.final_gravity).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Estimate original gravity and potential ABV from ingredient masses in a batch")]
    fn estimate_gravity(&self, Parameters(p): Parameters<EstimateGravityParams>) -> Result<CallToolResult, McpError> {
        let inputs: Vec<IngredientInput> = p.ingredients.into_iter().map(Into::into).collect();
        let session = self.session()?;
        let result = calculations::estimate_gravity(&session, p.batch_size, p.volume_unit.as_deref(), &inputs)
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Plan honey (and optionally one fruit) amounts for a target ABV and batch size")]
    fn plan_target_abv(&self, Parameters(p): Parameters<PlanTargetAbvParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = calculations::plan_target_abv(
            &session,
            p.target_abv,
            p.batch_size,
            p.volume_unit.as_deref(),
            p.honey_percentage,
            p.fruit.as_deref(),
        )
        .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Convert a reading between SG, Brix, Baume, ABV and ABW")]
    fn convert_gravity_scale(&self, Parameters(p): Parameters<ConvertGravityScaleParams>) -> Result<CallToolResult, McpError> {
        let result = calculations::convert_gravity_scale(p.value, &p.scale).map_err(invalid)?;
        json_result(&result)
    }

    // --- Units ---

    #[tool(description = "Convert a mass entry to pounds, ounces, kilograms and grams")]
    fn convert_mass(&self, Parameters(p): Parameters<ConvertMassParams>) -> Result<CallToolResult, McpError> {
        let result = units::convert_mass(&p.value, &p.unit).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Carry overflowing ounces or grams into pounds or kilograms (2 lbs 18 oz becomes 3 lbs 2 oz)")]
    fn normalize_mass(&self, Parameters(p): Parameters<NormalizeMassParams>) -> Result<CallToolResult, McpError> {
        let result = units::normalize_mass(p.main, p.sub, &p.system).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Convert a volume entry to gallons and liters")]
    fn convert_volume(&self, Parameters(p): Parameters<ConvertVolumeParams>) -> Result<CallToolResult, McpError> {
        let result = units::convert_volume(&p.value, &p.unit).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get the session's mass and volume unit systems")]
    fn get_unit_preferences(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        json_result(&units::get_unit_preferences(&session))
    }

    #[tool(description = "Set the session's mass and/or volume unit system. Planned allocation recipes are re-rendered in the new units.")]
    fn set_unit_preferences(&self, Parameters(p): Parameters<SetUnitPreferencesParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = units::set_unit_preferences(&mut session, p.mass.as_deref(), p.volume.as_deref())
            .map_err(invalid)?;
        json_result(&result)
    }

    // --- Allocations ---

    #[tool(description = "Create an allocation set for splitting sugar between ingredients. With honey_base (default), honey starts at 100% and absorbs changes to other entries.")]
    fn create_allocation(&self, Parameters(p): Parameters<CreateAllocationParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::create_allocation(&mut session, p.honey_base).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get the entries, total and balance state of an allocation set")]
    fn get_allocation(&self, Parameters(p): Parameters<AllocationIdParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = allocations::get_allocation(&session, p.allocation_id).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Add an ingredient to an allocation set at 0%")]
    fn add_allocation_entry(&self, Parameters(p): Parameters<AddAllocationEntryParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::add_allocation_entry(&mut session, p.allocation_id, &p.ingredient_id)
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Set an entry's percentage. The base entry rebalances to keep the set at 100%; values are clamped to the available headroom.")]
    fn set_allocation_percentage(&self, Parameters(p): Parameters<SetAllocationPercentageParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::set_allocation_percentage(&mut session, p.allocation_id, p.entry_id, p.percentage)
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Remove an entry from an allocation set; its share returns to the base entry")]
    fn remove_allocation_entry(&self, Parameters(p): Parameters<RemoveAllocationEntryParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::remove_allocation_entry(&mut session, p.allocation_id, p.entry_id)
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Remove every entry from an allocation set")]
    fn reset_allocation(&self, Parameters(p): Parameters<AllocationIdParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::reset_allocation(&mut session, p.allocation_id).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Delete an allocation set")]
    fn delete_allocation(&self, Parameters(p): Parameters<AllocationIdParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::delete_allocation(&mut session, p.allocation_id).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Compute ingredient masses for a target ABV from a balanced allocation set")]
    fn plan_allocation_amounts(&self, Parameters(p): Parameters<PlanAllocationAmountsParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = allocations::plan_allocation_amounts(
            &mut session,
            p.allocation_id,
            p.target_abv,
            p.batch_size,
            p.volume_unit.as_deref(),
        )
        .map_err(invalid)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for MeadCalcService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "meadcalc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Mead Calculator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Mead Calculator (meadcalc) - Gravity, ABV and fermentable planning for mead and wine. \
                 IMPORTANT: Call calculator_instructions before planning a batch. \
                 Calculator: list_ingredients, calculate_abv, estimate_gravity, plan_target_abv, convert_gravity_scale. \
                 Units: convert_mass, normalize_mass, convert_volume, get/set_unit_preferences. \
                 Allocations: create/get/reset/delete_allocation, add/remove_allocation_entry, \
                 set_allocation_percentage, plan_allocation_amounts. \
                 Masses are stored in pounds and volumes in US gallons; results render in the session's units."
                    .into(),
            ),
        }
    }
}
