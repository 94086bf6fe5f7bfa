//! Unit MCP Tools
//!
//! Mass and volume conversion, compound mass normalization, and the
//! session's unit preferences.

use serde::Serialize;

use super::allocations::{render_allocation_plan, AllocationPlanResponse};
use super::calculations::{resolve_mass_unit, resolve_volume_unit};
use crate::measure::{
    canonical_to_display, canonical_to_display_volume, format_mass, format_volume,
    mass_to_canonical, normalize_overflow, parse_input, volume_to_canonical, CompoundMass,
    MassUnit, UnitPreferences, UnitSystem, VolumeUnit,
};
use crate::session::{CalculatorSession, SetId};

/// A mass expressed in every supported unit
#[derive(Debug, Serialize)]
pub struct MassReadings {
    pub pounds: f64,
    pub ounces: f64,
    pub kilograms: f64,
    pub grams: f64,
    pub imperial_display: String,
    pub metric_display: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertMassResponse {
    pub input: String,
    pub unit: MassUnit,
    /// None while the input is empty
    pub readings: Option<MassReadings>,
}

#[derive(Debug, Serialize)]
pub struct VolumeReadings {
    pub gallons: f64,
    pub liters: f64,
    pub imperial_display: String,
    pub metric_display: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertVolumeResponse {
    pub input: String,
    pub unit: VolumeUnit,
    pub readings: Option<VolumeReadings>,
}

#[derive(Debug, Serialize)]
pub struct NormalizeMassResponse {
    #[serde(flatten)]
    pub mass: CompoundMass,
    pub pounds: f64,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct UnitPreferencesResponse {
    pub preferences: UnitPreferences,
    pub mass_units: String,
    pub volume_units: String,
}

#[derive(Debug, Serialize)]
pub struct SetUnitPreferencesResponse {
    #[serde(flatten)]
    pub current: UnitPreferencesResponse,
    /// Recorded allocation plans re-rendered in the new units
    pub updated_plans: Vec<AllocationPlanResponse>,
    /// Planned sets whose amounts are withheld until they are balanced again
    pub pending_plans: Vec<PendingPlan>,
}

#[derive(Debug, Serialize)]
pub struct PendingPlan {
    pub allocation_id: SetId,
    pub message: String,
}

fn describe(units: UnitPreferences) -> UnitPreferencesResponse {
    let mass = units.mass;
    let volume = units.volume.volume_unit();
    UnitPreferencesResponse {
        preferences: units,
        mass_units: format!(
            "{} ({} + {})",
            mass.as_str(),
            mass.main_mass_unit().symbol(),
            mass.sub_mass_unit().symbol()
        ),
        volume_units: format!("{} ({})", units.volume.as_str(), volume.symbol()),
    }
}

fn parse_system(raw: &str) -> Result<UnitSystem, String> {
    UnitSystem::parse(raw)
        .ok_or_else(|| format!("Unknown unit system: {} (expected imperial or metric)", raw))
}

/// Convert a raw mass entry to every supported unit
pub fn convert_mass(value: &str, unit: &str) -> Result<ConvertMassResponse, String> {
    let unit = resolve_mass_unit(Some(unit), MassUnit::Pound)?;
    let parsed = parse_input(value).map_err(|e| e.to_string())?;

    let readings = parsed.map(|v| {
        let pounds = mass_to_canonical(v, unit);
        MassReadings {
            pounds,
            ounces: canonical_to_display(pounds, MassUnit::Ounce),
            kilograms: canonical_to_display(pounds, MassUnit::Kilogram),
            grams: canonical_to_display(pounds, MassUnit::Gram),
            imperial_display: format_mass(pounds, UnitSystem::Imperial),
            metric_display: format_mass(pounds, UnitSystem::Metric),
        }
    });

    Ok(ConvertMassResponse {
        input: value.trim().to_string(),
        unit,
        readings,
    })
}

/// Convert a raw volume entry to gallons and liters
pub fn convert_volume(value: &str, unit: &str) -> Result<ConvertVolumeResponse, String> {
    let unit = resolve_volume_unit(Some(unit), VolumeUnit::Gallon)?;
    let parsed = parse_input(value).map_err(|e| e.to_string())?;

    let readings = parsed.map(|v| {
        let gallons = volume_to_canonical(v, unit);
        VolumeReadings {
            gallons,
            liters: canonical_to_display_volume(gallons, VolumeUnit::Liter),
            imperial_display: format_volume(gallons, UnitSystem::Imperial),
            metric_display: format_volume(gallons, UnitSystem::Metric),
        }
    });

    Ok(ConvertVolumeResponse {
        input: value.trim().to_string(),
        unit,
        readings,
    })
}

/// Carry overflowing ounces or grams into the main unit
pub fn normalize_mass(main: f64, sub: f64, system: &str) -> Result<NormalizeMassResponse, String> {
    let system = parse_system(system)?;
    let mass = normalize_overflow(main, sub, system).map_err(|e| e.to_string())?;
    let pounds = mass.to_pounds();

    Ok(NormalizeMassResponse {
        mass,
        pounds,
        display: format_mass(pounds, system),
    })
}

pub fn get_unit_preferences(session: &CalculatorSession) -> UnitPreferencesResponse {
    describe(session.units())
}

/// Change the session's unit systems and re-render any recorded plans
pub fn set_unit_preferences(
    session: &mut CalculatorSession,
    mass: Option<&str>,
    volume: Option<&str>,
) -> Result<SetUnitPreferencesResponse, String> {
    let current = session.units();
    let mass = mass.map(parse_system).transpose()?.unwrap_or(current.mass);
    let volume = volume.map(parse_system).transpose()?.unwrap_or(current.volume);

    let planned = session.set_units(UnitPreferences::new(mass, volume));
    let mut updated_plans = Vec::with_capacity(planned.len());
    let mut pending_plans = Vec::new();
    for id in planned {
        match render_allocation_plan(session, id) {
            Ok(Some(plan)) => updated_plans.push(plan),
            Ok(None) => {}
            Err(message) => {
                tracing::debug!("Allocation set {} not re-rendered: {}", id, message);
                pending_plans.push(PendingPlan {
                    allocation_id: id,
                    message,
                });
            }
        }
    }

    Ok(SetUnitPreferencesResponse {
        current: describe(session.units()),
        updated_plans,
        pending_plans,
    })
}
