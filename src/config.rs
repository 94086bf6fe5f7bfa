//! Startup configuration
//!
//! Default unit preferences come from the environment.

use crate::measure::{UnitPreferences, UnitSystem};

/// Mass unit system for new sessions: `imperial` or `metric`
pub const MASS_UNITS_ENV: &str = "MEADCALC_MASS_UNITS";
/// Volume unit system for new sessions: `imperial` or `metric`
pub const VOLUME_UNITS_ENV: &str = "MEADCALC_VOLUME_UNITS";

fn system_from_value(var: &str, value: Option<&str>) -> UnitSystem {
    match value {
        None => UnitSystem::default(),
        Some(raw) => UnitSystem::parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                "Ignoring {}={:?}: expected 'imperial' or 'metric'",
                var,
                raw
            );
            UnitSystem::default()
        }),
    }
}

/// Build unit preferences from raw setting values
pub fn preferences_from_values(mass: Option<&str>, volume: Option<&str>) -> UnitPreferences {
    UnitPreferences::new(
        system_from_value(MASS_UNITS_ENV, mass),
        system_from_value(VOLUME_UNITS_ENV, volume),
    )
}

/// Read unit preferences from the environment, defaulting to imperial
pub fn unit_preferences_from_env() -> UnitPreferences {
    let mass = std::env::var(MASS_UNITS_ENV).ok();
    let volume = std::env::var(VOLUME_UNITS_ENV).ok();
    preferences_from_values(mass.as_deref(), volume.as_deref())
}
