//! Measurement module
//!
//! Mass and volume units, canonical conversions and display formatting.

pub mod converter;
pub mod units;

pub use converter::{
    canonical_to_display, canonical_to_display_volume, compound_to_canonical, format_mass,
    format_mass_imperial, format_mass_metric, format_volume, mass_to_canonical,
    normalize_overflow, parse_input, volume_to_canonical, CompoundMass,
};
pub use units::{MassUnit, UnitPreferences, UnitSystem, VolumeUnit};
