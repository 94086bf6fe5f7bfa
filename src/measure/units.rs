//! Unit types and conversion constants
//!
//! Mass is stored canonically in pounds and volume in US gallons. Each
//! conversion has one authoritative factor; the opposite direction divides by
//! that same factor so repeated edits never drift.

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Kilograms per pound (authoritative mass factor)
pub const KG_PER_LB: f64 = 0.453592;
/// Ounces per pound
pub const OZ_PER_LB: f64 = 16.0;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Liters per US gallon (authoritative volume factor)
pub const L_PER_GALLON: f64 = 3.78541;

/// Unit system for mass or volume display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "imperial" | "us" | "lb" | "lbs" | "gal" => Some(UnitSystem::Imperial),
            "metric" | "si" | "kg" | "l" => Some(UnitSystem::Metric),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }

    /// Whole mass unit (pound or kilogram)
    pub fn main_mass_unit(&self) -> MassUnit {
        match self {
            UnitSystem::Imperial => MassUnit::Pound,
            UnitSystem::Metric => MassUnit::Kilogram,
        }
    }

    /// Fractional mass unit (ounce or gram)
    pub fn sub_mass_unit(&self) -> MassUnit {
        match self {
            UnitSystem::Imperial => MassUnit::Ounce,
            UnitSystem::Metric => MassUnit::Gram,
        }
    }

    /// Number of sub units that carry into one main unit
    pub fn sub_units_per_main(&self) -> f64 {
        match self {
            UnitSystem::Imperial => OZ_PER_LB,
            UnitSystem::Metric => G_PER_KG,
        }
    }

    pub fn volume_unit(&self) -> VolumeUnit {
        match self {
            UnitSystem::Imperial => VolumeUnit::Gallon,
            UnitSystem::Metric => VolumeUnit::Liter,
        }
    }
}

/// Mass and volume systems, chosen independently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPreferences {
    pub mass: UnitSystem,
    pub volume: UnitSystem,
}

impl UnitPreferences {
    pub fn new(mass: UnitSystem, volume: UnitSystem) -> Self {
        Self { mass, volume }
    }
}

/// A mass unit the harness may supply values in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    Pound,
    Ounce,
    Kilogram,
    Gram,
}

impl MassUnit {
    /// Parse a mass unit string
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Some(MassUnit::Pound),
            "oz" | "ounce" | "ounces" => Some(MassUnit::Ounce),
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(MassUnit::Kilogram),
            "g" | "gram" | "grams" => Some(MassUnit::Gram),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MassUnit::Pound => "lbs",
            MassUnit::Ounce => "oz",
            MassUnit::Kilogram => "kg",
            MassUnit::Gram => "g",
        }
    }

    /// How many of this unit make up one pound
    pub fn per_pound(&self) -> f64 {
        match self {
            MassUnit::Pound => 1.0,
            MassUnit::Ounce => OZ_PER_LB,
            MassUnit::Kilogram => KG_PER_LB,
            MassUnit::Gram => KG_PER_LB * G_PER_KG,
        }
    }
}

/// A volume unit the harness may supply values in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    Gallon,
    Liter,
}

impl VolumeUnit {
    /// Parse a volume unit string
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "gal" | "gallon" | "gallons" => Some(VolumeUnit::Gallon),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(VolumeUnit::Liter),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            VolumeUnit::Gallon => "gal",
            VolumeUnit::Liter => "L",
        }
    }

    /// How many of this unit make up one gallon
    pub fn per_gallon(&self) -> f64 {
        match self {
            VolumeUnit::Gallon => 1.0,
            VolumeUnit::Liter => L_PER_GALLON,
        }
    }
}
