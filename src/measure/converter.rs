//! Unit conversion functions
//!
//! Converts harness values to canonical pounds/gallons and back, and renders
//! masses as compound "whole + fraction" strings.

use serde::Serialize;

use super::units::{MassUnit, UnitSystem, VolumeUnit, G_PER_KG, OZ_PER_LB};
use crate::error::{CalcError, CalcResult};

/// Convert a mass in the given unit to canonical pounds
pub fn mass_to_canonical(value: f64, unit: MassUnit) -> f64 {
    value / unit.per_pound()
}

/// Convert canonical pounds to the given display unit
pub fn canonical_to_display(pounds: f64, unit: MassUnit) -> f64 {
    pounds * unit.per_pound()
}

/// Convert a volume in the given unit to canonical gallons
pub fn volume_to_canonical(value: f64, unit: VolumeUnit) -> f64 {
    value / unit.per_gallon()
}

/// Convert canonical gallons to the given display unit
pub fn canonical_to_display_volume(gallons: f64, unit: VolumeUnit) -> f64 {
    gallons * unit.per_gallon()
}

/// Parse a raw harness input
///
/// Empty input is a valid intermediate state and yields `Ok(None)`.
pub fn parse_input(raw: &str) -> CalcResult<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CalcError::validation(format!("'{}' is not a number", trimmed))),
    }
}

/// A mass split into a main unit and a sub unit (lb + oz, or kg + g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompoundMass {
    pub main: f64,
    pub sub: f64,
    pub system: UnitSystem,
}

impl CompoundMass {
    /// Total mass in canonical pounds
    pub fn to_pounds(&self) -> f64 {
        compound_to_canonical(self.main, self.sub, self.system)
    }
}

/// Convert a main + sub unit pair to canonical pounds
pub fn compound_to_canonical(main: f64, sub: f64, system: UnitSystem) -> f64 {
    let main_units = main + sub / system.sub_units_per_main();
    mass_to_canonical(main_units, system.main_mass_unit())
}

/// Carry a sub-unit value at or above its threshold into the main unit
///
/// `(2 lb, 18 oz)` becomes `(3 lb, 2 oz)`. Already-normalized pairs come back
/// unchanged.
pub fn normalize_overflow(main: f64, sub: f64, system: UnitSystem) -> CalcResult<CompoundMass> {
    if !main.is_finite() || !sub.is_finite() {
        return Err(CalcError::validation("Mass must be a number"));
    }
    if main < 0.0 || sub < 0.0 {
        return Err(CalcError::validation("Mass cannot be negative"));
    }

    let threshold = system.sub_units_per_main();
    if sub < threshold {
        return Ok(CompoundMass { main, sub, system });
    }

    let carry = (sub / threshold).floor();
    tracing::debug!(
        "Normalizing {} {} into {} extra {}",
        sub,
        system.sub_mass_unit().symbol(),
        carry,
        system.main_mass_unit().symbol()
    );

    Ok(CompoundMass {
        main: main + carry,
        sub: sub - carry * threshold,
        system,
    })
}

/// Split a mass in main units into whole main units and rounded sub units,
/// carrying when rounding reaches the threshold
fn split_whole(main_units: f64, threshold: f64) -> (u64, u64) {
    let main_units = main_units.max(0.0);
    let mut whole = main_units.floor();
    let mut sub = ((main_units - whole) * threshold).round();
    if sub >= threshold {
        whole += 1.0;
        sub = 0.0;
    }
    (whole as u64, sub as u64)
}

fn format_compound(whole: u64, sub: u64, main_symbol: &str, sub_symbol: &str) -> String {
    match (whole, sub) {
        (0, 0) => format!("0 {}", main_symbol),
        (w, 0) => format!("{} {}", w, main_symbol),
        (0, s) => format!("{} {}", s, sub_symbol),
        (w, s) => format!("{} {} {} {}", w, main_symbol, s, sub_symbol),
    }
}

/// Format pounds as whole pounds and rounded ounces, e.g. "3 lbs 2 oz"
pub fn format_mass_imperial(pounds: f64) -> String {
    let (lbs, oz) = split_whole(pounds, OZ_PER_LB);
    let pound_symbol = if lbs == 1 { "lb" } else { MassUnit::Pound.symbol() };
    format_compound(lbs, oz, pound_symbol, MassUnit::Ounce.symbol())
}

/// Format kilograms as whole kilograms and rounded grams, e.g. "1 kg 250 g"
pub fn format_mass_metric(kg: f64) -> String {
    let (kgs, g) = split_whole(kg, G_PER_KG);
    format_compound(kgs, g, MassUnit::Kilogram.symbol(), MassUnit::Gram.symbol())
}

/// Format canonical pounds in the given unit system
pub fn format_mass(pounds: f64, system: UnitSystem) -> String {
    match system {
        UnitSystem::Imperial => format_mass_imperial(pounds),
        UnitSystem::Metric => format_mass_metric(canonical_to_display(pounds, MassUnit::Kilogram)),
    }
}

/// Format canonical gallons in the given unit system, e.g. "5.00 gal"
pub fn format_volume(gallons: f64, system: UnitSystem) -> String {
    let unit = system.volume_unit();
    format!("{:.2} {}", canonical_to_display_volume(gallons, unit), unit.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_round_trip() {
        for x in [0.0, 0.001, 1.0, 2.5, 12.4224, 1000.0, 123456.789] {
            let back = canonical_to_display(mass_to_canonical(x, MassUnit::Kilogram), MassUnit::Kilogram);
            assert!((back - x).abs() <= 1e-9 * x.max(1.0), "round trip drifted for {}", x);

            let back = canonical_to_display(mass_to_canonical(x, MassUnit::Gram), MassUnit::Gram);
            assert!((back - x).abs() <= 1e-9 * x.max(1.0));
        }
    }

    #[test]
    fn test_volume_round_trip() {
        for x in [0.0, 1.0, 5.0, 18.927, 250.0] {
            let back = canonical_to_display_volume(volume_to_canonical(x, VolumeUnit::Liter), VolumeUnit::Liter);
            assert!((back - x).abs() <= 1e-9 * x.max(1.0));
        }
    }

    #[test]
    fn test_known_conversions() {
        assert!((canonical_to_display(1.0, MassUnit::Kilogram) - 0.453592).abs() < 1e-12);
        assert!((mass_to_canonical(1.0, MassUnit::Kilogram) - 2.20462).abs() < 1e-4);
        assert!((mass_to_canonical(8.0, MassUnit::Ounce) - 0.5).abs() < 1e-12);
        assert!((canonical_to_display_volume(1.0, VolumeUnit::Liter) - 3.78541).abs() < 1e-12);
        assert!((volume_to_canonical(1.0, VolumeUnit::Liter) - 0.264172).abs() < 1e-6);
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(""), Ok(None));
        assert_eq!(parse_input("   "), Ok(None));
        assert_eq!(parse_input(" 1.060 "), Ok(Some(1.06)));
        assert!(parse_input("abc").unwrap_err().is_validation());
        assert!(parse_input("inf").is_err());
    }

    #[test]
    fn test_normalize_overflow_carries() {
        let n = normalize_overflow(2.0, 18.0, UnitSystem::Imperial).unwrap();
        assert_eq!(n.main, 3.0);
        assert_eq!(n.sub, 2.0);
        assert_eq!(2.0 + 18.0 / 16.0, n.main + n.sub / 16.0);

        let n = normalize_overflow(1.0, 2500.0, UnitSystem::Metric).unwrap();
        assert_eq!(n.main, 3.0);
        assert_eq!(n.sub, 500.0);
    }

    #[test]
    fn test_normalize_overflow_is_idempotent() {
        let once = normalize_overflow(2.0, 18.0, UnitSystem::Imperial).unwrap();
        let twice = normalize_overflow(once.main, once.sub, UnitSystem::Imperial).unwrap();
        assert_eq!(once, twice);

        let untouched = normalize_overflow(4.0, 15.5, UnitSystem::Imperial).unwrap();
        assert_eq!(untouched.main, 4.0);
        assert_eq!(untouched.sub, 15.5);
    }

    #[test]
    fn test_normalize_overflow_exact_threshold() {
        let n = normalize_overflow(0.0, 16.0, UnitSystem::Imperial).unwrap();
        assert_eq!((n.main, n.sub), (1.0, 0.0));
    }

    #[test]
    fn test_normalize_overflow_rejects_negative() {
        assert!(normalize_overflow(-1.0, 2.0, UnitSystem::Imperial).is_err());
        assert!(normalize_overflow(1.0, f64::NAN, UnitSystem::Metric).is_err());
    }

    #[test]
    fn test_compound_preserves_total() {
        let before = compound_to_canonical(2.0, 18.0, UnitSystem::Imperial);
        let after = normalize_overflow(2.0, 18.0, UnitSystem::Imperial).unwrap().to_pounds();
        assert!((before - after).abs() < 1e-12);
        assert!((before - 3.125).abs() < 1e-12);
    }

    #[test]
    fn test_format_mass_imperial() {
        assert_eq!(format_mass_imperial(0.0), "0 lbs");
        assert_eq!(format_mass_imperial(3.0), "3 lbs");
        assert_eq!(format_mass_imperial(1.0), "1 lb");
        assert_eq!(format_mass_imperial(1.125), "1 lb 2 oz");
        assert_eq!(format_mass_imperial(3.125), "3 lbs 2 oz");
        assert_eq!(format_mass_imperial(0.5), "8 oz");
        // 15.97 oz rounds to 16 and carries into the pound
        assert_eq!(format_mass_imperial(1.998), "2 lbs");
    }

    #[test]
    fn test_format_mass_metric() {
        assert_eq!(format_mass_metric(0.0), "0 kg");
        assert_eq!(format_mass_metric(1.25), "1 kg 250 g");
        assert_eq!(format_mass_metric(0.3), "300 g");
        assert_eq!(format_mass_metric(2.9996), "3 kg");
    }

    #[test]
    fn test_format_mass_by_system() {
        assert_eq!(format_mass(12.5, UnitSystem::Imperial), "12 lbs 8 oz");
        // 1 lb = 453.592 g
        assert_eq!(format_mass(1.0, UnitSystem::Metric), "454 g");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(5.0, UnitSystem::Imperial), "5.00 gal");
        assert_eq!(format_volume(1.0, UnitSystem::Metric), "3.79 L");
    }
}
