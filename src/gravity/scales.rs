//! Sugar and alcohol scale conversions
//!
//! Converts a reading on any of SG, Brix, Baumé, ABV or ABW to all five.
//! Every conversion goes through specific gravity.

use serde::{Deserialize, Serialize};

use super::formulas::{potential_abv, ABV_FACTOR};
use crate::error::{CalcError, CalcResult};

/// Density of ethanol relative to water, used for ABV <-> ABW
pub const ETHANOL_DENSITY_RATIO: f64 = 0.789 / 1.000;

/// A measurement scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityScale {
    Sg,
    Brix,
    Baume,
    Abv,
    Abw,
}

impl GravityScale {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sg" | "gravity" | "specific gravity" => Some(GravityScale::Sg),
            "brix" | "°bx" | "bx" => Some(GravityScale::Brix),
            "baume" | "baumé" | "be" => Some(GravityScale::Baume),
            "abv" => Some(GravityScale::Abv),
            "abw" => Some(GravityScale::Abw),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GravityScale::Sg => "SG",
            GravityScale::Brix => "Brix",
            GravityScale::Baume => "Baumé",
            GravityScale::Abv => "ABV",
            GravityScale::Abw => "ABW",
        }
    }

    /// Accepted input range (inclusive)
    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            GravityScale::Sg => (0.990, 1.200),
            GravityScale::Brix => (0.0, 50.0),
            GravityScale::Baume => (0.0, 25.0),
            GravityScale::Abv | GravityScale::Abw => (0.0, 25.0),
        }
    }

    fn range_message(&self) -> String {
        let (min, max) = self.valid_range();
        match self {
            GravityScale::Sg => format!("SG must be between {:.3} and {:.3}", min, max),
            GravityScale::Abv | GravityScale::Abw => {
                format!("{} must be between {}% and {}%", self.label(), min, max)
            }
            _ => format!("{} must be between {} and {}", self.label(), min, max),
        }
    }

    /// Check a reading against this scale's range
    pub fn validate(&self, value: f64) -> CalcResult<()> {
        let (min, max) = self.valid_range();
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(CalcError::validation(self.range_message()))
        }
    }
}

/// The same reading expressed on every scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleReadings {
    pub sg: f64,
    pub brix: f64,
    pub baume: f64,
    pub abv: f64,
    pub abw: f64,
}

pub fn brix_to_sg(brix: f64) -> f64 {
    brix / (258.6 - (brix / 258.2) * 227.1) + 1.0
}

pub fn baume_to_sg(baume: f64) -> f64 {
    145.0 / (145.0 - baume)
}

pub fn sg_to_brix(sg: f64) -> f64 {
    ((182.4601 * sg - 775.6821) * sg + 1262.7794) * sg - 669.5622
}

pub fn sg_to_baume(sg: f64) -> f64 {
    145.0 - 145.0 / sg
}

/// Approximate inverse of SG -> ABV, kept as the calculator has always
/// computed it. It does not invert `potential_abv`.
pub fn abv_to_sg(abv: f64) -> f64 {
    1.0 + abv / ABV_FACTOR / 1000.0
}

pub fn abv_to_abw(abv: f64) -> f64 {
    abv * ETHANOL_DENSITY_RATIO
}

pub fn abw_to_abv(abw: f64) -> f64 {
    abw / ETHANOL_DENSITY_RATIO
}

/// Convert a reading on `from` to all five scales
///
/// The input scale keeps the exact value supplied; alcohol readings keep
/// their ABV/ABW pair consistent with the input.
pub fn cross_scale_convert(value: f64, from: GravityScale) -> CalcResult<ScaleReadings> {
    from.validate(value)?;

    let sg = match from {
        GravityScale::Sg => value,
        GravityScale::Brix => brix_to_sg(value),
        GravityScale::Baume => baume_to_sg(value),
        GravityScale::Abv => abv_to_sg(value),
        GravityScale::Abw => abv_to_sg(abw_to_abv(value)),
    };

    let abv = match from {
        GravityScale::Abv => value,
        GravityScale::Abw => abw_to_abv(value),
        _ => potential_abv(sg),
    };

    let mut readings = ScaleReadings {
        sg,
        brix: sg_to_brix(sg),
        baume: sg_to_baume(sg),
        abv,
        abw: abv_to_abw(abv),
    };

    match from {
        GravityScale::Brix => readings.brix = value,
        GravityScale::Baume => readings.baume = value,
        GravityScale::Abw => readings.abw = value,
        _ => {}
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sg_scenario() {
        let r = cross_scale_convert(1.050, GravityScale::Sg).unwrap();
        assert_eq!(r.sg, 1.050);
        assert!((r.brix - 12.387).abs() < 0.001);
        assert!((r.baume - 6.905).abs() < 0.001);
        assert!((r.abv - 6.5625).abs() < 1e-9);
        assert!((r.abw - 6.5625 * 0.789).abs() < 1e-9);
    }

    #[test]
    fn test_brix_to_sg() {
        // 12.387 Brix lands back near 1.050
        let r = cross_scale_convert(12.387, GravityScale::Brix).unwrap();
        assert_eq!(r.brix, 12.387);
        assert!((r.sg - 1.050).abs() < 0.001);
    }

    #[test]
    fn test_baume_to_sg() {
        let r = cross_scale_convert(10.0, GravityScale::Baume).unwrap();
        assert!((r.sg - 145.0 / 135.0).abs() < 1e-12);
        assert_eq!(r.baume, 10.0);
    }

    #[test]
    fn test_abv_inverse_is_reproduced_verbatim() {
        let r = cross_scale_convert(10.0, GravityScale::Abv).unwrap();
        assert!((r.sg - (1.0 + 10.0 / 131.25 / 1000.0)).abs() < 1e-15);
        assert_eq!(r.abv, 10.0);
        assert!((r.abw - 7.89).abs() < 1e-9);
    }

    #[test]
    fn test_abw_input() {
        let r = cross_scale_convert(7.89, GravityScale::Abw).unwrap();
        assert_eq!(r.abw, 7.89);
        assert!((r.abv - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_inputs() {
        let err = cross_scale_convert(1.250, GravityScale::Sg).unwrap_err();
        assert_eq!(err, CalcError::validation("SG must be between 0.990 and 1.200"));
        assert!(cross_scale_convert(0.980, GravityScale::Sg).is_err());
        assert!(cross_scale_convert(51.0, GravityScale::Brix).is_err());
        assert!(cross_scale_convert(-1.0, GravityScale::Baume).is_err());
        assert_eq!(
            cross_scale_convert(26.0, GravityScale::Abv).unwrap_err().to_string(),
            "ABV must be between 0% and 25%"
        );
        assert!(cross_scale_convert(f64::NAN, GravityScale::Abw).is_err());
    }

    #[test]
    fn test_range_boundaries_accepted() {
        assert!(cross_scale_convert(0.990, GravityScale::Sg).is_ok());
        assert!(cross_scale_convert(1.200, GravityScale::Sg).is_ok());
        assert!(cross_scale_convert(50.0, GravityScale::Brix).is_ok());
        assert!(cross_scale_convert(0.0, GravityScale::Abv).is_ok());
    }

    #[test]
    fn test_parse_scale() {
        assert_eq!(GravityScale::parse("Brix"), Some(GravityScale::Brix));
        assert_eq!(GravityScale::parse("baumé"), Some(GravityScale::Baume));
        assert_eq!(GravityScale::parse("plato"), None);
    }
}
