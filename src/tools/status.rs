//! Meadcalc Status Tool
//!
//! Provides runtime status information about the meadcalc service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::measure::UnitPreferences;

/// Calculator usage instructions for AI assistants
pub const CALCULATOR_INSTRUCTIONS: &str = r#"
# Mead Calculator Instructions

This guide explains how to plan and check a mead or wine batch with the
meadcalc tools.

## Units

Masses are stored in pounds and volumes in US gallons. Results are rendered
in the session's unit preferences.

- `get_unit_preferences` shows the current mass and volume systems
- `set_unit_preferences(mass: "metric", volume: "imperial")` changes them;
  mass and volume are chosen independently
- Any recipe already planned from an allocation set is re-rendered in the new
  units in the same response; sets that no longer total 100% are listed under
  `pending_plans` instead

Mass displays are compound: "3 lbs 2 oz" or "1 kg 250 g".

## Checking a Finished Batch

```
calculate_abv(original_gravity: 1.100, final_gravity: 1.010)
```

Returns ABV (percent), potential ABV from the OG, and apparent attenuation.
Original gravity must be higher than final gravity.

## Planning a Recipe

**Honey only, or honey plus one fruit:**
```
plan_target_abv(target_abv: 12, batch_size: 5)
plan_target_abv(target_abv: 12, batch_size: 5, honey_percentage: 80, fruit: "blueberry")
```

**Any mix of fermentables (allocation sets):**

1. `create_allocation(honey_base: true)` starts a set holding honey at 100%
2. `add_allocation_entry(allocation_id: 0, ingredient_id: "cherry")` adds cherry at 0%
3. `set_allocation_percentage(allocation_id: 0, entry_id: 1, percentage: 20)`
   moves 20% from honey to cherry
4. `plan_allocation_amounts(allocation_id: 0, target_abv: 12, batch_size: 5)`

The honey entry is the base: when any other entry changes, the base absorbs
the difference so the set stays at 100%. Removing an entry returns its share
to the base. Without a base, percentages must be balanced by hand; a set that
does not total 100% cannot be planned.

## Estimating Gravity From Ingredients

```
estimate_gravity(batch_size: 5, ingredients: [
  { ingredient_id: "honey", amount: 12, unit: "lbs" },
  { ingredient_id: "raspberry", amount: 3, unit: "lbs" }
])
```

## Gravity Scales

```
convert_gravity_scale(value: 12.4, scale: "brix")
```

Scales: `sg`, `brix`, `baume`, `abv`, `abw`.

## Conversions

- `convert_mass(value: "2", unit: "kg")`
- `convert_volume(value: "19", unit: "L")`
- `normalize_mass(main: 2, sub: 18, system: "imperial")` returns 3 lbs 2 oz

## Ingredients

Call `list_ingredients` for ids and fermentable sugar fractions.
"#;

/// Runtime status of the meadcalc service
#[derive(Debug, Clone, Serialize)]
pub struct MeadcalcStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Session information
    pub unit_preferences: UnitPreferences,
    pub active_allocations: usize,

    /// Process information
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Get the current status
    pub fn get_status(&self, units: UnitPreferences, active_allocations: usize) -> MeadcalcStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MeadcalcStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            unit_preferences: units,
            active_allocations,
            started_at: self.started_at,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_session() {
        let tracker = StatusTracker::new();
        let status = tracker.get_status(UnitPreferences::default(), 2);
        assert_eq!(status.active_allocations, 2);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, crate::build_info::VERSION);
        assert!(status.started_at <= Utc::now());
    }

    #[test]
    fn test_instructions_name_tools() {
        for tool in ["calculate_abv", "plan_target_abv", "create_allocation", "set_unit_preferences"] {
            assert!(CALCULATOR_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
