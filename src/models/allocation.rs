//! Ingredient allocation model
//!
//! An ordered set of (ingredient, percentage of fermentable sugar) entries.
//! The sum of percentages never exceeds 100. One entry may be designated the
//! base (honey by convention); it absorbs the slack whenever a peer changes.

use serde::Serialize;

use super::catalog::{ingredient, HONEY_ID};
use crate::error::{CalcError, CalcResult};

/// Identifier of an entry, unique within its set
pub type EntryId = u32;

/// Percentage sums within this distance of 100 count as balanced
pub const PERCENT_TOLERANCE: f64 = 1e-6;

const FULL: f64 = 100.0;

/// One ingredient's share of the total fermentable sugar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntry {
    pub id: EntryId,
    pub ingredient_id: String,
    pub percentage: f64,
}

/// Where a set stands relative to the 100% target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationState {
    /// No entries
    Empty,
    /// Populated, percentages do not total 100
    Unbalanced,
    /// Populated, percentages total 100 and amounts can be computed
    Balanced,
}

/// Mass of one ingredient needed to supply its share of a sugar target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientAmount {
    pub entry_id: EntryId,
    pub ingredient_id: String,
    pub display_name: String,
    pub percentage: f64,
    /// Fermentable sugar this ingredient contributes, in pounds
    pub sugar_lbs: f64,
    /// Ingredient mass required, in pounds
    pub mass_lbs: f64,
}

/// An ordered collection of allocation entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllocationSet {
    entries: Vec<AllocationEntry>,
    base: Option<EntryId>,
    next_id: EntryId,
}

fn check_percentage(value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::validation("Percentage must be a number"))
    }
}

impl AllocationSet {
    /// Create an empty set with no base entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a honey base entry at 100%
    pub fn with_honey_base() -> Self {
        let mut set = Self::new();
        let id = set.push(HONEY_ID, FULL);
        set.base = Some(id);
        set
    }

    fn push(&mut self, ingredient_id: &str, percentage: f64) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(AllocationEntry {
            id,
            ingredient_id: ingredient_id.to_string(),
            percentage,
        });
        id
    }

    fn index_of(&self, id: EntryId) -> CalcResult<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CalcError::not_found(format!("Allocation entry {} not found", id)))
    }

    fn sum_except(&self, id: EntryId) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.id != id)
            .map(|e| e.percentage)
            .sum()
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> CalcResult<&AllocationEntry> {
        let idx = self.index_of(id)?;
        Ok(&self.entries[idx])
    }

    pub fn base_id(&self) -> Option<EntryId> {
        self.base
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark an existing entry as the slack-absorbing base
    pub fn designate_base(&mut self, id: EntryId) -> CalcResult<()> {
        self.index_of(id)?;
        self.base = Some(id);
        Ok(())
    }

    /// Append an entry for a catalog ingredient at 0%
    pub fn add_entry(&mut self, ingredient_id: &str) -> CalcResult<EntryId> {
        let def = ingredient(ingredient_id)?;
        let id = self.push(def.id, 0.0);
        tracing::debug!("Added allocation entry {} ({})", id, def.id);
        Ok(id)
    }

    /// Remove an entry, returning its share to the base entry
    pub fn remove_entry(&mut self, id: EntryId) -> CalcResult<AllocationEntry> {
        let idx = self.index_of(id)?;
        let removed = self.entries.remove(idx);

        match self.base {
            Some(base_id) if base_id == id => self.base = None,
            Some(base_id) => {
                if let Some(base) = self.entries.iter_mut().find(|e| e.id == base_id) {
                    base.percentage = (base.percentage + removed.percentage).min(FULL);
                }
            }
            None => {}
        }

        Ok(removed)
    }

    /// Store a percentage clamped to the headroom left by every other entry
    ///
    /// Returns the value actually stored; callers resync their display to it.
    pub fn set_percentage(&mut self, id: EntryId, new_percentage: f64) -> CalcResult<f64> {
        check_percentage(new_percentage)?;
        let idx = self.index_of(id)?;

        let headroom = (FULL - self.sum_except(id)).max(0.0);
        let clamped = new_percentage.clamp(0.0, headroom);
        if clamped != new_percentage {
            tracing::debug!(
                "Clamped entry {} from {}% to {}%",
                id,
                new_percentage,
                clamped
            );
        }

        self.entries[idx].percentage = clamped;
        Ok(clamped)
    }

    /// Apply a peer's change and move the base by the opposite amount
    ///
    /// The base is clamped to [0, 100]. If the total would still exceed 100,
    /// the changed entry is cut back first and the base only after it reaches
    /// zero. Without a base (or when the base itself changed) this is
    /// `set_percentage`. Returns the value stored for `changed_id`.
    pub fn auto_rebalance_base(
        &mut self,
        changed_id: EntryId,
        new_percentage: f64,
        old_percentage: f64,
    ) -> CalcResult<f64> {
        check_percentage(new_percentage)?;
        check_percentage(old_percentage)?;
        let changed_idx = self.index_of(changed_id)?;

        let base_idx = match self.base.filter(|b| *b != changed_id) {
            Some(base_id) => self.index_of(base_id)?,
            None => return self.set_percentage(changed_id, new_percentage),
        };

        let new_percentage = new_percentage.clamp(0.0, FULL);
        self.entries[changed_idx].percentage = new_percentage;

        let base = &mut self.entries[base_idx];
        base.percentage = (base.percentage - (new_percentage - old_percentage)).clamp(0.0, FULL);

        let total = self.total_percentage();
        if total > FULL {
            let excess = total - FULL;
            let cut = excess.min(self.entries[changed_idx].percentage);
            self.entries[changed_idx].percentage -= cut;

            let remaining = excess - cut;
            if remaining > 0.0 {
                let base = &mut self.entries[base_idx];
                base.percentage = (base.percentage - remaining).max(0.0);
            }
            tracing::debug!("Capped entry {} to keep allocation at 100%", changed_id);
        }

        Ok(self.entries[changed_idx].percentage)
    }

    /// Edit an entry's percentage the way the calculator form does
    ///
    /// Peers of a base entry rebalance against it; everything else is clamped.
    pub fn update_percentage(&mut self, id: EntryId, new_percentage: f64) -> CalcResult<f64> {
        let old = self.entry(id)?.percentage;
        match self.base {
            Some(base_id) if base_id != id => self.auto_rebalance_base(id, new_percentage, old),
            _ => self.set_percentage(id, new_percentage),
        }
    }

    pub fn total_percentage(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    pub fn is_balanced(&self) -> bool {
        !self.entries.is_empty() && (self.total_percentage() - FULL).abs() <= PERCENT_TOLERANCE
    }

    pub fn state(&self) -> AllocationState {
        if self.entries.is_empty() {
            AllocationState::Empty
        } else if self.is_balanced() {
            AllocationState::Balanced
        } else {
            AllocationState::Unbalanced
        }
    }

    /// Remove every entry
    pub fn reset(&mut self) {
        self.entries.clear();
        self.base = None;
    }

    /// Split a sugar target across the entries and convert to ingredient masses
    ///
    /// Requires the percentages to total 100.
    pub fn amounts_for_target(&self, total_sugar_lbs: f64) -> CalcResult<Vec<IngredientAmount>> {
        if !total_sugar_lbs.is_finite() || total_sugar_lbs < 0.0 {
            return Err(CalcError::validation("Total sugar mass must be a non-negative number"));
        }
        if !self.is_balanced() {
            return Err(CalcError::validation(format!(
                "Ingredient percentages must total 100% (currently {:.1}%)",
                self.total_percentage()
            )));
        }

        let mut amounts = Vec::new();
        for entry in self.entries.iter().filter(|e| e.percentage > 0.0) {
            let def = ingredient(&entry.ingredient_id)?;
            let sugar_lbs = total_sugar_lbs * entry.percentage / FULL;
            amounts.push(IngredientAmount {
                entry_id: entry.id,
                ingredient_id: def.id.to_string(),
                display_name: def.display_name.to_string(),
                percentage: entry.percentage,
                sugar_lbs,
                mass_lbs: sugar_lbs / def.fermentable_fraction,
            });
        }

        Ok(amounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ingredient;

    fn assert_invariants(set: &AllocationSet) {
        let total = set.total_percentage();
        assert!(total <= FULL + PERCENT_TOLERANCE, "total {} exceeds 100", total);

        if let Some(base_id) = set.base_id() {
            let peers: Vec<&AllocationEntry> =
                set.entries().iter().filter(|e| e.id != base_id).collect();
            let peer_sum: f64 = peers.iter().map(|e| e.percentage).sum();
            for peer in &peers {
                let others = peer_sum - peer.percentage;
                assert!(peer.percentage <= FULL - others + PERCENT_TOLERANCE);
            }
        }
        for e in set.entries() {
            assert!(e.percentage >= 0.0 && e.percentage <= FULL);
        }
    }

    #[test]
    fn test_honey_base_starts_balanced() {
        let set = AllocationSet::with_honey_base();
        assert_eq!(set.entries().len(), 1);
        assert_eq!(set.state(), AllocationState::Balanced);
        assert_eq!(set.entries()[0].ingredient_id, "honey");
    }

    #[test]
    fn test_add_entry_starts_at_zero() {
        let mut set = AllocationSet::new();
        assert_eq!(set.state(), AllocationState::Empty);

        let id = set.add_entry("raspberry").unwrap();
        assert_eq!(set.entry(id).unwrap().percentage, 0.0);
        assert_eq!(set.state(), AllocationState::Unbalanced);
    }

    #[test]
    fn test_add_unknown_ingredient_fails() {
        let mut set = AllocationSet::new();
        assert!(matches!(set.add_entry("kiwi"), Err(CalcError::NotFound(_))));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_percentage_clamps_to_headroom() {
        let mut set = AllocationSet::new();
        let a = set.add_entry("apple").unwrap();
        let b = set.add_entry("pear").unwrap();

        assert_eq!(set.set_percentage(a, 70.0).unwrap(), 70.0);
        assert_eq!(set.set_percentage(b, 50.0).unwrap(), 30.0);
        assert_eq!(set.set_percentage(b, -5.0).unwrap(), 0.0);
        assert!(set.set_percentage(a, f64::NAN).is_err());
        assert_invariants(&set);
    }

    #[test]
    fn test_rebalance_moves_base() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        let fruit = set.add_entry("blueberry").unwrap();

        assert_eq!(set.update_percentage(fruit, 30.0).unwrap(), 30.0);
        assert_eq!(set.entry(honey).unwrap().percentage, 70.0);
        assert_eq!(set.state(), AllocationState::Balanced);

        assert_eq!(set.update_percentage(fruit, 10.0).unwrap(), 10.0);
        assert_eq!(set.entry(honey).unwrap().percentage, 90.0);
    }

    #[test]
    fn test_rebalance_caps_changed_entry() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        let a = set.add_entry("apple").unwrap();
        let b = set.add_entry("cherry").unwrap();

        set.update_percentage(a, 50.0).unwrap();
        assert_eq!(set.entry(honey).unwrap().percentage, 50.0);

        // Base bottoms out at 0, so b can only take the remaining 50
        assert_eq!(set.update_percentage(b, 80.0).unwrap(), 50.0);
        assert_eq!(set.entry(honey).unwrap().percentage, 0.0);
        assert!((set.total_percentage() - 100.0).abs() < PERCENT_TOLERANCE);
        assert_invariants(&set);
    }

    #[test]
    fn test_rebalance_with_stale_old_value_keeps_cap() {
        let mut set = AllocationSet::with_honey_base();
        let a = set.add_entry("apple").unwrap();
        let b = set.add_entry("pear").unwrap();
        set.update_percentage(a, 40.0).unwrap();
        set.update_percentage(b, 40.0).unwrap();

        set.auto_rebalance_base(a, 40.0, 100.0).unwrap();
        assert_invariants(&set);
    }

    #[test]
    fn test_editing_base_is_clamped() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        let a = set.add_entry("apple").unwrap();
        set.update_percentage(a, 25.0).unwrap();

        assert_eq!(set.update_percentage(honey, 90.0).unwrap(), 75.0);
        assert_eq!(set.update_percentage(honey, 60.0).unwrap(), 60.0);
        assert_eq!(set.state(), AllocationState::Unbalanced);
    }

    #[test]
    fn test_remove_returns_share_to_base() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        let a = set.add_entry("apple").unwrap();
        set.update_percentage(a, 35.0).unwrap();

        let removed = set.remove_entry(a).unwrap();
        assert_eq!(removed.percentage, 35.0);
        assert_eq!(set.entry(honey).unwrap().percentage, 100.0);
        assert!(set.remove_entry(a).is_err());
    }

    #[test]
    fn test_remove_base_clears_designation() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        let a = set.add_entry("apple").unwrap();
        set.update_percentage(a, 20.0).unwrap();

        set.remove_entry(honey).unwrap();
        assert_eq!(set.base_id(), None);
        assert_eq!(set.state(), AllocationState::Unbalanced);

        set.remove_entry(a).unwrap();
        assert_eq!(set.state(), AllocationState::Empty);
    }

    #[test]
    fn test_state_transitions_and_reset() {
        let mut set = AllocationSet::new();
        let a = set.add_entry("cane-sugar").unwrap();
        set.set_percentage(a, 100.0).unwrap();
        assert_eq!(set.state(), AllocationState::Balanced);
        set.set_percentage(a, 40.0).unwrap();
        assert_eq!(set.state(), AllocationState::Unbalanced);
        set.reset();
        assert_eq!(set.state(), AllocationState::Empty);
        assert_eq!(set.base_id(), None);
    }

    #[test]
    fn test_designate_base() {
        let mut set = AllocationSet::new();
        let a = set.add_entry("apple").unwrap();
        let b = set.add_entry("maple-syrup").unwrap();
        set.set_percentage(b, 100.0).unwrap();
        set.designate_base(b).unwrap();

        set.update_percentage(a, 20.0).unwrap();
        assert_eq!(set.entry(b).unwrap().percentage, 80.0);
        assert!(set.designate_base(99).is_err());
    }

    #[test]
    fn test_invariants_hold_over_operation_sequence() {
        let ids = ["apple", "pear", "cane-sugar", "agave", "grape-juice"];
        let mut set = AllocationSet::with_honey_base();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..2000 {
            let roll = next();
            let live: Vec<EntryId> = set.entries().iter().map(|e| e.id).collect();
            match roll % 6 {
                0 => {
                    set.add_entry(ids[(roll / 6) as usize % ids.len()]).unwrap();
                }
                1 if !live.is_empty() => {
                    set.remove_entry(live[(roll / 6) as usize % live.len()]).unwrap();
                }
                2 if !live.is_empty() => {
                    let id = live[(roll / 6) as usize % live.len()];
                    set.set_percentage(id, (next() % 130) as f64 - 10.0).unwrap();
                }
                3 | 4 if !live.is_empty() => {
                    let id = live[(roll / 6) as usize % live.len()];
                    set.update_percentage(id, (next() % 1300) as f64 / 10.0 - 10.0).unwrap();
                }
                5 if !live.is_empty() => {
                    let id = live[(roll / 6) as usize % live.len()];
                    let old = (next() % 101) as f64;
                    set.auto_rebalance_base(id, (next() % 101) as f64, old).unwrap();
                }
                _ => {
                    if set.is_empty() {
                        set = AllocationSet::with_honey_base();
                    }
                }
            }
            assert_invariants(&set);
        }
    }

    #[test]
    fn test_amounts_require_balance() {
        let mut set = AllocationSet::with_honey_base();
        let honey = set.base_id().unwrap();
        set.set_percentage(honey, 90.0).unwrap();

        let err = set.amounts_for_target(10.0).unwrap_err();
        assert!(err.is_validation());
        assert!(AllocationSet::new().amounts_for_target(10.0).is_err());
    }

    #[test]
    fn test_amounts_for_target_honey_only() {
        let set = AllocationSet::with_honey_base();
        let amounts = set.amounts_for_target(9.937888).unwrap();
        assert_eq!(amounts.len(), 1);
        assert!((amounts[0].mass_lbs - 12.42236).abs() < 0.001);
    }

    #[test]
    fn test_amounts_sum_back_to_sugar_target() {
        let mut set = AllocationSet::with_honey_base();
        let a = set.add_entry("raspberry").unwrap();
        let b = set.add_entry("brown-sugar").unwrap();
        let c = set.add_entry("elderflower").unwrap();
        set.update_percentage(a, 25.0).unwrap();
        set.update_percentage(b, 12.5).unwrap();
        set.update_percentage(c, 0.0).unwrap();

        let target = 11.3;
        let amounts = set.amounts_for_target(target).unwrap();
        // Zero-percentage entries are skipped
        assert_eq!(amounts.len(), 3);

        let sugar: f64 = amounts
            .iter()
            .map(|a| a.mass_lbs * ingredient(&a.ingredient_id).unwrap().fermentable_fraction)
            .sum();
        assert!((sugar - target).abs() < 1e-9);

        let raspberry = amounts.iter().find(|x| x.entry_id == a).unwrap();
        assert_eq!(raspberry.display_name, "Raspberry");
        assert!((raspberry.mass_lbs - target * 0.25 / 0.12).abs() < 1e-9);
    }
}
