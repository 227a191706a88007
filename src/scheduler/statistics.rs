//! Start list quality metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | `entries_total` | Number of starts over all categories |
//! | `last_start` | Latest absolute start slot |
//! | `starts_per_slot` | Slot → number of starts in it |
//! | `entries_per_slot` | Multiplicity → number of slots with it |
//! | `entries_per_slot_avg` | Starts per minute over `[0, last_start]` |
//! | `entries_per_slot_var` | Variance of starts per minute over the same span |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Race, Slot};

/// Summary of a filled start list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    /// All starts, assigned or not.
    pub entries_total: usize,
    /// Starts without a time offset.
    pub unassigned: usize,
    /// Latest absolute start slot.
    pub last_start: Option<Slot>,
    /// Absolute slot → starts in that slot.
    pub starts_per_slot: BTreeMap<Slot, usize>,
    /// Starts-per-slot multiplicity → number of slots with that multiplicity.
    pub entries_per_slot: BTreeMap<usize, usize>,
    /// Mean starts per minute.
    pub entries_per_slot_avg: f64,
    /// Variance of starts per minute.
    pub entries_per_slot_var: f64,
}

impl ScheduleStatistics {
    /// Computes statistics from the offsets written by the slot filler.
    pub fn calculate(race: &Race) -> Self {
        let entries_total = race.start_count();

        let mut starts_per_slot: BTreeMap<Slot, usize> = BTreeMap::new();
        for slot in race.absolute_starts() {
            *starts_per_slot.entry(slot).or_insert(0) += 1;
        }
        let assigned: usize = starts_per_slot.values().sum();

        let mut entries_per_slot: BTreeMap<usize, usize> = BTreeMap::new();
        for &count in starts_per_slot.values() {
            *entries_per_slot.entry(count).or_insert(0) += 1;
        }

        let last_start = starts_per_slot.keys().next_back().copied();

        // Minutes 0..=last_start, empty minutes included.
        let duration = last_start.map_or(0, |last| (last + 1).max(0)) as f64;
        let (avg, var) = if duration > 0.0 {
            let mean = assigned as f64 / duration;
            let squares: f64 = starts_per_slot
                .values()
                .map(|&c| (c * c) as f64)
                .sum();
            (mean, squares / duration - mean * mean)
        } else {
            (0.0, 0.0)
        };

        Self {
            entries_total,
            unassigned: entries_total - assigned,
            last_start,
            starts_per_slot,
            entries_per_slot,
            entries_per_slot_avg: avg,
            entries_per_slot_var: var,
        }
    }

    /// Largest number of starts sharing one slot.
    pub fn peak_parallel(&self) -> usize {
        self.entries_per_slot.keys().next_back().copied().unwrap_or(0)
    }
}
