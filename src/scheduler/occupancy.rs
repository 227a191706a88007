//! Per-slot start counters.

use std::collections::HashMap;

use crate::models::{AffineSeq, Slot};

/// Number of courses starting in each slot.
#[derive(Debug, Clone, Default)]
pub struct SlotOccupancy {
    counts: HashMap<Slot, usize>,
}

impl SlotOccupancy {
    /// Creates an empty occupancy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Courses starting at `slot`.
    #[inline]
    pub fn count(&self, slot: Slot) -> usize {
        self.counts.get(&slot).copied().unwrap_or(0)
    }

    /// Whether every slot of `seq` still has room below `cap`.
    ///
    /// `None` means unbounded.
    pub fn has_room(&self, seq: &AffineSeq, cap: Option<usize>) -> bool {
        match cap {
            Some(cap) => seq.iter().all(|slot| self.count(slot) < cap),
            None => true,
        }
    }

    /// Marks every slot of `seq` as used once more.
    pub fn occupy(&mut self, seq: &AffineSeq) {
        for slot in seq {
            *self.counts.entry(slot).or_insert(0) += 1;
        }
    }

    /// Highest count over all slots.
    pub fn peak(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }
}
