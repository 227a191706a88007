//! Slot allocation, start list filling and schedule statistics.
//!
//! # Pipeline
//!
//! 1. Build [`StartConstraints`] from the race.
//! 2. Let a [`SlotAllocator`] assign each course an [`AffineSeq`] of slots:
//!    [`GreedyAllocator`] (fast fallback) or
//!    [`OptimalAllocator`](crate::cp::OptimalAllocator) (constraint model).
//! 3. [`fill_slots`] places every start on a concrete slot.
//! 4. [`ScheduleStatistics`] summarises the result.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Coffman, Garey, Johnson (1996), "Approximation Algorithms for Bin Packing"

mod disjoin;
mod filler;
mod greedy;
mod occupancy;
mod statistics;

pub use disjoin::disjoin;
pub use filler::{fill_slots, SlotFiller};
pub use greedy::GreedyAllocator;
pub use occupancy::SlotOccupancy;
pub use statistics::ScheduleStatistics;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{AffineSeq, CourseId, Slot, StartConstraints};

/// Allocated start slots per course.
pub type SlotPlan = BTreeMap<CourseId, AffineSeq>;

/// Assigns every course a sequence of start slots.
pub trait SlotAllocator {
    /// Allocates slots for every course registered in `constraints`.
    fn allocate(&self, constraints: &StartConstraints) -> Result<SlotPlan>;
}

/// Latest slot used by any course of the plan (the makespan).
pub fn plan_last_start(plan: &SlotPlan) -> Option<Slot> {
    plan.values().filter_map(AffineSeq::last).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_last_start() {
        let mut plan = SlotPlan::new();
        assert_eq!(plan_last_start(&plan), None);

        plan.insert(CourseId(1), AffineSeq::new(0, 10, 2).unwrap());
        plan.insert(CourseId(2), AffineSeq::new(3, 12, 3).unwrap());
        plan.insert(CourseId(3), AffineSeq::range(5, 5));
        assert_eq!(plan_last_start(&plan), Some(9));
    }
}
