//! Greedy block allocator.
//!
//! # Algorithm
//!
//! 1. Sort courses by slot demand, largest first (less fragmentation).
//! 2. For each course, scan first-slot candidates `0, 1, 2, ...` below the
//!    horizon.
//! 3. Accept the first candidate whose block
//!    `AffineSeq(first, first + interval * count, interval)`
//!    keeps every slot under `parallel_max` and shares no slot with an
//!    already placed course of the same conflict group.
//!
//! # Complexity
//! O(c * h * n) where c=courses, h=horizon, n=slots per course.
//!
//! # Reference
//! Coffman, Garey, Johnson (1996), "Approximation Algorithms for Bin
//! Packing: A Survey" (first-fit decreasing)

use tracing::{debug, instrument};

use super::{SlotAllocator, SlotOccupancy, SlotPlan};
use crate::error::{Result, ScheduleError};
use crate::models::{AffineSeq, CourseId, Slot, StartConstraints};

/// First-fit-decreasing slot allocator.
///
/// Deterministic and fast. It does not minimise the makespan; use
/// [`OptimalAllocator`](crate::cp::OptimalAllocator) for that.
///
/// # Example
///
/// ```
/// use o_schedule::models::{
///     AffineSeq, Category, CategoryId, Course, CourseId, EntryId, Race, Start, StartConstraints,
/// };
/// use o_schedule::scheduler::{GreedyAllocator, SlotAllocator};
///
/// let race = Race::new()
///     .with_course(Course::new(CourseId(1), "A"))
///     .with_category(
///         Category::new(CategoryId(1), "H21", CourseId(1))
///             .with_start(Start::new(EntryId(1)))
///             .with_start(Start::new(EntryId(2))),
///     );
/// let mut constraints = StartConstraints::new(3);
/// constraints.add_race_courses(&race);
///
/// let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
/// assert_eq!(plan[&CourseId(1)], AffineSeq::new(0, 6, 3).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyAllocator {
    /// First slots are searched in `[0, horizon)`.
    pub horizon: Slot,
}

impl GreedyAllocator {
    /// Twelve hours of start window.
    pub const DEFAULT_HORIZON: Slot = 12 * 60;

    /// Creates an allocator with the default horizon.
    pub fn new() -> Self {
        Self {
            horizon: Self::DEFAULT_HORIZON,
        }
    }

    /// Sets the horizon for first-slot candidates.
    pub fn with_horizon(mut self, horizon: Slot) -> Self {
        self.horizon = horizon;
        self
    }

    /// Whether `seq` avoids every placed course that conflicts with `course`.
    fn conflict_free(
        constraints: &StartConstraints,
        plan: &SlotPlan,
        course: CourseId,
        seq: &AffineSeq,
    ) -> bool {
        constraints.conflict_groups_of(course).all(|group| {
            group
                .iter()
                .filter(|&&other| other != course)
                .filter_map(|other| plan.get(other))
                .all(|placed| placed.intersect(seq).is_empty())
        })
    }
}

impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotAllocator for GreedyAllocator {
    #[instrument(skip_all, fields(horizon = self.horizon))]
    fn allocate(&self, constraints: &StartConstraints) -> Result<SlotPlan> {
        constraints.check()?;

        let interval = constraints.interval;
        let mut plan = SlotPlan::new();
        let mut occupancy = SlotOccupancy::new();

        // Largest demand first; ties keep ascending course id.
        let mut demands: Vec<(CourseId, usize)> =
            constraints.course_slot_counts().into_iter().collect();
        demands.sort_by(|a, b| b.1.cmp(&a.1));

        for (course, count) in demands {
            let span = interval * count as Slot;
            let mut accepted = None;
            for first in 0..self.horizon {
                let seq = AffineSeq::new(first, first + span, interval)?;
                if occupancy.has_room(&seq, constraints.parallel_max)
                    && Self::conflict_free(constraints, &plan, course, &seq)
                {
                    accepted = Some(seq);
                    break;
                }
            }
            let seq = accepted.ok_or(ScheduleError::SlotsExhausted {
                course,
                horizon: self.horizon,
            })?;

            debug!(%course, count, slots = %seq, "allocated course");
            occupancy.occupy(&seq);
            plan.insert(course, seq);
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryId, Course, EntryId, Race, Start};
    use crate::scheduler::plan_last_start;

    /// One category per course with `starts[i]` starters.
    fn make_constraints(interval: Slot, starts: &[usize]) -> StartConstraints {
        let mut race = Race::new();
        let mut entry = 0;
        for (i, &n) in starts.iter().enumerate() {
            let course = CourseId(i as u32 + 1);
            let mut category = Category::new(CategoryId(i as u32 + 1), format!("C{i}"), course);
            for _ in 0..n {
                entry += 1;
                category = category.with_start(Start::new(EntryId(entry)));
            }
            race = race.with_course(Course::new(course, format!("K{i}"))).with_category(category);
        }
        let mut constraints = StartConstraints::new(interval);
        constraints.add_race_courses(&race);
        constraints
    }

    #[test]
    fn test_single_course() {
        let constraints = make_constraints(3, &[4]);
        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
        assert_eq!(plan[&CourseId(1)], AffineSeq::new(0, 12, 3).unwrap());
        assert_eq!(
            plan[&CourseId(1)].iter().collect::<Vec<_>>(),
            vec![0, 3, 6, 9]
        );
    }

    #[test]
    fn test_conflict_and_capacity() {
        // Both courses share a first control: disjoint slots, one start per minute.
        let constraints = make_constraints(2, &[3, 5])
            .with_parallel_max(1)
            .with_conflicts(vec![vec![CourseId(1), CourseId(2)]]);
        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();

        let a = plan[&CourseId(2)];
        let b = plan[&CourseId(1)];
        // Larger course is placed first.
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
        assert_eq!(b.len(), 3);
        assert!(a.intersect(&b).is_empty());
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_capacity_only() {
        let constraints = make_constraints(1, &[3, 3, 3]).with_parallel_max(2);
        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();

        let mut occupancy = SlotOccupancy::new();
        for seq in plan.values() {
            assert_eq!(seq.len(), 3);
            occupancy.occupy(seq);
        }
        assert!(occupancy.peak() <= 2);
        assert_eq!(plan[&CourseId(3)].start(), 3);
    }

    #[test]
    fn test_conflict_blocks_whole_sequence() {
        // Course 2 cannot start at 0 (shared first slot) nor at 1..=3 since
        // later slots would collide with course 1.
        let constraints = make_constraints(1, &[4, 2])
            .with_conflicts(vec![vec![CourseId(1), CourseId(2)]]);
        let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
        assert_eq!(plan[&CourseId(1)].iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(plan[&CourseId(2)].iter().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(plan_last_start(&plan), Some(5));
    }

    #[test]
    fn test_exhaustion() {
        let constraints = make_constraints(1, &[5, 5]).with_parallel_max(1);
        let err = GreedyAllocator::new()
            .with_horizon(3)
            .allocate(&constraints)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::SlotsExhausted { .. }));
    }

    #[test]
    fn test_invalid_constraints() {
        let constraints = make_constraints(0, &[2]);
        assert!(matches!(
            GreedyAllocator::new().allocate(&constraints),
            Err(ScheduleError::InvalidConstraints(_))
        ));
    }
}
