//! Start list filling.
//!
//! Walks each course's allocated slots and assigns categories and starters
//! to concrete minutes:
//!
//! 1. The category is anchored at the next free slot.
//! 2. `vacancies_before` slots are skipped.
//! 3. Competitive starters, then non-competitive ones, are placed in random
//!    order (early requests first, late requests last, clubs declustered),
//!    each group followed by one empty slot.
//! 4. `vacancies_after` slots are skipped.
//!
//! Running out of gap or vacancy slots at the end of a course is tolerated.
//! Running out while placing starters means the slot counts did not match
//! the race data and is an error.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::iter::Peekable;
use tracing::{debug, instrument, warn};

use super::{disjoin, SlotPlan};
use crate::error::{Result, ScheduleError};
use crate::models::{
    AffineSeq, AffineSeqIter, CategoryId, Entry, EntryId, Race, Slot, Start, StartConstraints,
    StartPreference,
};

/// Assigns start times with an injected random source.
///
/// Seed the random source for reproducible start lists.
#[derive(Debug)]
pub struct SlotFiller<'c, R> {
    constraints: &'c StartConstraints,
    rng: R,
}

impl<'c, R: Rng> SlotFiller<'c, R> {
    /// Creates a filler for one set of constraints.
    pub fn new(constraints: &'c StartConstraints, rng: R) -> Self {
        Self { constraints, rng }
    }

    /// Writes `time_offset` onto every category and start of `race`.
    pub fn fill(&mut self, race: &mut Race, plan: &SlotPlan) -> Result<()> {
        fill_slots(race, self.constraints, plan, &mut self.rng)
    }
}

/// Writes `time_offset` onto every category and start of `race`.
///
/// Previous offsets are cleared first. Courses without an entry in `plan`
/// get no slots; their categories fail if they have starters.
#[instrument(skip_all, fields(courses = race.courses.len()))]
pub fn fill_slots<R: Rng + ?Sized>(
    race: &mut Race,
    constraints: &StartConstraints,
    plan: &SlotPlan,
    rng: &mut R,
) -> Result<()> {
    let Race {
        courses,
        categories,
        entries,
    } = race;

    for category in categories.iter_mut() {
        category.time_offset = None;
        for start in &mut category.starts {
            start.time_offset = None;
        }
    }

    let entries: HashMap<EntryId, &Entry> = entries.iter().map(|e| (e.id, e)).collect();
    let positions: HashMap<CategoryId, usize> = categories
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.id, idx))
        .collect();

    for course in courses.iter() {
        let seq = plan
            .get(&course.id)
            .copied()
            .unwrap_or_else(|| AffineSeq::range(0, 0));
        let mut slots = seq.iter().peekable();

        for category_id in constraints.get_categories(course.id) {
            let Some(&idx) = positions.get(category_id) else {
                continue;
            };
            let category = &mut categories[idx];

            let Some(&anchor) = slots.peek() else {
                if category.starts.is_empty() {
                    continue;
                }
                return Err(ScheduleError::FillerExhausted {
                    course: course.id,
                    category: category.id,
                });
            };
            category.time_offset = Some(anchor);

            skip(&mut slots, category.vacancies_before);

            let (competitive, non_competitive): (Vec<usize>, Vec<usize>) =
                (0..category.starts.len()).partition(|&i| category.starts[i].competitive);

            for group in [competitive, non_competitive] {
                if group.is_empty() {
                    continue;
                }
                let starts = &mut category.starts;
                assign_entries_randomly(starts, &group, anchor, &entries, &mut slots, rng)
                    .ok_or(ScheduleError::FillerExhausted {
                        course: course.id,
                        category: category.id,
                    })?;

                // One empty slot after each group; may be missing at the end of a course.
                if slots.next().is_none() {
                    debug!(course = %course.id, category = %category.id, "no gap slot left");
                }
            }

            if skip(&mut slots, category.vacancies_after) < category.vacancies_after {
                warn!(
                    course = %course.id,
                    category = %category.id,
                    "trailing vacancies truncated at end of course"
                );
            }
        }
    }

    Ok(())
}

/// Consumes up to `n` slots; returns how many were available.
fn skip(slots: &mut Peekable<AffineSeqIter>, n: u32) -> u32 {
    let mut skipped = 0;
    while skipped < n && slots.next().is_some() {
        skipped += 1;
    }
    skipped
}

/// Places `group` (indices into `starts`) on the next slots.
///
/// Returns `None` if the slots ran out before every start was placed.
fn assign_entries_randomly<R: Rng + ?Sized>(
    starts: &mut [Start],
    group: &[usize],
    anchor: Slot,
    entries: &HashMap<EntryId, &Entry>,
    slots: &mut Peekable<AffineSeqIter>,
    rng: &mut R,
) -> Option<()> {
    let mut early = Vec::new();
    let mut normal = Vec::new();
    let mut late = Vec::new();

    for &i in group {
        let preference = entries
            .get(&starts[i].entry_id)
            .map(|e| e.start_preference())
            .unwrap_or_default();
        match preference {
            StartPreference::Early => early.push(i),
            StartPreference::Normal => normal.push(i),
            StartPreference::Late => late.push(i),
        }
    }

    early.shuffle(rng);
    normal.shuffle(rng);
    late.shuffle(rng);

    let mut sequence = early;
    sequence.append(&mut normal);
    sequence.append(&mut late);

    disjoin(&mut sequence, |&i| {
        entries
            .get(&starts[i].entry_id)
            .and_then(|e| e.organisation)
    });

    for i in sequence {
        let slot = slots.next()?;
        starts[i].time_offset = Some(slot - anchor);
    }

    Some(())
}
