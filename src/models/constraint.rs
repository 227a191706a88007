//! Start list constraints.
//!
//! Collects everything the slot allocators need to know about a race:
//! the minimum start interval, the cap on simultaneous starts, groups of
//! courses that must never start together, and the order of the
//! categories sharing a course.
//!
//! Multiple categories on the same course start one after another with one
//! unused slot in between, so a course needs
//! `(#categories - 1) + Σ(starts + vacancies + split)` slots, where `split`
//! is the empty slot between the competitive and non-competitive starters
//! of a category that has both.
//!
//! # Reference
//! Deutscher Orientierungslauf-Verband, "Wettkampfbestimmungen" (WKB), §5

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ScheduleError};

use super::{Category, CategoryId, CourseId, Entry, EntryId, Race, RequestKind, Slot};

/// Scheduling parameters for one start list run.
///
/// Built once per run from race data. The category order can only be changed
/// through [`set_category_early`](Self::set_category_early) and
/// [`set_category_late`](Self::set_category_late).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConstraints {
    /// Minimal gap (minutes) between two consecutive starts on one course.
    pub interval: Slot,
    /// Maximal number of starts in the same minute. `None` = unbounded.
    pub parallel_max: Option<usize>,
    /// Groups of courses that must never share a start slot.
    pub conflicts: Vec<Vec<CourseId>>,
    /// Course → categories in start order.
    order: BTreeMap<CourseId, Vec<CategoryId>>,
    /// Category → slots needed (starts + vacancies).
    demand: HashMap<CategoryId, usize>,
}

impl Default for StartConstraints {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StartConstraints {
    /// Creates constraints with the given interval, no cap and no conflicts.
    pub fn new(interval: Slot) -> Self {
        Self {
            interval,
            parallel_max: None,
            conflicts: Vec::new(),
            order: BTreeMap::new(),
            demand: HashMap::new(),
        }
    }

    /// Caps the number of simultaneous starts.
    pub fn with_parallel_max(mut self, parallel_max: usize) -> Self {
        self.parallel_max = Some(parallel_max);
        self
    }

    /// Replaces the conflict groups.
    pub fn with_conflicts(mut self, conflicts: Vec<Vec<CourseId>>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Adds one conflict group.
    pub fn add_conflict_group(&mut self, courses: Vec<CourseId>) {
        self.conflicts.push(courses);
    }

    /// Checks that the numeric parameters are usable.
    pub fn check(&self) -> Result<()> {
        if self.interval < 1 {
            return Err(ScheduleError::InvalidConstraints(format!(
                "interval must be at least 1, got {}",
                self.interval
            )));
        }
        if self.parallel_max == Some(0) {
            return Err(ScheduleError::InvalidConstraints(
                "parallel_max must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Registers every category of the race under its course.
    ///
    /// Categories on the same course are ordered by their entries' start
    /// wishes: the more late-start requests (net of early-start requests), the
    /// later the category starts. Ties keep registration order.
    pub fn add_race_courses(&mut self, race: &Race) {
        let entries: HashMap<EntryId, &Entry> = race.entry_index();

        for category in &race.categories {
            let categories = self.order.entry(category.course_id).or_default();
            if !categories.contains(&category.id) {
                categories.push(category.id);
            }
            self.demand.insert(category.id, category.slot_demand());
        }

        let keys: HashMap<CategoryId, (i64, i64, i64)> = race
            .categories
            .iter()
            .map(|c| (c.id, category_order_key(c, &entries)))
            .collect();

        for categories in self.order.values_mut() {
            categories.sort_by_key(|id| keys.get(id).copied().unwrap_or_default());
        }
    }

    /// Groups courses sharing a first control into conflict groups.
    pub fn add_first_control_conflicts(&mut self, race: &Race) {
        let mut by_control: BTreeMap<&str, Vec<CourseId>> = BTreeMap::new();
        for course in &race.courses {
            if let Some(control) = course.first_control.as_deref() {
                by_control.entry(control).or_default().push(course.id);
            }
        }

        self.conflicts.extend(
            by_control
                .into_values()
                .filter(|courses| courses.len() > 1),
        );
    }

    /// Moves `categories` to the front of the course's order.
    pub fn set_category_early(&mut self, course: CourseId, categories: &[CategoryId]) {
        let current = self.order.remove(&course).unwrap_or_default();
        let mut reordered = categories.to_vec();
        reordered.extend(current.into_iter().filter(|c| !categories.contains(c)));
        self.order.insert(course, reordered);
    }

    /// Moves `categories` to the back of the course's order.
    pub fn set_category_late(&mut self, course: CourseId, categories: &[CategoryId]) {
        let current = self.order.remove(&course).unwrap_or_default();
        let mut reordered: Vec<CategoryId> = current
            .into_iter()
            .filter(|c| !categories.contains(c))
            .collect();
        reordered.extend_from_slice(categories);
        self.order.insert(course, reordered);
    }

    /// Categories of a course in start order; empty for unknown courses.
    pub fn get_categories(&self, course: CourseId) -> &[CategoryId] {
        self.order.get(&course).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Course ids with registered categories, ascending.
    pub fn courses(&self) -> impl Iterator<Item = CourseId> + '_ {
        self.order.keys().copied()
    }

    /// Slots a category needs, as captured by `add_race_courses`.
    pub fn category_demand(&self, category: CategoryId) -> usize {
        self.demand.get(&category).copied().unwrap_or(0)
    }

    /// Slots each course needs, including one gap between its categories.
    pub fn course_slot_counts(&self) -> BTreeMap<CourseId, usize> {
        self.order
            .iter()
            .map(|(&course, categories)| {
                let gaps = categories.len().saturating_sub(1);
                let slots: usize = categories.iter().map(|c| self.category_demand(*c)).sum();
                (course, gaps + slots)
            })
            .collect()
    }

    /// Conflict groups containing `course`.
    pub fn conflict_groups_of(&self, course: CourseId) -> impl Iterator<Item = &[CourseId]> + '_ {
        self.conflicts
            .iter()
            .filter(move |group| group.contains(&course))
            .map(Vec::as_slice)
    }
}

/// Sort key placing late-start-heavy categories last.
///
/// `(late - early, -early, late)`, ascending.
fn category_order_key(category: &Category, entries: &HashMap<EntryId, &Entry>) -> (i64, i64, i64) {
    let (mut early, mut late) = (0i64, 0i64);
    for start in &category.starts {
        if let Some(entry) = entries.get(&start.entry_id) {
            early += entry.request_count(RequestKind::EarlyStart) as i64;
            late += entry.request_count(RequestKind::LateStart) as i64;
        }
    }
    (late - early, -early, late)
}
