//! Race, course and category models.
//!
//! These are the plain-data views of the persistence layer that the
//! scheduler consumes. Categories own their starts; everything else is
//! referenced by id.
//!
//! # Time Model
//! All offsets are whole minutes. A category's `time_offset` is measured from
//! the race's first start; a start's `time_offset` is measured from its
//! category's `time_offset`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{CategoryId, CourseId, Entry, EntryId, Slot};

/// A course: an ordered sequence of controls shared by one or more categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Human-readable name.
    pub name: String,
    /// Label of the first control. Courses sharing it must not start together.
    pub first_control: Option<String>,
}

impl Course {
    /// Creates a course without first-control information.
    pub fn new(id: CourseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            first_control: None,
        }
    }

    /// Sets the first control label.
    pub fn with_first_control(mut self, control: impl Into<String>) -> Self {
        self.first_control = Some(control.into());
        self
    }
}

/// A competitor's start within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Start {
    /// The entry that starts.
    pub entry_id: EntryId,
    /// Non-competitive starters are placed after the competitive ones.
    pub competitive: bool,
    /// Minutes after the category's anchor. Written by the slot filler.
    pub time_offset: Option<Slot>,
}

impl Start {
    /// Creates a competitive start.
    pub fn new(entry_id: EntryId) -> Self {
        Self {
            entry_id,
            competitive: true,
            time_offset: None,
        }
    }

    /// Creates a non-competitive start.
    pub fn non_competitive(entry_id: EntryId) -> Self {
        Self {
            competitive: false,
            ..Self::new(entry_id)
        }
    }
}

/// A competitive class running one course in this race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Full name (e.g. "Men 21 Elite").
    pub name: String,
    /// Short name (e.g. "H21E").
    pub short_name: String,
    /// Course this category runs in this race.
    pub course_id: CourseId,
    /// Starters of this category.
    pub starts: Vec<Start>,
    /// Empty slots reserved before the first starter.
    pub vacancies_before: u32,
    /// Empty slots reserved after the last starter.
    pub vacancies_after: u32,
    /// Minutes after the race's first start. Written by the slot filler.
    pub time_offset: Option<Slot>,
}

impl Category {
    /// Creates an empty category on the given course.
    pub fn new(id: CategoryId, name: impl Into<String>, course_id: CourseId) -> Self {
        let name = name.into();
        Self {
            id,
            short_name: name.clone(),
            name,
            course_id,
            starts: Vec::new(),
            vacancies_before: 0,
            vacancies_after: 0,
            time_offset: None,
        }
    }

    /// Sets the short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    /// Adds a start.
    pub fn with_start(mut self, start: Start) -> Self {
        self.starts.push(start);
        self
    }

    /// Sets the number of vacant slots before and after the category.
    pub fn with_vacancies(mut self, before: u32, after: u32) -> Self {
        self.vacancies_before = before;
        self.vacancies_after = after;
        self
    }

    /// Slots this category occupies on its course, without the trailing gap.
    ///
    /// Competitive and non-competitive starters are separated by one empty
    /// slot, which counts here when both groups are present.
    pub fn slot_demand(&self) -> usize {
        let competitive = self.starts.iter().filter(|s| s.competitive).count();
        let split = usize::from(competitive > 0 && competitive < self.starts.len());
        self.starts.len() + split + self.vacancies_before as usize + self.vacancies_after as usize
    }
}

/// One race of an event: its courses, categories and entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Race {
    /// Courses offered in this race.
    pub courses: Vec<Course>,
    /// Categories with their starts.
    pub categories: Vec<Category>,
    /// Entries referenced by the starts.
    pub entries: Vec<Entry>,
}

impl Race {
    /// Creates an empty race.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Adds an entry.
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Finds a category by id.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Finds an entry by id.
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry lookup table.
    pub fn entry_index(&self) -> HashMap<EntryId, &Entry> {
        self.entries.iter().map(|e| (e.id, e)).collect()
    }

    /// Total number of starts over all categories.
    pub fn start_count(&self) -> usize {
        self.categories.iter().map(|c| c.starts.len()).sum()
    }

    /// Absolute start slot (category anchor + start offset), once both are set.
    pub fn absolute_start(category: &Category, start: &Start) -> Option<Slot> {
        Some(category.time_offset? + start.time_offset?)
    }

    /// Iterates the absolute slots of every assigned start.
    pub fn absolute_starts(&self) -> impl Iterator<Item = Slot> + '_ {
        self.categories.iter().flat_map(|category| {
            category
                .starts
                .iter()
                .filter_map(move |start| Self::absolute_start(category, start))
        })
    }
}
