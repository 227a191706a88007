//! Input validation for start list runs.
//!
//! Checks structural integrity of race data and scheduling parameters
//! before any slot is allocated. Detects:
//! - Duplicate IDs
//! - Categories on unknown courses
//! - Starts (and start requests) referring to unknown entries
//! - Entries starting more than once
//! - Conflict groups naming unknown courses
//! - Unusable interval or parallel cap

use std::collections::HashSet;

use crate::error::ScheduleError;
use crate::models::{Race, StartConstraints};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A category runs on a course that doesn't exist.
    UnknownCourse,
    /// A start or request refers to an entry that doesn't exist.
    UnknownEntry,
    /// The same entry starts twice.
    DuplicateStart,
    /// A conflict group names a course that doesn't exist.
    UnknownConflictCourse,
    /// A numeric scheduling parameter is out of range.
    InvalidParameter,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ScheduleError::Validation(errors)
    }
}

/// Validates race data against the scheduling parameters.
///
/// Checks:
/// 1. No duplicate course, category or entry IDs
/// 2. Every category runs on an existing course
/// 3. Every start and every start request refers to an existing entry
/// 4. No entry starts twice
/// 5. Conflict groups only name existing courses
/// 6. `interval >= 1` and `parallel_max >= 1`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_race(race: &Race, constraints: &StartConstraints) -> ValidationResult {
    let mut errors = Vec::new();

    let mut course_ids = HashSet::new();
    for course in &race.courses {
        if !course_ids.insert(course.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }
    }

    let mut entry_ids = HashSet::new();
    for entry in &race.entries {
        if !entry_ids.insert(entry.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate entry ID: {}", entry.id),
            ));
        }
    }

    let mut category_ids = HashSet::new();
    let mut started = HashSet::new();
    for category in &race.categories {
        if !category_ids.insert(category.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate category ID: {}", category.id),
            ));
        }

        if !course_ids.contains(&category.course_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!(
                    "Category '{}' runs on unknown course {}",
                    category.name, category.course_id
                ),
            ));
        }

        for start in &category.starts {
            if !entry_ids.contains(&start.entry_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownEntry,
                    format!(
                        "Category '{}' starts unknown entry {}",
                        category.name, start.entry_id
                    ),
                ));
            }
            if !started.insert(start.entry_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateStart,
                    format!("Entry {} starts more than once", start.entry_id),
                ));
            }
        }
    }

    // Check request references
    for entry in &race.entries {
        let others = entry
            .start_time_allocation_requests
            .iter()
            .filter_map(|r| r.other_entry);
        for other in others {
            if !entry_ids.contains(&other) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownEntry,
                    format!("Entry {} requests relation to unknown entry {other}", entry.id),
                ));
            }
        }
    }

    for group in &constraints.conflicts {
        for course in group {
            if !course_ids.contains(course) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownConflictCourse,
                    format!("Conflict group names unknown course {course}"),
                ));
            }
        }
    }

    if constraints.interval < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            format!("Interval must be at least 1, got {}", constraints.interval),
        ));
    }
    if constraints.parallel_max == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Parallel start cap must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
