//! Error types for start-time scheduling.
//!
//! Every failure in this crate is one-shot: nothing is retried internally.
//! The caller decides whether to relax constraints and run again.

use crate::models::{CategoryId, CourseId};
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Which phase of the optimal allocator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePhase {
    /// Makespan minimisation.
    Makespan,
    /// Spacing/offset optimisation under a fixed makespan.
    Quality,
}

impl std::fmt::Display for SolvePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Makespan => f.write_str("makespan"),
            Self::Quality => f.write_str("quality"),
        }
    }
}

/// Errors raised while building sequences, allocating slots or filling them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// An affine pattern string could not be parsed.
    #[error("invalid affine pattern '{0}'")]
    InvalidPattern(String),

    /// An affine sequence was given a step below one.
    #[error("step must be positive, got {0}")]
    InvalidStep(i64),

    /// Scheduling parameters are unusable (e.g. zero interval).
    #[error("invalid start constraints: {0}")]
    InvalidConstraints(String),

    /// The greedy allocator found no admissible first slot for a course.
    #[error("no free start slots for course {course} within {horizon} minutes")]
    SlotsExhausted { course: CourseId, horizon: i64 },

    /// The constraint model has no solution.
    #[error("no feasible start schedule exists ({phase} phase)")]
    Infeasible { phase: SolvePhase },

    /// The time budget ran out before any schedule was found.
    #[error("no start schedule found within the time limit ({phase} phase)")]
    Timeout { phase: SolvePhase },

    /// A course ran out of slots while real starters were still waiting.
    #[error("course {course} ran out of slots while assigning category {category}")]
    FillerExhausted {
        course: CourseId,
        category: CategoryId,
    },

    /// Race data failed validation.
    #[error("race data is invalid: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
