//! Start-time scheduling for orienteering races.
//!
//! Assigns every competitor a start minute such that courses sharing a
//! first control never start together, no more than `parallel_max`
//! competitors start in the same minute, and the last start is as early as
//! possible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Race`, `Course`, `Category`, `Start`,
//!   `Entry`, `AffineSeq`, `StartConstraints`
//! - **`scheduler`**: Greedy slot allocation, start list filling, statistics
//! - **`cp`**: Two-phase constraint optimisation and its solver interface
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling references)
//! - **`error`**: `ScheduleError` and the crate `Result` alias
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use o_schedule::models::{
//!     Category, CategoryId, Course, CourseId, EntryId, Race, Start, StartConstraints,
//! };
//! use o_schedule::scheduler::{fill_slots, GreedyAllocator, ScheduleStatistics, SlotAllocator};
//!
//! let mut race = Race::new()
//!     .with_course(Course::new(CourseId(1), "A"))
//!     .with_category(
//!         Category::new(CategoryId(1), "H21", CourseId(1))
//!             .with_start(Start::new(EntryId(1)))
//!             .with_start(Start::new(EntryId(2))),
//!     );
//! let mut constraints = StartConstraints::new(2);
//! constraints.add_race_courses(&race);
//!
//! let plan = GreedyAllocator::new().allocate(&constraints).unwrap();
//! fill_slots(&mut race, &constraints, &plan, &mut StdRng::seed_from_u64(7)).unwrap();
//!
//! let stats = ScheduleStatistics::calculate(&race);
//! assert_eq!(stats.last_start, Some(2));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Rossi, van Beek, Walsh (2006), "Handbook of Constraint Programming"

pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, ScheduleError, SolvePhase};
