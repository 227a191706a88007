//! Start list domain models.
//!
//! Plain-data views of a race (courses, categories, starts, entries) plus
//! the two scheduler-specific types: [`AffineSeq`] for sets of start slots
//! and [`StartConstraints`] for the parameters of one scheduling run.
//!
//! # Domain Mappings
//!
//! | o-schedule | Orienteering |
//! |------------|--------------|
//! | Slot | Start minute after the race's first start |
//! | Course | Sequence of controls, shared by categories |
//! | Category | Competitive class (e.g. H21, D45) |
//! | Start | A competitor's place in the start list |

mod affine_seq;
mod constraint;
mod entry;
mod ids;
mod race;

pub use affine_seq::{gcd, lcm, AffineSeq, Iter as AffineSeqIter};
pub use constraint::StartConstraints;
pub use entry::{Entry, RequestKind, StartPreference, StartTimeAllocationRequest};
pub use ids::{CategoryId, CourseId, EntryId, OrganisationId};
pub use race::{Category, Course, Race, Start};

/// A start slot: minutes after the race's first start.
pub type Slot = i64;
