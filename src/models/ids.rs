//! Integer identifiers for race entities.
//!
//! Entities refer to each other through these ids instead of shared
//! references, so categories, courses and entries can live in plain
//! owned `Vec`s.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifies a [`Course`](super::Course).
    CourseId
);
define_id!(
    /// Identifies a [`Category`](super::Category).
    CategoryId
);
define_id!(
    /// Identifies an [`Entry`](super::Entry).
    EntryId
);
define_id!(
    /// Identifies a club or other organisation.
    OrganisationId
);
