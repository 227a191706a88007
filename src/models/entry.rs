//! Entry model.
//!
//! An entry is one registration for a race: a competitor (or team) with an
//! optional club and a list of start-time allocation requests.

use serde::{Deserialize, Serialize};

use super::{EntryId, OrganisationId};

/// Kind of start-time allocation request attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// No particular wish.
    Normal,
    /// Start as early as possible within the category.
    EarlyStart,
    /// Start as late as possible within the category.
    LateStart,
    /// Keep apart from another entry.
    SeparatedFrom,
    /// Keep close to another entry.
    GroupedWith,
}

/// A start-time allocation request.
///
/// Only `EarlyStart` and `LateStart` influence the scheduler; the other
/// kinds are carried for import/export fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTimeAllocationRequest {
    /// Request kind.
    pub kind: RequestKind,
    /// Related entry for `SeparatedFrom` / `GroupedWith`.
    pub other_entry: Option<EntryId>,
}

impl StartTimeAllocationRequest {
    /// Creates a request without a related entry.
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            other_entry: None,
        }
    }

    /// Creates a request that refers to another entry.
    pub fn relative_to(kind: RequestKind, other: EntryId) -> Self {
        Self {
            kind,
            other_entry: Some(other),
        }
    }
}

/// Start preference derived from an entry's requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StartPreference {
    /// Wants an early start.
    Early,
    /// No preference.
    #[default]
    Normal,
    /// Wants a late start.
    Late,
}

/// A race entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Competitor or team name.
    pub name: String,
    /// Club the entry belongs to.
    pub organisation: Option<OrganisationId>,
    /// Start-time wishes, in the order they were submitted.
    pub start_time_allocation_requests: Vec<StartTimeAllocationRequest>,
}

impl Entry {
    /// Creates an entry without club or requests.
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            organisation: None,
            start_time_allocation_requests: Vec::new(),
        }
    }

    /// Sets the organisation.
    pub fn with_organisation(mut self, organisation: OrganisationId) -> Self {
        self.organisation = Some(organisation);
        self
    }

    /// Appends a start-time allocation request.
    pub fn with_request(mut self, request: StartTimeAllocationRequest) -> Self {
        self.start_time_allocation_requests.push(request);
        self
    }

    /// Number of requests of the given kind.
    pub fn request_count(&self, kind: RequestKind) -> usize {
        self.start_time_allocation_requests
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    /// The first early/late request decides; everything else is `Normal`.
    pub fn start_preference(&self) -> StartPreference {
        self.start_time_allocation_requests
            .iter()
            .find_map(|r| match r.kind {
                RequestKind::EarlyStart => Some(StartPreference::Early),
                RequestKind::LateStart => Some(StartPreference::Late),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_preference_first_match_wins() {
        let entry = Entry::new(EntryId(1), "A")
            .with_request(StartTimeAllocationRequest::new(RequestKind::Normal))
            .with_request(StartTimeAllocationRequest::relative_to(
                RequestKind::GroupedWith,
                EntryId(2),
            ))
            .with_request(StartTimeAllocationRequest::new(RequestKind::LateStart))
            .with_request(StartTimeAllocationRequest::new(RequestKind::EarlyStart));
        assert_eq!(entry.start_preference(), StartPreference::Late);
    }

    #[test]
    fn test_start_preference_default() {
        let request =
            StartTimeAllocationRequest::relative_to(RequestKind::SeparatedFrom, EntryId(9));
        let entry = Entry::new(EntryId(1), "A").with_request(request);
        assert_eq!(entry.start_preference(), StartPreference::Normal);
    }

    #[test]
    fn test_request_kind_serde_names() {
        let json = serde_json::to_string(&RequestKind::EarlyStart).unwrap();
        assert_eq!(json, "\"EARLY_START\"");
    }
}
