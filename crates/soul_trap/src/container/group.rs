use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use soul_trap_proto::{ContainerCapacity, RecordLocator};

use super::error::GroupSpecError;

/// Order in which groups of the same tier are offered to the search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum LoadPriority {
    #[default]
    Auto,
    High,
    Normal,
    Low,
}

impl LoadPriority {
    /// Resolution order used by the map build.
    pub const ORDERED: [LoadPriority; 3] =
        [LoadPriority::High, LoadPriority::Normal, LoadPriority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            LoadPriority::Auto => "auto",
            LoadPriority::High => "high",
            LoadPriority::Normal => "normal",
            LoadPriority::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            LoadPriority::Auto,
            LoadPriority::High,
            LoadPriority::Normal,
            LoadPriority::Low,
        ]
        .into_iter()
        .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for LoadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated container group declaration, not yet resolved against records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerGroupSpec {
    id: String,
    reusable: bool,
    capacity: ContainerCapacity,
    priority: LoadPriority,
    members: Vec<RecordLocator>,
}

impl ContainerGroupSpec {
    pub fn new(
        id: impl Into<String>,
        reusable: bool,
        capacity: ContainerCapacity,
        priority: LoadPriority,
        members: Vec<RecordLocator>,
    ) -> Result<Self, GroupSpecError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GroupSpecError::MissingId);
        }
        if members.is_empty() {
            return Err(GroupSpecError::NoMembers { group: id });
        }

        let mut seen = HashSet::with_capacity(members.len());
        for locator in &members {
            if !seen.insert(locator) {
                return Err(GroupSpecError::DuplicateMembers {
                    group: id,
                    locator: locator.clone(),
                });
            }
        }

        let expected = capacity.member_count();
        if members.len() != expected {
            return Err(GroupSpecError::WrongMemberCount {
                group: id,
                capacity,
                expected,
                found: members.len(),
            });
        }

        Ok(Self {
            id,
            reusable,
            capacity,
            priority,
            members,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_reusable(&self) -> bool {
        self.reusable
    }

    pub fn capacity(&self) -> ContainerCapacity {
        self.capacity
    }

    /// Declared priority, with `Auto` resolved from the reusable flag.
    pub fn priority(&self) -> LoadPriority {
        match self.priority {
            LoadPriority::Auto if self.reusable => LoadPriority::High,
            LoadPriority::Auto => LoadPriority::Normal,
            explicit => explicit,
        }
    }

    pub fn members(&self) -> &[RecordLocator] {
        &self.members
    }

    pub fn empty_member(&self) -> &RecordLocator {
        &self.members[0]
    }
}
