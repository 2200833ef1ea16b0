//! Error types for container group loading and map queries.

use std::error::Error;
use std::fmt;

use soul_trap_proto::{ContainerCapacity, RecordId, RecordLocator, SoulSize};

/// Malformed group declaration. Aborts that group only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSpecError {
    MissingId,
    NoMembers { group: String },
    DuplicateMembers {
        group: String,
        locator: RecordLocator,
    },
    InvalidCapacity { group: String, value: String },
    InvalidPriority { group: String, value: String },
    WrongMemberCount {
        group: String,
        capacity: ContainerCapacity,
        expected: usize,
        found: usize,
    },
    InvalidMember {
        group: String,
        index: usize,
        reason: String,
    },
    InvalidField {
        group: String,
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for GroupSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSpecError::MissingId => write!(f, "container group is missing a string id"),
            GroupSpecError::NoMembers { group } => {
                write!(f, "container group \"{group}\" does not have any members")
            }
            GroupSpecError::DuplicateMembers { group, locator } => {
                write!(f, "container group \"{group}\" lists {locator} more than once")
            }
            GroupSpecError::InvalidCapacity { group, value } => {
                write!(f, "container group \"{group}\" has invalid capacity {value}")
            }
            GroupSpecError::InvalidPriority { group, value } => {
                write!(f, "container group \"{group}\" has invalid priority {value}")
            }
            GroupSpecError::WrongMemberCount {
                group,
                capacity,
                expected,
                found,
            } => write!(
                f,
                "container group \"{group}\" has capacity {capacity} and must have {expected} members (found {found})"
            ),
            GroupSpecError::InvalidMember {
                group,
                index,
                reason,
            } => write!(f, "container group \"{group}\" member {index} is invalid: {reason}"),
            GroupSpecError::InvalidField {
                group,
                field,
                expected,
            } => write!(
                f,
                "container group \"{group}\" field \"{field}\" is missing or not a {expected}"
            ),
        }
    }
}

impl Error for GroupSpecError {}

/// A resolved record violates a structural invariant of its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntegrityError {
    MissingRecord { locator: RecordLocator },
    DuplicateRecord { record: RecordId },
    CapacityMismatch {
        record: RecordId,
        expected: SoulSize,
        found: SoulSize,
    },
    FillLevelMismatch {
        record: RecordId,
        index: usize,
        expected: SoulSize,
        found: SoulSize,
    },
    ExtraMembers { count: usize },
    MissingLinkedCompanion { record: RecordId },
    UnknownLinkedCompanion {
        record: RecordId,
        companion: RecordId,
    },
    LinkedCompanionNotEmpty {
        record: RecordId,
        companion: RecordId,
    },
}

impl FormIntegrityError {
    /// Broken reusable linkage makes charge consumption unsound, so it is not
    /// allowed to degrade into a skipped group.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FormIntegrityError::MissingLinkedCompanion { .. }
                | FormIntegrityError::UnknownLinkedCompanion { .. }
                | FormIntegrityError::LinkedCompanionNotEmpty { .. }
        )
    }
}

impl fmt::Display for FormIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormIntegrityError::MissingRecord { locator } => {
                write!(f, "record {locator} does not exist")
            }
            FormIntegrityError::DuplicateRecord { record } => {
                write!(f, "record {record} is listed more than once")
            }
            FormIntegrityError::CapacityMismatch {
                record,
                expected,
                found,
            } => write!(
                f,
                "record {record} has capacity {found} but the group expects {expected}"
            ),
            FormIntegrityError::FillLevelMismatch {
                record,
                index,
                expected,
                found,
            } => write!(
                f,
                "record {record} at index {index} contains a {found} soul but should contain {expected}"
            ),
            FormIntegrityError::ExtraMembers { count } => {
                write!(f, "black container groups take 2 members, found {count}")
            }
            FormIntegrityError::MissingLinkedCompanion { record } => write!(
                f,
                "reusable record {record} contains a soul but has no linked empty companion"
            ),
            FormIntegrityError::UnknownLinkedCompanion { record, companion } => write!(
                f,
                "linked companion {companion} of reusable record {record} does not exist"
            ),
            FormIntegrityError::LinkedCompanionNotEmpty { record, companion } => write!(
                f,
                "linked companion {companion} of reusable record {record} is not empty"
            ),
        }
    }
}

impl Error for FormIntegrityError {}

/// A dual group could not be paired with its black counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    MissingCounterpart { group: String },
    CounterpartUnavailable { group: String, black_group: String },
    EmptyRecordMismatch { group: String, black_group: String },
    AmbiguousFilledRecord {
        group: String,
        black_group: String,
        record: RecordId,
    },
    AlreadyHoldsBlack { group: String },
    Integrity {
        group: String,
        source: FormIntegrityError,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::MissingCounterpart { group } => write!(
                f,
                "dual container group \"{group}\" has no black group sharing its empty member"
            ),
            MergeError::CounterpartUnavailable { group, black_group } => write!(
                f,
                "black container group \"{black_group}\" paired with \"{group}\" failed to load"
            ),
            MergeError::EmptyRecordMismatch { group, black_group } => write!(
                f,
                "container groups \"{group}\" and \"{black_group}\" do not share the same empty record"
            ),
            MergeError::AmbiguousFilledRecord {
                group,
                black_group,
                record,
            } => write!(
                f,
                "container groups \"{group}\" and \"{black_group}\" share the fully-filled record {record} and cannot be disambiguated"
            ),
            MergeError::AlreadyHoldsBlack { group } => {
                write!(f, "container group \"{group}\" already holds a black member")
            }
            MergeError::Integrity { group, .. } => {
                write!(f, "error while resolving dual container group \"{group}\":")
            }
        }
    }
}

impl Error for MergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MergeError::Integrity { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Why one group was left out of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLoadError {
    Integrity {
        group: String,
        source: FormIntegrityError,
    },
    Merge(MergeError),
}

impl GroupLoadError {
    pub fn group(&self) -> &str {
        match self {
            GroupLoadError::Integrity { group, .. } => group,
            GroupLoadError::Merge(
                MergeError::MissingCounterpart { group }
                | MergeError::CounterpartUnavailable { group, .. }
                | MergeError::EmptyRecordMismatch { group, .. }
                | MergeError::AmbiguousFilledRecord { group, .. }
                | MergeError::AlreadyHoldsBlack { group }
                | MergeError::Integrity { group, .. },
            ) => group,
        }
    }
}

impl fmt::Display for GroupLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLoadError::Integrity { group, .. } => {
                write!(f, "error while adding container group \"{group}\" to the map:")
            }
            GroupLoadError::Merge(_) => write!(f, "error while merging dual container group:"),
        }
    }
}

impl Error for GroupLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GroupLoadError::Integrity { source, .. } => Some(source),
            GroupLoadError::Merge(source) => Some(source),
        }
    }
}

/// The map could not be built at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapBuildError {
    FatalIntegrity {
        group: String,
        source: FormIntegrityError,
    },
    NoGroupsLoaded,
}

impl fmt::Display for MapBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapBuildError::FatalIntegrity { group, .. } => {
                write!(f, "container group \"{group}\" has broken reusable linkage:")
            }
            MapBuildError::NoGroupsLoaded => write!(f, "no valid container groups loaded"),
        }
    }
}

impl Error for MapBuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MapBuildError::FatalIntegrity { source, .. } => Some(source),
            MapBuildError::NoGroupsLoaded => None,
        }
    }
}

/// A lookup outside the valid (capacity, fill level) domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeError {
    pub capacity: ContainerCapacity,
    pub fill: SoulSize,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fill level {} is out of range for capacity {}",
            self.fill, self.capacity
        )
    }
}

impl Error for RangeError {}

/// Logs an error followed by each of its causes, one level per line.
pub fn log_error_chain(error: &(dyn Error + 'static)) {
    tracing::error!("{error}");
    let mut depth = 1usize;
    let mut cause = error.source();
    while let Some(current) = cause {
        tracing::error!("{:indent$}{current}", "", indent = depth * 2);
        depth += 1;
        cause = current.source();
    }
}
