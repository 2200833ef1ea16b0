use std::error::Error;
use std::fmt;

use soul_trap_proto::RecordId;

use crate::container::RangeError;
use crate::inventory::InventoryError;

/// Internal failure during a trapping call. Never surfaces past the entry
/// point; it is logged and turned into a failed trap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapError {
    Range(RangeError),
    Inventory(InventoryError),
    MissingRecord { record: RecordId },
    NothingToConsume { record: RecordId },
    MissingBaseRecord { record: RecordId },
}

impl fmt::Display for TrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrapError::Range(_) => write!(f, "container lookup out of range:"),
            TrapError::Inventory(_) => write!(f, "inventory update failed:"),
            TrapError::MissingRecord { record } => {
                write!(f, "record {record} is not a mapped container")
            }
            TrapError::NothingToConsume { record } => {
                write!(f, "container {record} holds no soul to consume")
            }
            TrapError::MissingBaseRecord { record } => {
                write!(f, "reusable container {record} has no linked empty companion")
            }
        }
    }
}

impl Error for TrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrapError::Range(source) => Some(source),
            TrapError::Inventory(source) => Some(source),
            _ => None,
        }
    }
}

impl From<RangeError> for TrapError {
    fn from(error: RangeError) -> Self {
        TrapError::Range(error)
    }
}

impl From<InventoryError> for TrapError {
    fn from(error: InventoryError) -> Self {
        TrapError::Inventory(error)
    }
}
