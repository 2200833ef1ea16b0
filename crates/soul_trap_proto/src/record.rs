use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::soul::SoulSize;

/// Runtime identity of a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Load-order independent reference to a record: a form id local to the
/// owning file plus that file's name. File names compare case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordLocator {
    pub form_id: u32,
    pub plugin: String,
}

impl RecordLocator {
    pub fn new(form_id: u32, plugin: impl Into<String>) -> Self {
        Self {
            form_id,
            plugin: plugin.into(),
        }
    }

    fn plugin_key(&self) -> String {
        self.plugin.to_ascii_lowercase()
    }
}

impl PartialEq for RecordLocator {
    fn eq(&self, other: &Self) -> bool {
        self.form_id == other.form_id && self.plugin.eq_ignore_ascii_case(&other.plugin)
    }
}

impl Eq for RecordLocator {}

impl Hash for RecordLocator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.form_id.hash(state);
        self.plugin_key().hash(state);
    }
}

impl fmt::Display for RecordLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}|{}", self.form_id, self.plugin)
    }
}

/// Authoritative description of one container record, as owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: RecordId,
    pub locator: RecordLocator,
    #[serde(default)]
    pub name: String,
    /// Largest soul the record can hold (petty through grand).
    pub capacity: SoulSize,
    /// Soul currently held by every instance of the record.
    #[serde(default)]
    pub contained: SoulSize,
    #[serde(default)]
    pub reusable: bool,
    #[serde(default)]
    pub black_soul_eligible: bool,
    /// Empty companion a reusable record turns into once its soul is used.
    #[serde(default)]
    pub linked_empty: Option<RecordId>,
}

impl ContainerRecord {
    pub fn is_empty(&self) -> bool {
        self.contained == SoulSize::None
    }

    pub fn is_full(&self) -> bool {
        self.contained == self.capacity
    }
}

impl fmt::Display for ContainerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "[{}]", self.id)
        } else {
            write!(f, "[{}] \"{}\"", self.id, self.name)
        }
    }
}

/// Lookup of authoritative records by locator or by runtime identity.
pub trait RecordResolver {
    fn resolve(&self, locator: &RecordLocator) -> Option<&ContainerRecord>;
    fn record(&self, id: RecordId) -> Option<&ContainerRecord>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateRecordId { id: RecordId },
    DuplicateLocator { locator: RecordLocator },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateRecordId { id } => write!(f, "duplicate record id {id}"),
            CatalogError::DuplicateLocator { locator } => {
                write!(f, "duplicate record locator {locator}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// In-memory record store.
#[derive(Debug, Clone, Default)]
pub struct RecordCatalog {
    records: BTreeMap<RecordId, ContainerRecord>,
    by_locator: HashMap<RecordLocator, RecordId>,
}

impl RecordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ContainerRecord>,
    {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, record: ContainerRecord) -> Result<(), CatalogError> {
        if self.records.contains_key(&record.id) {
            return Err(CatalogError::DuplicateRecordId { id: record.id });
        }
        if self.by_locator.contains_key(&record.locator) {
            return Err(CatalogError::DuplicateLocator {
                locator: record.locator.clone(),
            });
        }
        self.by_locator.insert(record.locator.clone(), record.id);
        self.records.insert(record.id, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContainerRecord> {
        self.records.values()
    }
}

impl RecordResolver for RecordCatalog {
    fn resolve(&self, locator: &RecordLocator) -> Option<&ContainerRecord> {
        self.by_locator
            .get(locator)
            .and_then(|id| self.records.get(id))
    }

    fn record(&self, id: RecordId) -> Option<&ContainerRecord> {
        self.records.get(&id)
    }
}
