//! Caster inventory access.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use soul_trap_proto::{RecordId, SoulSize};

/// Per-instance data attached to an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtraData {
    #[serde(default)]
    pub owner: Option<String>,
    /// Soul stored on the instance rather than on the record.
    #[serde(default)]
    pub soul: SoulSize,
}

impl ExtraData {
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            soul: SoulSize::None,
        }
    }
}

/// Count of one item plus the extra-data instances attached to some of them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub count: u32,
    #[serde(default)]
    pub extra: Vec<ExtraData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    NotEnoughItems { item: RecordId, requested: u32, available: u32 },
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::NotEnoughItems {
                item,
                requested,
                available,
            } => write!(
                f,
                "cannot remove {requested} of item {item}: only {available} held"
            ),
        }
    }
}

impl std::error::Error for InventoryError {}

/// Item container of one actor, as exposed by the host.
pub trait Inventory {
    fn entries(&self) -> BTreeMap<RecordId, InventoryEntry>;

    fn add_item(&mut self, item: RecordId, count: u32, extra: Option<ExtraData>);

    /// Removes `count` items. When `extra` is given, the matching instance
    /// data is removed along with them.
    fn remove_item(
        &mut self,
        item: RecordId,
        count: u32,
        extra: Option<&ExtraData>,
    ) -> Result<(), InventoryError>;

    fn count_of(&self, item: RecordId) -> u32 {
        self.entries().get(&item).map_or(0, |entry| entry.count)
    }
}

/// In-memory inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInventory {
    items: BTreeMap<RecordId, InventoryEntry>,
}

impl ActorInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (RecordId, u32)>,
    {
        let mut inventory = Self::new();
        for (item, count) in items {
            inventory.add_item(item, count, None);
        }
        inventory
    }

    pub fn entry(&self, item: RecordId) -> Option<&InventoryEntry> {
        self.items.get(&item)
    }

    pub fn total_items(&self) -> u32 {
        self.items.values().map(|entry| entry.count).sum()
    }
}

impl Inventory for ActorInventory {
    fn entries(&self) -> BTreeMap<RecordId, InventoryEntry> {
        self.items.clone()
    }

    fn add_item(&mut self, item: RecordId, count: u32, extra: Option<ExtraData>) {
        if count == 0 {
            return;
        }
        let entry = self.items.entry(item).or_default();
        entry.count += count;
        if let Some(extra) = extra {
            entry.extra.push(extra);
        }
    }

    fn remove_item(
        &mut self,
        item: RecordId,
        count: u32,
        extra: Option<&ExtraData>,
    ) -> Result<(), InventoryError> {
        let available = self.count_of(item);
        if count > available {
            return Err(InventoryError::NotEnoughItems {
                item,
                requested: count,
                available,
            });
        }

        if let Some(entry) = self.items.get_mut(&item) {
            entry.count -= count;
            if let Some(extra) = extra {
                if let Some(position) = entry.extra.iter().position(|held| held == extra) {
                    entry.extra.remove(position);
                }
            }
            entry.extra.truncate(entry.count as usize);
            if entry.count == 0 {
                self.items.remove(&item);
            }
        }
        Ok(())
    }

    fn count_of(&self, item: RecordId) -> u32 {
        self.items.get(&item).map_or(0, |entry| entry.count)
    }
}
