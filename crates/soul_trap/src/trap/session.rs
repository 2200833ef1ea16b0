use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use soul_trap_proto::{ContainerCapacity, RecordId, SoulSize};

use super::error::TrapError;
use super::notify::{FailureKind, NotificationGate, SuccessKind};
use super::victim::{Victim, VictimQueue};
use crate::config::{PolicySnapshot, ShrinkingTechnique};
use crate::container::{ConcreteContainerGroup, ContainerMap, RangeError};
use crate::inventory::{ExtraData, Inventory, InventoryEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    HasSoulGemsToFill,
    NoSoulGemsOwned,
    AllSoulGemsFilled,
}

/// Mapped containers held by the caster at one point in the call.
#[derive(Debug, Clone, Default)]
pub(crate) struct InventorySnapshot {
    entries: BTreeMap<RecordId, InventoryEntry>,
    full_count: usize,
}

impl InventorySnapshot {
    pub(crate) fn capture(map: &ContainerMap, inventory: &dyn Inventory) -> Self {
        let entries: BTreeMap<RecordId, InventoryEntry> = inventory
            .entries()
            .into_iter()
            .filter(|(id, entry)| entry.count > 0 && map.contains(*id))
            .collect();
        let full_count = entries
            .keys()
            .filter(|id| map.record(**id).is_some_and(|record| record.is_full()))
            .count();
        Self {
            entries,
            full_count,
        }
    }

    pub(crate) fn status(&self) -> InventoryStatus {
        if self.entries.is_empty() {
            InventoryStatus::NoSoulGemsOwned
        } else if self.entries.len() == self.full_count {
            InventoryStatus::AllSoulGemsFilled
        } else {
            InventoryStatus::HasSoulGemsToFill
        }
    }

    pub(crate) fn owns(&self, id: RecordId) -> bool {
        self.entries.get(&id).is_some_and(|entry| entry.count > 0)
    }

    pub(crate) fn first_extra(&self, id: RecordId) -> Option<&ExtraData> {
        self.entries.get(&id).and_then(|entry| entry.extra.first())
    }
}

/// Where a soul went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub kind: SuccessKind,
    pub container: RecordId,
    pub displaced: Option<SoulSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VictimOutcome {
    Trapped {
        kind: SuccessKind,
        container: RecordId,
        displaced: Option<SoulSize>,
    },
    SplitApart,
    Lost { reason: FailureKind },
    Abandoned { reason: FailureKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictimRecord {
    pub victim: Victim,
    pub outcome: VictimOutcome,
}

/// State for one trapping call.
pub(crate) struct TrapSession<'a> {
    pub(crate) map: &'a ContainerMap,
    pub(crate) policy: PolicySnapshot,
    pub(crate) victims: VictimQueue,
    pub(crate) degraded: bool,
    inventory: &'a mut dyn Inventory,
    snapshot: InventorySnapshot,
    dirty: bool,
    gate: NotificationGate<'a>,
    records: Vec<VictimRecord>,
    successes: usize,
}

impl<'a> TrapSession<'a> {
    pub(crate) fn new(
        map: &'a ContainerMap,
        policy: PolicySnapshot,
        inventory: &'a mut dyn Inventory,
        gate: NotificationGate<'a>,
    ) -> Self {
        let snapshot = InventorySnapshot::capture(map, &*inventory);
        Self {
            map,
            policy,
            victims: VictimQueue::new(),
            degraded: false,
            inventory,
            snapshot,
            dirty: false,
            gate,
            records: Vec::new(),
            successes: 0,
        }
    }

    pub(crate) fn refresh_inventory(&mut self) {
        if self.dirty {
            self.snapshot = InventorySnapshot::capture(self.map, &*self.inventory);
            self.dirty = false;
        }
    }

    pub(crate) fn inventory_status(&self) -> InventoryStatus {
        self.snapshot.status()
    }

    pub(crate) fn success_count(&self) -> usize {
        self.successes
    }

    /// Failure reason for a soul that found no container although the caster
    /// owns some.
    pub(crate) fn unplaced_reason(&self) -> FailureKind {
        if self.policy.technique == ShrinkingTechnique::None {
            FailureKind::NoSoulGemLargeEnough
        } else {
            FailureKind::NoSuitableSoulGem
        }
    }

    /// First container of `capacity` holding `fill` that the caster owns,
    /// with the group it belongs to.
    pub(crate) fn first_owned(
        &self,
        capacity: ContainerCapacity,
        fill: SoulSize,
    ) -> Result<Option<(&'a ConcreteContainerGroup, RecordId)>, TrapError> {
        let map = self.map;
        Ok(map
            .slots(capacity, fill)?
            .find(|(_, id)| self.snapshot.owns(*id)))
    }

    /// Fills the first owned container of `capacity` holding `fill` so it
    /// holds `target` instead. Returns the container now in the inventory.
    pub(crate) fn fill_first_owned(
        &mut self,
        capacity: ContainerCapacity,
        fill: SoulSize,
        target: SoulSize,
    ) -> Result<Option<RecordId>, TrapError> {
        let Some((group, source)) = self.first_owned(capacity, fill)? else {
            return Ok(None);
        };
        let destination = group.record_at(target).ok_or(RangeError {
            capacity,
            fill: target,
        })?;
        self.replace_container(destination, source)?;
        Ok(Some(destination))
    }

    /// Swaps one `source` container in the inventory for `destination`.
    pub(crate) fn replace_container(
        &mut self,
        destination: RecordId,
        source: RecordId,
    ) -> Result<(), TrapError> {
        let policy = self.policy;
        let original = if policy.allow_extra_soul_relocation || policy.preserve_ownership {
            self.snapshot.first_extra(source).cloned()
        } else {
            None
        };

        if policy.allow_extra_soul_relocation {
            if let Some(extra) = original.as_ref().filter(|extra| extra.soul != SoulSize::None) {
                let record = self
                    .map
                    .record(source)
                    .ok_or(TrapError::MissingRecord { record: source })?;
                // Grand souls in black-eligible containers are taken as black.
                let soul = if extra.soul == SoulSize::Grand && record.black_soul_eligible {
                    SoulSize::Black
                } else {
                    extra.soul
                };
                tracing::trace!(soul = %soul, "relocating extra soul");
                self.victims.push(Victim::displaced(soul));
            }
        }

        let fresh = if policy.preserve_ownership {
            original
                .as_ref()
                .and_then(|extra| extra.owner.clone())
                .map(ExtraData::owned_by)
        } else {
            None
        };

        tracing::trace!(from = %source, to = %destination, "replacing container");
        self.inventory.remove_item(source, 1, original.as_ref())?;
        self.inventory.add_item(destination, 1, fresh);
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn record_success(&mut self, victim: Victim, placement: Placement) {
        tracing::debug!(
            victim = %victim,
            kind = ?placement.kind,
            container = %placement.container,
            displaced = ?placement.displaced,
            "soul placed"
        );
        self.successes += 1;
        self.gate.success(placement.kind, self.degraded, &victim);
        self.push_record(
            victim,
            VictimOutcome::Trapped {
                kind: placement.kind,
                container: placement.container,
                displaced: placement.displaced,
            },
        );
    }

    pub(crate) fn push_record(&mut self, victim: Victim, outcome: VictimOutcome) {
        if !matches!(outcome, VictimOutcome::Trapped { .. }) {
            tracing::debug!(victim = %victim, outcome = ?outcome, "soul not placed");
        }
        self.records.push(VictimRecord { victim, outcome });
    }

    pub(crate) fn notify_failure(&mut self, kind: FailureKind) {
        self.gate.failure(kind);
    }

    pub(crate) fn into_records(self) -> Vec<VictimRecord> {
        self.records
    }
}
