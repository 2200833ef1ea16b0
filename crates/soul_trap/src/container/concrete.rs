use std::collections::{BTreeMap, HashSet};

use soul_trap_proto::{ContainerCapacity, RecordId, RecordResolver, SoulSize};

use super::error::{FormIntegrityError, MergeError};
use super::group::{ContainerGroupSpec, LoadPriority};

/// A container group whose members have been resolved to records and
/// checked against the group's structural invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteContainerGroup {
    id: String,
    reusable: bool,
    capacity: ContainerCapacity,
    priority: LoadPriority,
    slots: BTreeMap<SoulSize, RecordId>,
}

impl ConcreteContainerGroup {
    pub fn resolve<R: RecordResolver + ?Sized>(
        spec: &ContainerGroupSpec,
        resolver: &R,
    ) -> Result<Self, FormIntegrityError> {
        let capacity = spec.capacity();
        if capacity == ContainerCapacity::Black && spec.members().len() > 2 {
            return Err(FormIntegrityError::ExtraMembers {
                count: spec.members().len(),
            });
        }

        let expected_capacity = capacity.record_capacity();
        let mut seen = HashSet::with_capacity(spec.members().len());
        let mut slots = BTreeMap::new();

        for (index, locator) in spec.members().iter().enumerate() {
            let record = resolver
                .resolve(locator)
                .ok_or_else(|| FormIntegrityError::MissingRecord {
                    locator: locator.clone(),
                })?;

            if !seen.insert(record.id) {
                return Err(FormIntegrityError::DuplicateRecord { record: record.id });
            }

            if record.capacity != expected_capacity {
                return Err(FormIntegrityError::CapacityMismatch {
                    record: record.id,
                    expected: expected_capacity,
                    found: record.capacity,
                });
            }

            let fill = capacity
                .member_fill_level(index)
                .ok_or(FormIntegrityError::ExtraMembers {
                    count: spec.members().len(),
                })?;
            // Black souls are stored in-game as grand souls in an eligible record.
            let stored = if fill == SoulSize::Black {
                SoulSize::Grand
            } else {
                fill
            };
            if record.contained != stored {
                return Err(FormIntegrityError::FillLevelMismatch {
                    record: record.id,
                    index,
                    expected: stored,
                    found: record.contained,
                });
            }

            if record.reusable != spec.is_reusable() {
                tracing::warn!(
                    group = spec.id(),
                    record = %record,
                    record_reusable = record.reusable,
                    group_reusable = spec.is_reusable(),
                    "record reusability does not match its container group"
                );
            }

            if record.reusable && !record.is_empty() {
                let companion_id = record
                    .linked_empty
                    .ok_or(FormIntegrityError::MissingLinkedCompanion { record: record.id })?;
                let companion = resolver.record(companion_id).ok_or(
                    FormIntegrityError::UnknownLinkedCompanion {
                        record: record.id,
                        companion: companion_id,
                    },
                )?;
                if !companion.is_empty() {
                    return Err(FormIntegrityError::LinkedCompanionNotEmpty {
                        record: record.id,
                        companion: companion_id,
                    });
                }
            }

            slots.insert(fill, record.id);
        }

        Ok(Self {
            id: spec.id().to_string(),
            reusable: spec.is_reusable(),
            capacity,
            priority: spec.priority(),
            slots,
        })
    }

    /// Folds a black group sharing this group's empty record into a dual group.
    pub fn merge_black(&mut self, black: &ConcreteContainerGroup) -> Result<(), MergeError> {
        let empty = self.record_at(SoulSize::None);
        if empty.is_none() || empty != black.record_at(SoulSize::None) {
            return Err(MergeError::EmptyRecordMismatch {
                group: self.id.clone(),
                black_group: black.id.clone(),
            });
        }

        let black_filled = black
            .record_at(SoulSize::Black)
            .ok_or(MergeError::EmptyRecordMismatch {
                group: self.id.clone(),
                black_group: black.id.clone(),
            })?;
        if self.record_at(SoulSize::Grand) == Some(black_filled) {
            return Err(MergeError::AmbiguousFilledRecord {
                group: self.id.clone(),
                black_group: black.id.clone(),
                record: black_filled,
            });
        }

        if self.slots.contains_key(&SoulSize::Black) {
            return Err(MergeError::AlreadyHoldsBlack {
                group: self.id.clone(),
            });
        }

        self.slots.insert(SoulSize::Black, black_filled);
        self.capacity = ContainerCapacity::Dual;
        Ok(())
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

    pub fn priority(&self) -> LoadPriority {
        self.priority
    }

    pub fn record_at(&self, fill: SoulSize) -> Option<RecordId> {
        self.slots.get(&fill).copied()
    }

    /// Fill level stored at `record`, if the record belongs to this group.
    pub fn fill_of(&self, record: RecordId) -> Option<SoulSize> {
        self.slots
            .iter()
            .find(|(_, id)| **id == record)
            .map(|(fill, _)| *fill)
    }

    pub fn records(&self) -> impl Iterator<Item = (SoulSize, RecordId)> + '_ {
        self.slots.iter().map(|(fill, id)| (*fill, *id))
    }
}
