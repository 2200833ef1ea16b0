use std::collections::{BTreeMap, HashMap};

use soul_trap_proto::{
    ContainerCapacity, ContainerRecord, RecordId, RecordLocator, RecordResolver, SoulSize,
};

use super::concrete::ConcreteContainerGroup;
use super::error::{log_error_chain, GroupLoadError, MapBuildError, MergeError, RangeError};
use super::group::{ContainerGroupSpec, LoadPriority};

/// Outcome of a successful build: which groups made it into the map and
/// which were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub loaded: Vec<String>,
    pub failed: Vec<GroupLoadError>,
    /// Grand groups loaded as plain grand groups because their dual merge
    /// failed.
    pub unmerged: Vec<MergeError>,
}

/// Registry of every usable container variant, by capacity tier and fill
/// level. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ContainerMap {
    tiers: BTreeMap<ContainerCapacity, Vec<ConcreteContainerGroup>>,
    records: BTreeMap<RecordId, ContainerRecord>,
    base_records: BTreeMap<RecordId, RecordId>,
}

struct DeferredDual<'a> {
    spec: &'a ContainerGroupSpec,
    black_index: usize,
}

impl ContainerMap {
    pub fn build<R: RecordResolver + ?Sized>(
        specs: &[ContainerGroupSpec],
        resolver: &R,
    ) -> Result<(Self, BuildReport), MapBuildError> {
        let mut map = ContainerMap::default();
        let mut report = BuildReport::default();

        let (black_specs, other_specs): (Vec<&ContainerGroupSpec>, Vec<&ContainerGroupSpec>) =
            specs
                .iter()
                .partition(|spec| spec.capacity() == ContainerCapacity::Black);

        let mut black_by_empty: HashMap<&RecordLocator, usize> = HashMap::new();
        for (index, spec) in black_specs.iter().enumerate() {
            if let Some(first) = black_by_empty.get(spec.empty_member()) {
                tracing::warn!(
                    group = spec.id(),
                    shadowed_by = black_specs[*first].id(),
                    "black container group shares its empty member with an earlier black group"
                );
                continue;
            }
            black_by_empty.insert(spec.empty_member(), index);
        }

        let mut black_resolved: Vec<Option<ConcreteContainerGroup>> = vec![None; black_specs.len()];
        let mut deferred: Vec<DeferredDual<'_>> = Vec::new();

        for priority in LoadPriority::ORDERED {
            for (index, spec) in black_specs.iter().enumerate() {
                if spec.priority() != priority {
                    continue;
                }
                match ConcreteContainerGroup::resolve(*spec, resolver) {
                    Ok(group) => {
                        black_resolved[index] = Some(group.clone());
                        map.push_group(group, &mut report);
                    }
                    Err(error) if error.is_fatal() => {
                        return Err(MapBuildError::FatalIntegrity {
                            group: spec.id().to_string(),
                            source: error,
                        });
                    }
                    Err(error) => map.skip_group(
                        GroupLoadError::Integrity {
                            group: spec.id().to_string(),
                            source: error,
                        },
                        &mut report,
                    ),
                }
            }

            for spec in other_specs.iter().copied() {
                if spec.priority() != priority {
                    continue;
                }
                let counterpart = black_by_empty.get(spec.empty_member()).copied();
                match (spec.capacity(), counterpart) {
                    (ContainerCapacity::Dual, None) => {
                        map.skip_group(
                            GroupLoadError::Merge(MergeError::MissingCounterpart {
                                group: spec.id().to_string(),
                            }),
                            &mut report,
                        );
                        continue;
                    }
                    (ContainerCapacity::Dual | ContainerCapacity::Grand, Some(black_index)) => {
                        deferred.push(DeferredDual { spec, black_index });
                        continue;
                    }
                    _ => {}
                }

                match ConcreteContainerGroup::resolve(spec, resolver) {
                    Ok(group) => map.push_group(group, &mut report),
                    Err(error) if error.is_fatal() => {
                        return Err(MapBuildError::FatalIntegrity {
                            group: spec.id().to_string(),
                            source: error,
                        });
                    }
                    Err(error) => map.skip_group(
                        GroupLoadError::Integrity {
                            group: spec.id().to_string(),
                            source: error,
                        },
                        &mut report,
                    ),
                }
            }
        }

        for DeferredDual { spec, black_index } in deferred {
            let declared_dual = spec.capacity() == ContainerCapacity::Dual;
            let mut group = match ConcreteContainerGroup::resolve(spec, resolver) {
                Ok(group) => group,
                Err(error) if error.is_fatal() => {
                    return Err(MapBuildError::FatalIntegrity {
                        group: spec.id().to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    let group = spec.id().to_string();
                    let error = if declared_dual {
                        GroupLoadError::Merge(MergeError::Integrity {
                            group,
                            source: error,
                        })
                    } else {
                        GroupLoadError::Integrity {
                            group,
                            source: error,
                        }
                    };
                    map.skip_group(error, &mut report);
                    continue;
                }
            };

            let merged = match &black_resolved[black_index] {
                Some(black) => group.merge_black(black),
                None => Err(MergeError::CounterpartUnavailable {
                    group: spec.id().to_string(),
                    black_group: black_specs[black_index].id().to_string(),
                }),
            };
            match merged {
                Ok(()) => map.push_group(group, &mut report),
                // A declared grand group stands on its own without the merge.
                Err(error) if !declared_dual => {
                    tracing::warn!(
                        group = spec.id(),
                        %error,
                        "loading container group as grand without its black counterpart"
                    );
                    report.unmerged.push(error);
                    map.push_group(group, &mut report);
                }
                Err(error) => map.skip_group(GroupLoadError::Merge(error), &mut report),
            }
        }

        if map.group_count() == 0 {
            return Err(MapBuildError::NoGroupsLoaded);
        }

        map.collect_records(resolver);
        Ok((map, report))
    }

    fn push_group(&mut self, group: ConcreteContainerGroup, report: &mut BuildReport) {
        tracing::debug!(
            group = group.id(),
            capacity = %group.capacity(),
            priority = %group.priority(),
            "container group loaded"
        );
        report.loaded.push(group.id().to_string());
        self.tiers.entry(group.capacity()).or_default().push(group);
    }

    fn skip_group(&mut self, error: GroupLoadError, report: &mut BuildReport) {
        log_error_chain(&error);
        tracing::warn!(group = error.group(), "skipping container group");
        report.failed.push(error);
    }

    fn collect_records<R: RecordResolver + ?Sized>(&mut self, resolver: &R) {
        let ids: Vec<RecordId> = self
            .tiers
            .values()
            .flatten()
            .flat_map(|group| group.records().map(|(_, id)| id))
            .collect();

        for id in ids {
            let Some(record) = resolver.record(id) else {
                continue;
            };
            if let Some(companion) = record.linked_empty.filter(|_| record.reusable) {
                if !record.is_empty() {
                    self.base_records.insert(id, companion);
                    if let Some(companion_record) = resolver.record(companion) {
                        self.records
                            .entry(companion)
                            .or_insert_with(|| companion_record.clone());
                    }
                }
            }
            self.records.entry(id).or_insert_with(|| record.clone());
        }
    }

    /// Records for `capacity` holding `fill`, in search order.
    pub fn query(
        &self,
        capacity: ContainerCapacity,
        fill: SoulSize,
    ) -> Result<Vec<RecordId>, RangeError> {
        Ok(self.slots(capacity, fill)?.map(|(_, id)| id).collect())
    }

    /// Same order as [`ContainerMap::query`], paired with the owning group so
    /// the caller can look up sibling fill levels.
    pub fn slots(
        &self,
        capacity: ContainerCapacity,
        fill: SoulSize,
    ) -> Result<impl Iterator<Item = (&ConcreteContainerGroup, RecordId)> + '_, RangeError> {
        if !capacity.accepts_fill_level(fill) {
            return Err(RangeError { capacity, fill });
        }
        Ok(self
            .groups(capacity)
            .iter()
            .filter_map(move |group| group.record_at(fill).map(|id| (group, id))))
    }

    pub fn groups(&self, capacity: ContainerCapacity) -> &[ConcreteContainerGroup] {
        self.tiers.get(&capacity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn record(&self, id: RecordId) -> Option<&ContainerRecord> {
        self.records.get(&id)
    }

    /// Whether `id` is a container variant known to the map.
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Fill level `id` is stored at in the first group listing it.
    pub fn fill_level_of(&self, id: RecordId) -> Option<SoulSize> {
        self.tiers
            .values()
            .flatten()
            .find_map(|group| group.fill_of(id))
    }

    /// Linked empty companion of a reusable, filled record.
    pub fn base_record_of(&self, id: RecordId) -> Option<RecordId> {
        self.base_records.get(&id).copied()
    }

    pub fn log_contents(&self) {
        for (capacity, groups) in &self.tiers {
            tracing::info!(capacity = %capacity, groups = groups.len(), "container tier");
            for group in groups {
                let members = group
                    .records()
                    .map(|(fill, id)| match self.records.get(&id) {
                        Some(record) => format!("{fill}={record}"),
                        None => format!("{fill}=[{id}]"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::info!(
                    group = group.id(),
                    reusable = group.is_reusable(),
                    priority = %group.priority(),
                    "  {members}"
                );
            }
        }
    }
}
