//! Shared record catalog and container groups for unit tests.

use soul_trap_proto::{
    ContainerCapacity, ContainerRecord, RecordCatalog, RecordId, RecordLocator, SoulSize,
};

use crate::container::{ContainerGroupSpec, ContainerMap, LoadPriority};

pub(crate) const PLUGIN: &str = "Skyrim.esm";

pub(crate) const PETTY: u32 = 0x100;
pub(crate) const LESSER: u32 = 0x200;
pub(crate) const COMMON: u32 = 0x300;
pub(crate) const GREATER: u32 = 0x400;
pub(crate) const GRAND: u32 = 0x500;
pub(crate) const BLACK: u32 = 0x600;
pub(crate) const DUAL: u32 = 0x700;
pub(crate) const DUAL_BLACK_FILLED: u32 = 0x706;
pub(crate) const REUSABLE: u32 = 0x800;
pub(crate) const REUSABLE_BLACK: u32 = 0x900;

pub(crate) fn locator(form_id: u32) -> RecordLocator {
    RecordLocator::new(form_id, PLUGIN)
}

pub(crate) fn record(form_id: u32, capacity: SoulSize, contained: SoulSize) -> ContainerRecord {
    ContainerRecord {
        id: RecordId(form_id),
        locator: locator(form_id),
        name: String::new(),
        capacity,
        contained,
        reusable: false,
        black_soul_eligible: false,
        linked_empty: None,
    }
}

/// Records for a white tier: base id holds the empty variant, base + n holds
/// fill level n.
pub(crate) fn white_records(base: u32, capacity: ContainerCapacity) -> Vec<ContainerRecord> {
    (0..capacity.member_count())
        .filter_map(|index| {
            let fill = capacity.member_fill_level(index)?;
            Some(record(base + index as u32, capacity.record_capacity(), fill))
        })
        .collect()
}

pub(crate) fn white_spec(id: &str, base: u32, capacity: ContainerCapacity) -> ContainerGroupSpec {
    let members = (0..capacity.member_count())
        .map(|index| locator(base + index as u32))
        .collect();
    ContainerGroupSpec::new(id, false, capacity, LoadPriority::Auto, members)
        .expect("valid white spec")
}

pub(crate) fn black_spec(id: &str, empty: u32, filled: u32) -> ContainerGroupSpec {
    ContainerGroupSpec::new(
        id,
        false,
        ContainerCapacity::Black,
        LoadPriority::Auto,
        vec![locator(empty), locator(filled)],
    )
    .expect("valid black spec")
}

fn black_filled(form_id: u32) -> ContainerRecord {
    let mut filled = record(form_id, SoulSize::Grand, SoulSize::Grand);
    filled.black_soul_eligible = true;
    filled
}

/// Every tier, plus a dual group (declared grand) sharing its empty record
/// with a second black group, plus reusable petty and black groups.
pub(crate) fn standard_catalog() -> RecordCatalog {
    let mut records = Vec::new();
    records.extend(white_records(PETTY, ContainerCapacity::Petty));
    records.extend(white_records(LESSER, ContainerCapacity::Lesser));
    records.extend(white_records(COMMON, ContainerCapacity::Common));
    records.extend(white_records(GREATER, ContainerCapacity::Greater));
    records.extend(white_records(GRAND, ContainerCapacity::Grand));

    let mut black_empty = record(BLACK, SoulSize::Grand, SoulSize::None);
    black_empty.black_soul_eligible = true;
    records.push(black_empty);
    records.push(black_filled(BLACK + 1));

    for mut dual in white_records(DUAL, ContainerCapacity::Grand) {
        dual.black_soul_eligible = true;
        records.push(dual);
    }
    records.push(black_filled(DUAL_BLACK_FILLED));

    for mut reusable in white_records(REUSABLE, ContainerCapacity::Petty) {
        reusable.reusable = true;
        if !reusable.is_empty() {
            reusable.linked_empty = Some(RecordId(REUSABLE));
        }
        records.push(reusable);
    }

    let mut reusable_black_empty = record(REUSABLE_BLACK, SoulSize::Grand, SoulSize::None);
    reusable_black_empty.black_soul_eligible = true;
    reusable_black_empty.reusable = true;
    records.push(reusable_black_empty);
    let mut reusable_black_filled = black_filled(REUSABLE_BLACK + 1);
    reusable_black_filled.reusable = true;
    reusable_black_filled.linked_empty = Some(RecordId(REUSABLE_BLACK));
    records.push(reusable_black_filled);

    RecordCatalog::from_records(records).expect("standard catalog")
}

pub(crate) fn standard_specs() -> Vec<ContainerGroupSpec> {
    vec![
        white_spec("petty", PETTY, ContainerCapacity::Petty),
        white_spec("lesser", LESSER, ContainerCapacity::Lesser),
        white_spec("common", COMMON, ContainerCapacity::Common),
        white_spec("greater", GREATER, ContainerCapacity::Greater),
        white_spec("grand", GRAND, ContainerCapacity::Grand),
        black_spec("black", BLACK, BLACK + 1),
        white_spec("dual", DUAL, ContainerCapacity::Grand),
        black_spec("dual_black", DUAL, DUAL_BLACK_FILLED),
    ]
}

pub(crate) fn reusable_petty_spec() -> ContainerGroupSpec {
    let members = (0..2).map(|index| locator(REUSABLE + index)).collect();
    ContainerGroupSpec::new(
        "reusable_petty",
        true,
        ContainerCapacity::Petty,
        LoadPriority::Auto,
        members,
    )
    .expect("valid reusable spec")
}

pub(crate) fn reusable_black_spec() -> ContainerGroupSpec {
    ContainerGroupSpec::new(
        "reusable_black",
        true,
        ContainerCapacity::Black,
        LoadPriority::Auto,
        vec![locator(REUSABLE_BLACK), locator(REUSABLE_BLACK + 1)],
    )
    .expect("valid reusable black spec")
}

pub(crate) fn standard_map() -> ContainerMap {
    let catalog = standard_catalog();
    let mut specs = standard_specs();
    specs.push(reusable_petty_spec());
    let (map, report) = ContainerMap::build(&specs, &catalog).expect("standard map");
    assert!(report.failed.is_empty(), "{:?}", report.failed);
    map
}
