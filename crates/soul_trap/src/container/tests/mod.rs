//! Tests for the container map.

use super::*;
use crate::fixtures::*;
use soul_trap_proto::{ContainerCapacity, RecordCatalog, RecordId, SoulSize};

fn catalog_with(
    extra: impl IntoIterator<Item = soul_trap_proto::ContainerRecord>,
) -> RecordCatalog {
    let mut catalog = standard_catalog();
    for record in extra {
        catalog.insert(record).expect("insert extra record");
    }
    catalog
}
