//! Tests for settings, policy snapshots and configuration files.

use super::*;
use crate::container::{ContainerMap, GroupSpecError};
use soul_trap_proto::{ContainerCapacity, RecordId, SoulSize};

const SAMPLE_SETTINGS: &str = include_str!("../../../data/soul_trap.toml");
const SAMPLE_CONTAINERS: &str = include_str!("../../../data/soul_trap_vanilla.toml");
const SAMPLE_RECORDS: &str = include_str!("../../../data/records.toml");

fn leveled(leveling: LevelingType, technique: ShrinkingTechnique) -> TrapSettings {
    TrapSettings {
        soul_trap_leveling: leveling,
        soul_shrinking_technique: technique,
        ..TrapSettings::default()
    }
}

mod files;
