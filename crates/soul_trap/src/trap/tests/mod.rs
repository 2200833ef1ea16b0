//! Trapping engine tests against the shared standard container map.

use super::*;
use crate::config::{LevelingType, ShrinkingTechnique, TrapSettings};
use crate::fixtures::*;
use crate::inventory::{ActorInventory, ExtraData, Inventory};
use soul_trap_proto::{RawSoulSize, RecordId, SoulSize};

fn trapper(settings: TrapSettings) -> SoulTrapper {
    SoulTrapper::with_soul_loss_roll(
        standard_map(),
        settings,
        Box::new(FixedSoulLossRoll(0.5)),
    )
}

fn player(items: &[(u32, u32)]) -> Caster<ActorInventory> {
    Caster::player(
        "Player",
        100,
        ActorInventory::with_items(items.iter().map(|(id, count)| (RecordId(*id), *count))),
    )
}

fn count(caster: &Caster<ActorInventory>, form_id: u32) -> u32 {
    caster.inventory.count_of(RecordId(form_id))
}

fn outcomes(report: &TrapReport) -> Vec<VictimOutcome> {
    report.victims.iter().map(|record| record.outcome).collect()
}

mod scenarios;
