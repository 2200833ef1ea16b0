use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use soul_trap_proto::{RawSoulSize, SoulSize};

use super::error::TrapError;
use super::leveling::{apply_leveling, LevelingOutcome, OsSoulLossRoll, SoulLossRoll};
use super::notify::{FailureKind, NotificationGate, NotificationSink};
use super::search::{
    split_soul, trap_black_soul, trap_full_soul, trap_shrunk_soul, trap_split_soul,
};
use super::session::{InventoryStatus, TrapSession, VictimOutcome, VictimRecord};
use super::victim::Victim;
use crate::config::{PolicySnapshot, ShrinkingTechnique, TrapSettings};
use crate::container::{log_error_chain, ContainerMap};
use crate::inventory::Inventory;

/// The actor casting soul trap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caster<I> {
    pub name: String,
    pub is_player: bool,
    pub is_dead: bool,
    /// Skill level used by soul trap leveling.
    pub soul_trap_level: i64,
    pub inventory: I,
}

impl<I: Inventory> Caster<I> {
    pub fn player(name: impl Into<String>, soul_trap_level: i64, inventory: I) -> Self {
        Self {
            name: name.into(),
            is_player: true,
            is_dead: false,
            soul_trap_level,
            inventory,
        }
    }

    pub fn npc(name: impl Into<String>, inventory: I) -> Self {
        Self {
            name: name.into(),
            is_player: false,
            is_dead: false,
            soul_trap_level: 0,
            inventory,
        }
    }
}

/// The actor whose soul is being trapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoulSource {
    pub name: String,
    pub is_dead: bool,
    pub soul: SoulSize,
    /// Set once any of its soul has been placed.
    #[serde(default)]
    pub soul_trapped: bool,
}

impl SoulSource {
    pub fn dead(name: impl Into<String>, soul: SoulSize) -> Self {
        Self {
            name: name.into(),
            is_dead: true,
            soul,
            soul_trapped: false,
        }
    }

    /// A dead actor described by its in-game soul level. NPC souls are black.
    pub fn from_raw(name: impl Into<String>, raw: RawSoulSize, is_npc: bool) -> Self {
        Self::dead(name, raw.to_soul_size(is_npc))
    }
}

/// Why a call never started placing souls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    CasterDead,
    VictimAlive,
    NoSoul,
    AlreadyTrapped,
    /// An internal error aborted the call. It has been logged.
    Internal,
}

/// Everything one trapping call did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrapReport {
    pub success: bool,
    pub rejected: Option<Rejection>,
    /// Soul the caster tried to trap after leveling.
    pub soul: Option<SoulSize>,
    pub degraded: bool,
    pub victims: Vec<VictimRecord>,
    pub inventory_status: Option<InventoryStatus>,
    /// Failure notified when no soul was placed.
    pub failure: Option<FailureKind>,
}

impl TrapReport {
    fn rejected(reason: Rejection) -> Self {
        Self {
            rejected: Some(reason),
            ..Self::default()
        }
    }

    /// Number of souls placed, displaced ones and fragments included.
    pub fn placed_count(&self) -> usize {
        self.victims
            .iter()
            .filter(|record| matches!(record.outcome, VictimOutcome::Trapped { .. }))
            .count()
    }
}

struct TrapperState {
    roll: Box<dyn SoulLossRoll + Send>,
}

/// Process-wide soul trapping context: the container map, the current
/// settings and the lock serializing calls.
pub struct SoulTrapper {
    map: ContainerMap,
    settings: RwLock<TrapSettings>,
    state: Mutex<TrapperState>,
}

impl SoulTrapper {
    pub fn new(map: ContainerMap, settings: TrapSettings) -> Self {
        Self::with_soul_loss_roll(map, settings, Box::new(OsSoulLossRoll))
    }

    pub fn with_soul_loss_roll(
        map: ContainerMap,
        settings: TrapSettings,
        roll: Box<dyn SoulLossRoll + Send>,
    ) -> Self {
        Self {
            map,
            settings: RwLock::new(settings),
            state: Mutex::new(TrapperState { roll }),
        }
    }

    pub fn map(&self) -> &ContainerMap {
        &self.map
    }

    pub fn settings(&self) -> TrapSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the settings. Calls already running keep their snapshot.
    pub fn update_settings(&self, settings: TrapSettings) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
        tracing::info!("soul trap settings updated");
    }

    pub fn trap_soul<I: Inventory>(
        &self,
        caster: &mut Caster<I>,
        victim: &mut SoulSource,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        self.trap_soul_with_report(caster, victim, sink).success
    }

    pub fn trap_soul_with_report<I: Inventory>(
        &self,
        caster: &mut Caster<I>,
        victim: &mut SoulSource,
        sink: &mut dyn NotificationSink,
    ) -> TrapReport {
        if caster.is_dead {
            tracing::debug!(caster = %caster.name, "caster is dead");
            return TrapReport::rejected(Rejection::CasterDead);
        }
        if !victim.is_dead {
            tracing::debug!(victim = %victim.name, "victim is still alive");
            return TrapReport::rejected(Rejection::VictimAlive);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        if victim.soul == SoulSize::None {
            tracing::debug!(victim = %victim.name, "victim has no soul");
            return TrapReport::rejected(Rejection::NoSoul);
        }
        if victim.soul_trapped {
            tracing::debug!(victim = %victim.name, "victim soul was already trapped");
            return TrapReport::rejected(Rejection::AlreadyTrapped);
        }

        let policy = {
            let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
            PolicySnapshot::capture(&settings, caster.soul_trap_level)
        };

        tracing::debug!(
            caster = %caster.name,
            victim = %victim.name,
            soul = %victim.soul,
            "trapping soul"
        );
        let report = match self.run(&policy, caster, victim, sink, state.roll.as_mut()) {
            Ok(report) => report,
            Err(error) => {
                log_error_chain(&error);
                TrapReport::rejected(Rejection::Internal)
            }
        };

        if report.success {
            victim.soul_trapped = true;
        }
        if policy.allow_profiling {
            tracing::info!(
                elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                success = report.success,
                "soul trap call finished"
            );
        }
        report
    }

    fn run<I: Inventory>(
        &self,
        policy: &PolicySnapshot,
        caster: &mut Caster<I>,
        victim: &SoulSource,
        sink: &mut dyn NotificationSink,
        roll: &mut dyn SoulLossRoll,
    ) -> Result<TrapReport, TrapError> {
        let gate = NotificationGate::new(
            sink,
            &caster.name,
            caster.is_player,
            policy.allow_notifications,
        );
        let mut session = TrapSession::new(&self.map, *policy, &mut caster.inventory, gate);

        let (soul, degraded) = match apply_leveling(policy, victim.soul, roll) {
            LevelingOutcome::Proceed { soul, degraded } => (soul, degraded),
            LevelingOutcome::Lost => {
                session.notify_failure(FailureKind::SoulLost);
                let primary = Victim::primary(victim.name.clone(), victim.soul);
                session.push_record(
                    primary,
                    VictimOutcome::Lost {
                        reason: FailureKind::SoulLost,
                    },
                );
                let inventory_status = session.inventory_status();
                return Ok(TrapReport {
                    success: false,
                    rejected: None,
                    soul: None,
                    degraded: false,
                    victims: session.into_records(),
                    inventory_status: Some(inventory_status),
                    failure: Some(FailureKind::SoulLost),
                });
            }
        };
        session.degraded = degraded;
        session
            .victims
            .push(Victim::primary(victim.name.clone(), soul));

        while let Some(next) = session.victims.pop() {
            session.refresh_inventory();
            let status = session.inventory_status();
            if status != InventoryStatus::HasSoulGemsToFill {
                tracing::debug!(status = ?status, "no container left to fill");
                let reason = if status == InventoryStatus::NoSoulGemsOwned {
                    FailureKind::NoSoulGemsOwned
                } else {
                    session.unplaced_reason()
                };
                session.push_record(next, VictimOutcome::Abandoned { reason });
                for rest in session.victims.drain_ordered() {
                    session.push_record(rest, VictimOutcome::Abandoned { reason });
                }
                break;
            }
            place_victim(&mut session, next)?;
        }

        session.refresh_inventory();
        let inventory_status = session.inventory_status();
        let success = session.success_count() > 0;
        let failure = if success {
            None
        } else {
            let kind = match inventory_status {
                InventoryStatus::NoSoulGemsOwned => FailureKind::NoSoulGemsOwned,
                InventoryStatus::AllSoulGemsFilled => FailureKind::AllSoulGemsFilled,
                InventoryStatus::HasSoulGemsToFill => session.unplaced_reason(),
            };
            session.notify_failure(kind);
            Some(kind)
        };

        Ok(TrapReport {
            success,
            rejected: None,
            soul: Some(soul),
            degraded,
            victims: session.into_records(),
            inventory_status: Some(inventory_status),
            failure,
        })
    }
}

fn place_victim(session: &mut TrapSession<'_>, victim: Victim) -> Result<(), TrapError> {
    let soul = victim.soul_size();
    let placement = if soul == SoulSize::Black {
        trap_black_soul(session)?
    } else if victim.is_split() {
        trap_split_soul(session, soul)?
    } else {
        trap_full_soul(session, soul)?
    };
    if let Some(placement) = placement {
        session.record_success(victim, placement);
        return Ok(());
    }

    if victim.is_split() {
        return Ok(split_or_lose(session, victim));
    }
    if soul == SoulSize::Black {
        let reason = session.unplaced_reason();
        session.push_record(victim, VictimOutcome::Lost { reason });
        return Ok(());
    }

    match session.policy.technique {
        ShrinkingTechnique::Shrink => match trap_shrunk_soul(session, soul)? {
            Some(placement) => session.record_success(victim, placement),
            None => {
                let reason = session.unplaced_reason();
                session.push_record(victim, VictimOutcome::Lost { reason });
            }
        },
        ShrinkingTechnique::Split => split_or_lose(session, victim),
        ShrinkingTechnique::None => {
            let reason = session.unplaced_reason();
            session.push_record(victim, VictimOutcome::Lost { reason });
        }
    }
    Ok(())
}

fn split_or_lose(session: &mut TrapSession<'_>, victim: Victim) {
    if split_soul(session, &victim) {
        session.push_record(victim, VictimOutcome::SplitApart);
    } else {
        let reason = session.unplaced_reason();
        session.push_record(victim, VictimOutcome::Lost { reason });
    }
}
