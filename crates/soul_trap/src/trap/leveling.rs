use rand_core::{OsRng, RngCore};
use soul_trap_proto::SoulSize;

use crate::config::{LevelingType, PolicySnapshot};

/// Source of uniform numbers in `[0, 1)` for soul loss checks.
pub trait SoulLossRoll {
    fn roll(&mut self) -> f64;
}

/// Rolls from the operating system's entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSoulLossRoll;

impl SoulLossRoll for OsSoulLossRoll {
    fn roll(&mut self) -> f64 {
        // 53 random bits fill the mantissa of an f64 in [0, 1).
        (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSoulLossRoll(pub f64);

impl SoulLossRoll for FixedSoulLossRoll {
    fn roll(&mut self) -> f64 {
        self.0
    }
}

/// Soul the caster ends up trapping once leveling has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelingOutcome {
    Proceed { soul: SoulSize, degraded: bool },
    Lost,
}

pub fn apply_leveling(
    policy: &PolicySnapshot,
    soul: SoulSize,
    roll: &mut dyn SoulLossRoll,
) -> LevelingOutcome {
    match policy.leveling {
        LevelingType::None => LevelingOutcome::Proceed {
            soul,
            degraded: false,
        },
        LevelingType::Degradation => degrade(policy, soul),
        LevelingType::Loss => check_loss(policy, soul, roll),
    }
}

fn degrade(policy: &PolicySnapshot, soul: SoulSize) -> LevelingOutcome {
    let max = policy.max_trappable_soul_size();
    tracing::trace!(caster_level = policy.caster_level, max = %max, "max trappable soul size");

    if max == SoulSize::None {
        tracing::debug!("caster level is too low for any soul trap");
        return LevelingOutcome::Lost;
    }
    if soul == SoulSize::Black && max < SoulSize::Black {
        tracing::debug!("caster level is too low to trap black souls");
        return LevelingOutcome::Lost;
    }
    if soul > max {
        tracing::debug!(from = %soul, to = %max, "soul degraded");
        return LevelingOutcome::Proceed {
            soul: max,
            degraded: true,
        };
    }
    LevelingOutcome::Proceed {
        soul,
        degraded: false,
    }
}

fn check_loss(
    policy: &PolicySnapshot,
    soul: SoulSize,
    roll: &mut dyn SoulLossRoll,
) -> LevelingOutcome {
    let threshold = policy.thresholds.for_soul(soul);
    if policy.caster_level < threshold {
        let scaling = f64::from(policy.soul_loss_chance_scaling) / 100.0;
        let chance = if policy.allow_soul_loss_progression {
            (policy.caster_level as f64 * scaling) / threshold as f64
        } else {
            scaling
        };
        let x = roll.roll();
        tracing::trace!(chance, x, threshold, "soul loss roll");
        if chance < x {
            tracing::debug!(soul = %soul, "soul lost");
            return LevelingOutcome::Lost;
        }
    }
    LevelingOutcome::Proceed {
        soul,
        degraded: false,
    }
}
