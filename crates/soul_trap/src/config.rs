//! Runtime policy for soul trapping and the files it is loaded from.

use std::fmt;

use serde::{Deserialize, Serialize};
use soul_trap_proto::SoulSize;

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{
    load_container_dir, load_settings_file, parse_container_groups, parse_record_catalog,
    parse_settings, ContainerFileReport, DEFAULT_CONTAINER_FILE_PREFIX,
};

pub const DEFAULT_SOUL_LOSS_CHANCE_SCALING: i64 = 80;

/// What happens to a soul too large for every available container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkingTechnique {
    None,
    #[default]
    Shrink,
    Split,
}

impl ShrinkingTechnique {
    pub fn as_str(self) -> &'static str {
        match self {
            ShrinkingTechnique::None => "none",
            ShrinkingTechnique::Shrink => "shrink",
            ShrinkingTechnique::Split => "split",
        }
    }
}

impl fmt::Display for ShrinkingTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the caster's soul trap level limits what can be trapped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelingType {
    #[default]
    None,
    /// Souls above the caster's limit are reduced to it.
    Degradation,
    /// Souls above the caster's limit may be lost on a failed roll.
    Loss,
}

impl LevelingType {
    pub fn as_str(self) -> &'static str {
        match self {
            LevelingType::None => "none",
            LevelingType::Degradation => "degradation",
            LevelingType::Loss => "loss",
        }
    }
}

impl fmt::Display for LevelingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soul trap levels required per soul size and per search feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub petty: i64,
    pub lesser: i64,
    pub common: i64,
    pub greater: i64,
    pub grand: i64,
    pub black: i64,
    pub displacement: i64,
    pub relocation: i64,
    pub shrinking: i64,
    pub splitting: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            petty: 1,
            lesser: 20,
            common: 25,
            greater: 32,
            grand: 40,
            black: 50,
            displacement: 20,
            relocation: 25,
            shrinking: 40,
            splitting: 70,
        }
    }
}

impl Thresholds {
    pub fn for_soul(&self, size: SoulSize) -> i64 {
        match size {
            SoulSize::None => 0,
            SoulSize::Petty => self.petty,
            SoulSize::Lesser => self.lesser,
            SoulSize::Common => self.common,
            SoulSize::Greater => self.greater,
            SoulSize::Grand => self.grand,
            SoulSize::Black => self.black,
        }
    }

    /// Largest soul a caster at `level` may trap.
    pub fn max_trappable(&self, level: i64) -> SoulSize {
        SoulSize::ALL
            .into_iter()
            .rev()
            .find(|size| *size != SoulSize::None && level >= self.for_soul(*size))
            .unwrap_or(SoulSize::None)
    }

    /// Lowers any threshold that exceeds the one above it.
    fn normalized(mut self) -> Self {
        fn clamp_pair(lower_key: &str, lower: &mut i64, upper_key: &str, upper: i64) {
            if *lower > upper {
                tracing::warn!(
                    threshold = lower_key,
                    current = *lower,
                    replacement = upper,
                    "{lower_key} threshold is greater than {upper_key}; lowering it"
                );
                *lower = upper;
            }
        }

        clamp_pair("grand", &mut self.grand, "black", self.black);
        clamp_pair("greater", &mut self.greater, "grand", self.grand);
        clamp_pair("common", &mut self.common, "greater", self.greater);
        clamp_pair("lesser", &mut self.lesser, "common", self.common);
        clamp_pair("petty", &mut self.petty, "lesser", self.lesser);
        clamp_pair(
            "displacement",
            &mut self.displacement,
            "relocation",
            self.relocation,
        );
        clamp_pair("shrinking", &mut self.shrinking, "splitting", self.splitting);
        self
    }
}

/// Host-adjustable settings. Every key is optional in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapSettings {
    pub allow_partially_filling_soul_gems: bool,
    pub allow_soul_displacement: bool,
    pub allow_soul_relocation: bool,
    pub allow_extra_soul_relocation: bool,
    pub preserve_ownership: bool,
    pub allow_notifications: bool,
    pub allow_profiling: bool,
    pub soul_shrinking_technique: ShrinkingTechnique,
    pub soul_trap_leveling: LevelingType,
    pub allow_soul_loss_progression: bool,
    pub soul_loss_chance_scaling: i64,
    pub thresholds: Thresholds,
}

impl Default for TrapSettings {
    fn default() -> Self {
        Self {
            allow_partially_filling_soul_gems: true,
            allow_soul_displacement: true,
            allow_soul_relocation: true,
            allow_extra_soul_relocation: true,
            preserve_ownership: true,
            allow_notifications: true,
            allow_profiling: false,
            soul_shrinking_technique: ShrinkingTechnique::Shrink,
            soul_trap_leveling: LevelingType::None,
            allow_soul_loss_progression: false,
            soul_loss_chance_scaling: DEFAULT_SOUL_LOSS_CHANCE_SCALING,
            thresholds: Thresholds::default(),
        }
    }
}

/// Settings frozen for one trapping call, with leveling gates applied for
/// the calling caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySnapshot {
    pub allow_partial_fill: bool,
    pub allow_displacement: bool,
    pub allow_relocation: bool,
    pub allow_extra_soul_relocation: bool,
    pub preserve_ownership: bool,
    pub allow_notifications: bool,
    pub allow_profiling: bool,
    pub technique: ShrinkingTechnique,
    pub leveling: LevelingType,
    pub allow_soul_loss_progression: bool,
    /// Percentage in `1..=100`.
    pub soul_loss_chance_scaling: u8,
    pub thresholds: Thresholds,
    pub caster_level: i64,
}

impl PolicySnapshot {
    pub fn capture(settings: &TrapSettings, caster_level: i64) -> Self {
        let leveling = settings.soul_trap_leveling;
        let mut snapshot = Self {
            allow_partial_fill: settings.allow_partially_filling_soul_gems,
            allow_displacement: settings.allow_soul_displacement,
            allow_relocation: settings.allow_soul_relocation,
            allow_extra_soul_relocation: settings.allow_extra_soul_relocation,
            preserve_ownership: settings.preserve_ownership,
            allow_notifications: settings.allow_notifications,
            allow_profiling: settings.allow_profiling,
            technique: settings.soul_shrinking_technique,
            leveling,
            allow_soul_loss_progression: settings.allow_soul_loss_progression,
            soul_loss_chance_scaling: clamp_scaling(settings.soul_loss_chance_scaling, leveling),
            thresholds: settings.thresholds,
            caster_level,
        };

        if leveling == LevelingType::None {
            return snapshot;
        }

        let thresholds = settings.thresholds.normalized();
        snapshot.thresholds = thresholds;

        if caster_level < thresholds.displacement {
            snapshot.allow_displacement = false;
        }
        if caster_level < thresholds.relocation {
            snapshot.allow_relocation = false;
        }
        snapshot.technique = match snapshot.technique {
            ShrinkingTechnique::Shrink if caster_level < thresholds.shrinking => {
                ShrinkingTechnique::None
            }
            ShrinkingTechnique::Split if caster_level < thresholds.shrinking => {
                ShrinkingTechnique::None
            }
            ShrinkingTechnique::Split if caster_level < thresholds.splitting => {
                ShrinkingTechnique::Shrink
            }
            technique => technique,
        };

        tracing::debug!(
            caster_level,
            leveling = %leveling,
            displacement = snapshot.allow_displacement,
            relocation = snapshot.allow_relocation,
            technique = %snapshot.technique,
            "leveling gates applied to policy snapshot"
        );
        snapshot
    }

    /// Largest soul the caster may trap. Unlimited when leveling is off.
    pub fn max_trappable_soul_size(&self) -> SoulSize {
        if self.leveling == LevelingType::None {
            return SoulSize::Black;
        }
        self.thresholds.max_trappable(self.caster_level)
    }
}

fn clamp_scaling(value: i64, leveling: LevelingType) -> u8 {
    let clamped = value.clamp(1, 100);
    if clamped != value && leveling == LevelingType::Loss {
        tracing::warn!(
            current = value,
            replacement = clamped,
            "soul_loss_chance_scaling is out of range"
        );
    }
    // `clamped` is within 1..=100.
    u8::try_from(clamped).unwrap_or(100)
}

#[cfg(test)]
mod tests;
