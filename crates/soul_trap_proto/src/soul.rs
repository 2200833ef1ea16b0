use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Magnitude of a soul, or the fill level of a container.
///
/// `None` doubles as "empty" when used as a fill level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SoulSize {
    #[default]
    None,
    Petty,
    Lesser,
    Common,
    Greater,
    Grand,
    Black,
}

impl SoulSize {
    pub const ALL: [SoulSize; 7] = [
        SoulSize::None,
        SoulSize::Petty,
        SoulSize::Lesser,
        SoulSize::Common,
        SoulSize::Greater,
        SoulSize::Grand,
        SoulSize::Black,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Sizes in `[self, end)`, ascending.
    pub fn range_to(self, end: SoulSize) -> impl Iterator<Item = SoulSize> {
        Self::ALL
            .into_iter()
            .filter(move |size| *size >= self && *size < end)
    }

    /// The capacity tier whose effective size equals this soul.
    ///
    /// Grand souls map to the plain grand tier. `Dual` is never returned;
    /// white searches reach it through [`ContainerCapacity::LAST_WHITE`].
    pub fn to_capacity(self) -> Option<ContainerCapacity> {
        match self {
            SoulSize::None => None,
            SoulSize::Petty => Some(ContainerCapacity::Petty),
            SoulSize::Lesser => Some(ContainerCapacity::Lesser),
            SoulSize::Common => Some(ContainerCapacity::Common),
            SoulSize::Greater => Some(ContainerCapacity::Greater),
            SoulSize::Grand => Some(ContainerCapacity::Grand),
            SoulSize::Black => Some(ContainerCapacity::Black),
        }
    }

    pub fn raw(self) -> RawSoulSize {
        match self {
            SoulSize::None => RawSoulSize::None,
            SoulSize::Petty => RawSoulSize::Petty,
            SoulSize::Lesser => RawSoulSize::Lesser,
            SoulSize::Common => RawSoulSize::Common,
            SoulSize::Greater => RawSoulSize::Greater,
            SoulSize::Grand | SoulSize::Black => RawSoulSize::Grand,
        }
    }

    /// Halving table used when a soul is split instead of shrunk.
    ///
    /// Raw values add up: grand 3000 = greater 2000 + common 1000, and so on
    /// down to lesser 500 = petty 250 + petty 250. Petty, empty and black
    /// souls never split.
    pub fn split(self) -> Option<(SoulSize, SoulSize)> {
        match self {
            SoulSize::Grand => Some((SoulSize::Greater, SoulSize::Common)),
            SoulSize::Greater => Some((SoulSize::Common, SoulSize::Common)),
            SoulSize::Common => Some((SoulSize::Lesser, SoulSize::Lesser)),
            SoulSize::Lesser => Some((SoulSize::Petty, SoulSize::Petty)),
            SoulSize::None | SoulSize::Petty | SoulSize::Black => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoulSize::None => "none",
            SoulSize::Petty => "petty",
            SoulSize::Lesser => "lesser",
            SoulSize::Common => "common",
            SoulSize::Greater => "greater",
            SoulSize::Grand => "grand",
            SoulSize::Black => "black",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for SoulSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soul magnitude as stored by the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawSoulSize {
    None,
    Petty,
    Lesser,
    Common,
    Greater,
    Grand,
}

impl RawSoulSize {
    pub fn value(self) -> u32 {
        match self {
            RawSoulSize::None => 0,
            RawSoulSize::Petty => 250,
            RawSoulSize::Lesser => 500,
            RawSoulSize::Common => 1000,
            RawSoulSize::Greater => 2000,
            RawSoulSize::Grand => 3000,
        }
    }

    /// NPC souls are always black regardless of their raw magnitude.
    pub fn to_soul_size(self, is_npc: bool) -> SoulSize {
        if is_npc {
            return SoulSize::Black;
        }
        match self {
            RawSoulSize::None => SoulSize::None,
            RawSoulSize::Petty => SoulSize::Petty,
            RawSoulSize::Lesser => SoulSize::Lesser,
            RawSoulSize::Common => SoulSize::Common,
            RawSoulSize::Greater => SoulSize::Greater,
            RawSoulSize::Grand => SoulSize::Grand,
        }
    }
}

/// Capacity tier of a container group.
///
/// `Dual` containers hold either a white grand soul or a black soul. Both
/// `Dual` and `Black` are grand-sized in-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerCapacity {
    Petty,
    Lesser,
    Common,
    Greater,
    Grand,
    Dual,
    Black,
}

impl ContainerCapacity {
    pub const ALL: [ContainerCapacity; 7] = [
        ContainerCapacity::Petty,
        ContainerCapacity::Lesser,
        ContainerCapacity::Common,
        ContainerCapacity::Greater,
        ContainerCapacity::Grand,
        ContainerCapacity::Dual,
        ContainerCapacity::Black,
    ];

    /// Highest tier a white soul may be placed in.
    pub const LAST_WHITE: ContainerCapacity = ContainerCapacity::Dual;

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Tiers in `[self, last]`, ascending.
    pub fn range_through(self, last: ContainerCapacity) -> impl Iterator<Item = ContainerCapacity> {
        Self::ALL
            .into_iter()
            .filter(move |capacity| *capacity >= self && *capacity <= last)
    }

    pub fn effective_soul_size(self) -> SoulSize {
        match self {
            ContainerCapacity::Petty => SoulSize::Petty,
            ContainerCapacity::Lesser => SoulSize::Lesser,
            ContainerCapacity::Common => SoulSize::Common,
            ContainerCapacity::Greater => SoulSize::Greater,
            ContainerCapacity::Grand | ContainerCapacity::Dual => SoulSize::Grand,
            ContainerCapacity::Black => SoulSize::Black,
        }
    }

    /// Largest soul a record of this tier declares in-game. Black containers
    /// are grand containers flagged for black souls.
    pub fn record_capacity(self) -> SoulSize {
        match self {
            ContainerCapacity::Black => SoulSize::Grand,
            other => other.effective_soul_size(),
        }
    }

    /// Number of members a configured group of this tier must list.
    pub fn member_count(self) -> usize {
        match self {
            ContainerCapacity::Black => 2,
            ContainerCapacity::Dual => 6,
            white => usize::from(white.ordinal()) + 2,
        }
    }

    /// Fill level stored at `index` of a configured member list.
    pub fn member_fill_level(self, index: usize) -> Option<SoulSize> {
        match self {
            ContainerCapacity::Black => match index {
                0 => Some(SoulSize::None),
                1 => Some(SoulSize::Black),
                _ => None,
            },
            _ if index < self.member_count() => u8::try_from(index)
                .ok()
                .and_then(SoulSize::from_ordinal),
            _ => None,
        }
    }

    /// Every fill level a resolved group of this tier can hold.
    pub fn fill_levels(self) -> Vec<SoulSize> {
        match self {
            ContainerCapacity::Black => vec![SoulSize::None, SoulSize::Black],
            ContainerCapacity::Dual => SoulSize::ALL.to_vec(),
            white => SoulSize::None
                .range_to(SoulSize::Black)
                .filter(|size| *size <= white.effective_soul_size())
                .collect(),
        }
    }

    pub fn accepts_fill_level(self, fill: SoulSize) -> bool {
        match self {
            ContainerCapacity::Black => matches!(fill, SoulSize::None | SoulSize::Black),
            ContainerCapacity::Dual => true,
            white => fill <= white.effective_soul_size(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerCapacity::Petty => "petty",
            ContainerCapacity::Lesser => "lesser",
            ContainerCapacity::Common => "common",
            ContainerCapacity::Greater => "greater",
            ContainerCapacity::Grand => "grand",
            ContainerCapacity::Dual => "dual",
            ContainerCapacity::Black => "black",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|capacity| capacity.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Legacy integer encoding used by container files: 1 (petty) through
    /// 5 (grand), 6 for black.
    pub fn from_legacy_index(value: i64) -> Option<Self> {
        match value {
            1 => Some(ContainerCapacity::Petty),
            2 => Some(ContainerCapacity::Lesser),
            3 => Some(ContainerCapacity::Common),
            4 => Some(ContainerCapacity::Greater),
            5 => Some(ContainerCapacity::Grand),
            6 => Some(ContainerCapacity::Black),
            _ => None,
        }
    }

    /// Ordinal of the soul size equivalent to this tier.
    fn soul_rank(self) -> u8 {
        if self >= ContainerCapacity::Dual {
            self.ordinal()
        } else {
            self.ordinal() + 1
        }
    }
}

impl fmt::Display for ContainerCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// SoulSize   Capacity
// None=0
// Petty=1    Petty=0
// Lesser=2   Lesser=1
// Common=3   Common=2
// Greater=4  Greater=3
// Grand=5    Grand=4, Dual=5
// Black=6    Black=6
impl PartialEq<ContainerCapacity> for SoulSize {
    fn eq(&self, other: &ContainerCapacity) -> bool {
        self.ordinal() == other.soul_rank()
    }
}

impl PartialOrd<ContainerCapacity> for SoulSize {
    fn partial_cmp(&self, other: &ContainerCapacity) -> Option<Ordering> {
        Some(self.ordinal().cmp(&other.soul_rank()))
    }
}

impl PartialEq<SoulSize> for ContainerCapacity {
    fn eq(&self, other: &SoulSize) -> bool {
        other == self
    }
}

impl PartialOrd<SoulSize> for ContainerCapacity {
    fn partial_cmp(&self, other: &SoulSize) -> Option<Ordering> {
        other.partial_cmp(self).map(Ordering::reverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_capacity_mapping() {
        for capacity in ContainerCapacity::ALL {
            let expected = match capacity {
                ContainerCapacity::Grand | ContainerCapacity::Dual => SoulSize::Grand,
                ContainerCapacity::Black => SoulSize::Black,
                ContainerCapacity::Petty => SoulSize::Petty,
                ContainerCapacity::Lesser => SoulSize::Lesser,
                ContainerCapacity::Common => SoulSize::Common,
                ContainerCapacity::Greater => SoulSize::Greater,
            };
            assert_eq!(capacity.effective_soul_size(), expected, "{capacity}");
        }
    }

    #[test]
    fn cross_type_equality_applies_shift_below_dual() {
        for soul in SoulSize::ALL {
            for capacity in ContainerCapacity::ALL {
                let expected = if capacity >= ContainerCapacity::Dual {
                    soul.ordinal() == capacity.ordinal()
                } else {
                    soul.ordinal() == capacity.ordinal() + 1
                };
                assert_eq!(soul == capacity, expected, "{soul} vs {capacity}");
                assert_eq!(capacity == soul, expected, "{capacity} vs {soul}");
            }
        }
    }

    #[test]
    fn cross_type_ordering() {
        assert!(SoulSize::Common < ContainerCapacity::Greater);
        assert!(SoulSize::Grand >= ContainerCapacity::Grand);
        assert!(SoulSize::Grand <= ContainerCapacity::Dual);
        assert!(SoulSize::Black > ContainerCapacity::Dual);
        assert!(ContainerCapacity::Petty > SoulSize::None);
    }

    #[test]
    fn member_counts_per_tier() {
        assert_eq!(ContainerCapacity::Petty.member_count(), 2);
        assert_eq!(ContainerCapacity::Grand.member_count(), 6);
        assert_eq!(ContainerCapacity::Black.member_count(), 2);
        assert_eq!(ContainerCapacity::Dual.member_count(), 6);
    }

    #[test]
    fn split_terminates_within_four_levels() {
        fn depth(size: SoulSize) -> usize {
            match size.split() {
                Some((a, b)) => {
                    assert!(a < size && b < size);
                    1 + depth(a).max(depth(b))
                }
                None => 0,
            }
        }

        for size in SoulSize::ALL {
            assert!(depth(size) <= 4, "{size}");
        }
        assert_eq!(depth(SoulSize::Grand), 4);
        assert_eq!(SoulSize::Black.split(), None);
    }

    #[test]
    fn split_preserves_raw_magnitude() {
        for size in [SoulSize::Grand, SoulSize::Greater, SoulSize::Common, SoulSize::Lesser] {
            let (a, b) = size.split().expect("splittable");
            assert_eq!(a.raw().value() + b.raw().value(), size.raw().value());
        }
    }

    #[test]
    fn raw_sizes_convert_back() {
        for size in SoulSize::ALL.into_iter().filter(|size| *size < SoulSize::Black) {
            assert_eq!(size.raw().to_soul_size(false), size);
        }
        assert_eq!(RawSoulSize::Petty.to_soul_size(true), SoulSize::Black);
        assert_eq!(SoulSize::Black.raw().to_soul_size(false), SoulSize::Grand);
    }

    #[test]
    fn fill_levels_respect_domain() {
        assert_eq!(
            ContainerCapacity::Petty.fill_levels(),
            vec![SoulSize::None, SoulSize::Petty]
        );
        assert_eq!(ContainerCapacity::Dual.fill_levels().len(), 7);
        assert!(!ContainerCapacity::Black.accepts_fill_level(SoulSize::Grand));
        assert!(!ContainerCapacity::Common.accepts_fill_level(SoulSize::Greater));
        assert_eq!(
            ContainerCapacity::Black.member_fill_level(1),
            Some(SoulSize::Black)
        );
        assert_eq!(ContainerCapacity::Black.member_fill_level(2), None);
    }

    #[test]
    fn names_round_trip_through_serde() {
        let json = serde_json::to_string(&ContainerCapacity::Dual).expect("serialize");
        assert_eq!(json, "\"dual\"");
        let size: SoulSize = serde_json::from_str("\"greater\"").expect("deserialize");
        assert_eq!(size, SoulSize::Greater);
        assert_eq!(SoulSize::parse("Grand"), Some(SoulSize::Grand));
        assert_eq!(ContainerCapacity::from_legacy_index(6), Some(ContainerCapacity::Black));
    }
}
