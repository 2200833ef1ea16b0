//! Trapping engine: places a victim's soul, and every soul it pushes out,
//! into the caster's containers.

mod charge;
mod engine;
mod error;
mod leveling;
mod notify;
mod search;
mod session;
mod victim;

pub use charge::consume_charge;
pub use engine::{Caster, Rejection, SoulSource, SoulTrapper, TrapReport};
pub use error::TrapError;
pub use leveling::{
    apply_leveling, FixedSoulLossRoll, LevelingOutcome, OsSoulLossRoll, SoulLossRoll,
};
pub use notify::{
    FailureKind, Notification, NotificationSink, NullSink, RecordingSink, SuccessKind,
    MAX_NOTIFICATIONS,
};
pub use session::{InventoryStatus, VictimOutcome, VictimRecord};
pub use victim::{Victim, VictimQueue};

#[cfg(test)]
mod tests;
