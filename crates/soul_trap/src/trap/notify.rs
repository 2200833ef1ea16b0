use serde::{Deserialize, Serialize};

use super::victim::Victim;

/// Maximum player-facing notifications per trapping call.
pub const MAX_NOTIFICATIONS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessKind {
    SoulCaptured,
    SoulDisplaced,
    SoulShrunk,
    SoulSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoSoulGemsOwned,
    AllSoulGemsFilled,
    NoSoulGemLargeEnough,
    NoSuitableSoulGem,
    SoulLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Success { kind: SuccessKind, degraded: bool },
    Failure { kind: FailureKind },
}

impl Notification {
    /// Translation key shown by the host.
    pub fn message_key(&self) -> &'static str {
        match self {
            Notification::Success { kind, degraded } => match (kind, degraded) {
                (SuccessKind::SoulCaptured, false) => "$soul_trap_soul_captured",
                (SuccessKind::SoulCaptured, true) => "$soul_trap_soul_captured_degraded",
                (SuccessKind::SoulDisplaced, false) => "$soul_trap_soul_displaced",
                (SuccessKind::SoulDisplaced, true) => "$soul_trap_soul_displaced_degraded",
                (SuccessKind::SoulShrunk, false) => "$soul_trap_soul_shrunk",
                (SuccessKind::SoulShrunk, true) => "$soul_trap_soul_shrunk_degraded",
                (SuccessKind::SoulSplit, false) => "$soul_trap_soul_split",
                (SuccessKind::SoulSplit, true) => "$soul_trap_soul_split_degraded",
            },
            Notification::Failure { kind } => match kind {
                FailureKind::NoSoulGemsOwned => "$soul_trap_no_soul_gems_owned",
                FailureKind::AllSoulGemsFilled => "$soul_trap_all_soul_gems_filled",
                FailureKind::NoSoulGemLargeEnough => "$soul_trap_no_soul_gem_large_enough",
                FailureKind::NoSuitableSoulGem => "$soul_trap_no_suitable_soul_gem",
                FailureKind::SoulLost => "$soul_trap_soul_lost",
            },
        }
    }
}

/// Receives player-facing notifications and the souls-trapped event.
pub trait NotificationSink {
    fn notify(&mut self, notification: &Notification);

    /// Fired once per call, for the first soul of the trapped actor placed.
    fn souls_trapped(&mut self, caster: &str, victim: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: &Notification) {}

    fn souls_trapped(&mut self, _caster: &str, _victim: &str) {}
}

/// Keeps everything it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub notifications: Vec<Notification>,
    pub souls_trapped: Vec<(String, String)>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(*notification);
    }

    fn souls_trapped(&mut self, caster: &str, victim: &str) {
        self.souls_trapped
            .push((caster.to_string(), victim.to_string()));
    }
}

/// Applies the per-call notification rules in front of a sink.
pub(crate) struct NotificationGate<'a> {
    sink: &'a mut dyn NotificationSink,
    caster: &'a str,
    caster_is_player: bool,
    allowed: bool,
    sent: usize,
    event_sent: bool,
}

impl<'a> NotificationGate<'a> {
    pub(crate) fn new(
        sink: &'a mut dyn NotificationSink,
        caster: &'a str,
        caster_is_player: bool,
        allowed: bool,
    ) -> Self {
        Self {
            sink,
            caster,
            caster_is_player,
            allowed,
            sent: 0,
            event_sent: false,
        }
    }

    pub(crate) fn success(&mut self, kind: SuccessKind, degraded: bool, victim: &Victim) {
        if !self.caster_is_player {
            return;
        }
        let Some(source) = victim.source() else {
            return;
        };
        self.send(Notification::Success { kind, degraded });
        if !self.event_sent {
            self.sink.souls_trapped(self.caster, source);
            self.event_sent = true;
        }
    }

    pub(crate) fn failure(&mut self, kind: FailureKind) {
        if self.caster_is_player {
            self.send(Notification::Failure { kind });
        }
    }

    fn send(&mut self, notification: Notification) {
        if self.allowed && self.sent < MAX_NOTIFICATIONS {
            tracing::debug!(key = notification.message_key(), "notifying caster");
            self.sink.notify(&notification);
            self.sent += 1;
        }
    }
}
