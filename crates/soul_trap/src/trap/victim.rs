use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use serde::{Deserialize, Serialize};
use soul_trap_proto::SoulSize;

/// A soul waiting to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    source: Option<String>,
    soul_size: SoulSize,
    is_split: bool,
}

impl Victim {
    /// The soul of the actor being trapped.
    pub fn primary(source: impl Into<String>, soul_size: SoulSize) -> Self {
        Self {
            source: Some(source.into()),
            soul_size,
            is_split: false,
        }
    }

    /// A soul pushed out of a container. It has no actor behind it.
    pub fn displaced(soul_size: SoulSize) -> Self {
        Self {
            source: None,
            soul_size,
            is_split: false,
        }
    }

    /// Half of a split soul. Keeps the source of the soul it came from.
    pub fn fragment(source: Option<String>, soul_size: SoulSize) -> Self {
        Self {
            source,
            soul_size,
            is_split: true,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn soul_size(&self) -> SoulSize {
        self.soul_size
    }

    pub fn is_split(&self) -> bool {
        self.is_split
    }

    pub fn is_primary(&self) -> bool {
        self.source.is_some()
    }
}

impl fmt::Display for Victim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(soul={}, source={}, split={})",
            self.soul_size,
            self.source.as_deref().unwrap_or("none"),
            self.is_split
        )
    }
}

#[derive(Debug)]
struct Queued {
    victim: Victim,
    seq: u64,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Largest soul first; equal sizes pop in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.victim
            .soul_size
            .cmp(&other.victim.soul_size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Max-heap of pending souls.
#[derive(Debug, Default)]
pub struct VictimQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl VictimQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, victim: Victim) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { victim, seq });
    }

    pub fn pop(&mut self) -> Option<Victim> {
        self.heap.pop().map(|queued| queued.victim)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Empties the queue, largest soul first.
    pub fn drain_ordered(&mut self) -> Vec<Victim> {
        let mut drained = Vec::with_capacity(self.heap.len());
        while let Some(victim) = self.pop() {
            drained.push(victim);
        }
        drained
    }
}
