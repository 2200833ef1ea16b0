//! One search strategy per kind of soul. Each returns where the soul went,
//! or `None` when no owned container could take it.

use soul_trap_proto::{ContainerCapacity, SoulSize};

use super::error::TrapError;
use super::notify::SuccessKind;
use super::session::{Placement, TrapSession};
use super::victim::Victim;
use crate::container::RangeError;

/// Fill levels a soul of `size` may be placed over.
fn candidate_fills(session: &TrapSession<'_>, size: SoulSize) -> impl Iterator<Item = SoulSize> {
    let end = if session.policy.allow_displacement {
        size
    } else {
        SoulSize::Petty
    };
    SoulSize::None.range_to(end)
}

fn requeue_displaced(session: &mut TrapSession<'_>, fill: SoulSize) {
    if session.policy.allow_relocation && fill > SoulSize::None {
        tracing::trace!(soul = %fill, "re-queueing displaced soul");
        session.victims.push(Victim::displaced(fill));
    }
}

fn displaced(fill: SoulSize) -> Option<SoulSize> {
    (fill > SoulSize::None).then_some(fill)
}

pub(crate) fn trap_black_soul(
    session: &mut TrapSession<'_>,
) -> Result<Option<Placement>, TrapError> {
    if let Some(container) =
        session.fill_first_owned(ContainerCapacity::Black, SoulSize::None, SoulSize::Black)?
    {
        return Ok(Some(Placement {
            kind: SuccessKind::SoulCaptured,
            container,
            displaced: None,
        }));
    }

    for fill in candidate_fills(session, SoulSize::Black) {
        let Some(container) =
            session.fill_first_owned(ContainerCapacity::Dual, fill, SoulSize::Black)?
        else {
            continue;
        };
        let kind = if session.policy.allow_relocation && fill > SoulSize::None {
            requeue_displaced(session, fill);
            SuccessKind::SoulDisplaced
        } else {
            SuccessKind::SoulCaptured
        };
        return Ok(Some(Placement {
            kind,
            container,
            displaced: displaced(fill),
        }));
    }
    Ok(None)
}

pub(crate) fn trap_full_soul(
    session: &mut TrapSession<'_>,
    soul: SoulSize,
) -> Result<Option<Placement>, TrapError> {
    let Some(first) = soul.to_capacity() else {
        return Ok(None);
    };
    let last = if session.policy.allow_partial_fill {
        ContainerCapacity::LAST_WHITE
    } else {
        first
    };

    if !session.policy.allow_relocation {
        // Displaced souls are dropped on this path.
        for fill in candidate_fills(session, soul) {
            for capacity in first.range_through(last) {
                if let Some(container) = session.fill_first_owned(capacity, fill, soul)? {
                    let kind = if fill > SoulSize::None {
                        SuccessKind::SoulDisplaced
                    } else {
                        SuccessKind::SoulCaptured
                    };
                    return Ok(Some(Placement {
                        kind,
                        container,
                        displaced: displaced(fill),
                    }));
                }
            }
        }
        return Ok(None);
    }

    for capacity in first.range_through(last) {
        for fill in candidate_fills(session, soul) {
            if let Some(container) = session.fill_first_owned(capacity, fill, soul)? {
                requeue_displaced(session, fill);
                let kind = if fill > SoulSize::None {
                    SuccessKind::SoulDisplaced
                } else {
                    SuccessKind::SoulCaptured
                };
                return Ok(Some(Placement {
                    kind,
                    container,
                    displaced: displaced(fill),
                }));
            }
        }
    }

    if session.policy.allow_displacement
        && (session.policy.allow_partial_fill || soul == SoulSize::Grand)
    {
        return evict_black_soul(session, soul);
    }
    Ok(None)
}

/// Moves a black soul out of an owned dual container into an empty black
/// container, then puts `soul` into the dual container.
fn evict_black_soul(
    session: &mut TrapSession<'_>,
    soul: SoulSize,
) -> Result<Option<Placement>, TrapError> {
    let Some((group, dual_filled)) =
        session.first_owned(ContainerCapacity::Dual, SoulSize::Black)?
    else {
        return Ok(None);
    };
    let destination = group.record_at(soul).ok_or(RangeError {
        capacity: ContainerCapacity::Dual,
        fill: soul,
    })?;

    if session
        .fill_first_owned(ContainerCapacity::Black, SoulSize::None, SoulSize::Black)?
        .is_none()
    {
        return Ok(None);
    }
    tracing::debug!(dual = %dual_filled, "black soul moved out of dual container");

    session.replace_container(destination, dual_filled)?;
    Ok(Some(Placement {
        kind: SuccessKind::SoulDisplaced,
        container: destination,
        displaced: Some(SoulSize::Black),
    }))
}

/// Puts `soul` into a smaller container, filling it completely.
pub(crate) fn trap_shrunk_soul(
    session: &mut TrapSession<'_>,
    soul: SoulSize,
) -> Result<Option<Placement>, TrapError> {
    let smaller = ContainerCapacity::ALL
        .into_iter()
        .rev()
        .filter(|capacity| *capacity < soul);

    for capacity in smaller {
        let target = capacity.effective_soul_size();
        for fill in candidate_fills(session, target) {
            if let Some(container) = session.fill_first_owned(capacity, fill, target)? {
                requeue_displaced(session, fill);
                return Ok(Some(Placement {
                    kind: SuccessKind::SoulShrunk,
                    container,
                    displaced: displaced(fill),
                }));
            }
        }
    }
    Ok(None)
}

/// Places a fragment only into containers of its own tier.
pub(crate) fn trap_split_soul(
    session: &mut TrapSession<'_>,
    fragment: SoulSize,
) -> Result<Option<Placement>, TrapError> {
    let Some(capacity) = fragment.to_capacity() else {
        return Ok(None);
    };
    for fill in candidate_fills(session, fragment) {
        if let Some(container) = session.fill_first_owned(capacity, fill, fragment)? {
            requeue_displaced(session, fill);
            return Ok(Some(Placement {
                kind: SuccessKind::SoulSplit,
                container,
                displaced: displaced(fill),
            }));
        }
    }
    Ok(None)
}

/// Queues both halves of `victim`. Returns `false` when the soul is too
/// small to split.
pub(crate) fn split_soul(session: &mut TrapSession<'_>, victim: &Victim) -> bool {
    let Some((larger, smaller)) = victim.soul_size().split() else {
        return false;
    };
    tracing::trace!(soul = %victim.soul_size(), %larger, %smaller, "splitting soul");
    let source = victim.source().map(str::to_string);
    session
        .victims
        .push(Victim::fragment(source.clone(), larger));
    session.victims.push(Victim::fragment(source, smaller));
    true
}
