use soul_trap_proto::{RecordId, SoulSize};

use super::error::TrapError;
use crate::container::ContainerMap;
use crate::inventory::{ExtraData, Inventory};

/// Spends the soul held by one `record` in the inventory.
///
/// The filled container is removed. A reusable container is handed back as
/// its linked empty companion, keeping the owner of the spent instance.
/// Returns the soul that was consumed.
pub fn consume_charge(
    map: &ContainerMap,
    inventory: &mut dyn Inventory,
    record: RecordId,
) -> Result<SoulSize, TrapError> {
    let fill = map
        .fill_level_of(record)
        .or_else(|| map.record(record).map(|found| found.contained))
        .ok_or(TrapError::MissingRecord { record })?;
    if fill == SoulSize::None {
        return Err(TrapError::NothingToConsume { record });
    }

    let reusable = map.record(record).is_some_and(|found| found.reusable);
    let base = if reusable {
        Some(
            map.base_record_of(record)
                .ok_or(TrapError::MissingBaseRecord { record })?,
        )
    } else {
        None
    };

    let extra = inventory
        .entries()
        .get(&record)
        .and_then(|entry| entry.extra.first().cloned());
    inventory.remove_item(record, 1, extra.as_ref())?;

    if let Some(base) = base {
        let fresh = extra
            .and_then(|extra| extra.owner)
            .map(ExtraData::owned_by);
        inventory.add_item(base, 1, fresh);
        tracing::debug!(record = %record, base = %base, "reusable container emptied");
    }
    tracing::debug!(record = %record, soul = %fill, "charge consumed");
    Ok(fill)
}
