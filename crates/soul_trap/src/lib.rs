pub mod config;
pub mod container;
pub mod inventory;
pub mod trap;

#[cfg(test)]
mod fixtures;

pub use config::{
    load_container_dir, load_settings_file, parse_container_groups, parse_record_catalog,
    parse_settings, ConfigError, ContainerFileReport, LevelingType, PolicySnapshot,
    ShrinkingTechnique, Thresholds, TrapSettings, DEFAULT_CONTAINER_FILE_PREFIX,
};
pub use container::{
    log_error_chain, BuildReport, ConcreteContainerGroup, ContainerGroupSpec, ContainerMap,
    FormIntegrityError, GroupLoadError, GroupSpecError, LoadPriority, MapBuildError, MergeError,
    RangeError,
};
pub use inventory::{ActorInventory, ExtraData, Inventory, InventoryEntry, InventoryError};
pub use trap::{
    apply_leveling, consume_charge, Caster, FailureKind, FixedSoulLossRoll, InventoryStatus,
    LevelingOutcome, Notification, NotificationSink, NullSink, OsSoulLossRoll, RecordingSink,
    Rejection, SoulLossRoll, SoulSource, SoulTrapper, SuccessKind, TrapError, TrapReport, Victim,
    VictimOutcome, VictimQueue, VictimRecord, MAX_NOTIFICATIONS,
};

pub use soul_trap_proto::{
    ContainerCapacity, ContainerRecord, RawSoulSize, RecordCatalog, RecordId, RecordLocator,
    RecordResolver, SoulSize,
};
