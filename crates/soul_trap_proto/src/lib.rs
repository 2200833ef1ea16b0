//! Value types shared by the container map and the trapping engine.

pub mod record;
pub mod soul;

pub use record::{
    CatalogError, ContainerRecord, RecordCatalog, RecordId, RecordLocator, RecordResolver,
};
pub use soul::{ContainerCapacity, RawSoulSize, SoulSize};
