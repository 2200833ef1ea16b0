//! Container map: declared container groups resolved against authoritative
//! records and indexed by capacity tier and fill level.

mod concrete;
mod error;
mod group;
mod map;

pub use concrete::ConcreteContainerGroup;
pub use error::{
    log_error_chain, FormIntegrityError, GroupLoadError, GroupSpecError, MapBuildError,
    MergeError, RangeError,
};
pub use group::{ContainerGroupSpec, LoadPriority};
pub use map::{BuildReport, ContainerMap};

#[cfg(test)]
mod tests;
