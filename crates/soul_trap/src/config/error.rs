use std::error::Error;
use std::fmt;

use soul_trap_proto::CatalogError;

use crate::container::GroupSpecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ReadConfigFile { path: String, message: String },
    ParseConfigFile { path: String, message: String },
    InvalidGroup {
        file: String,
        index: usize,
        source: GroupSpecError,
    },
    InvalidRecord {
        file: String,
        index: usize,
        message: String,
    },
    Catalog(CatalogError),
    NoConfigFiles { dir: String, prefix: String },
    NoValidGroups,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadConfigFile { path, message } => {
                write!(f, "read config file failed ({path}): {message}")
            }
            ConfigError::ParseConfigFile { path, message } => {
                write!(f, "parse config file failed ({path}): {message}")
            }
            ConfigError::InvalidGroup { file, index, .. } => {
                write!(f, "invalid container group #{index} in {file}:")
            }
            ConfigError::InvalidRecord {
                file,
                index,
                message,
            } => write!(f, "invalid record #{index} in {file}: {message}"),
            ConfigError::Catalog(error) => write!(f, "record catalog error: {error}"),
            ConfigError::NoConfigFiles { dir, prefix } => {
                write!(f, "no {prefix}*.toml container files found in {dir}")
            }
            ConfigError::NoValidGroups => write!(f, "no valid container groups found"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::InvalidGroup { source, .. } => Some(source),
            ConfigError::Catalog(source) => Some(source),
            _ => None,
        }
    }
}

impl From<CatalogError> for ConfigError {
    fn from(error: CatalogError) -> Self {
        ConfigError::Catalog(error)
    }
}
