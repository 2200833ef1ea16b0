use std::fs;
use std::path::{Path, PathBuf};

use soul_trap_proto::{ContainerCapacity, ContainerRecord, RecordCatalog, RecordLocator};

use super::error::ConfigError;
use super::TrapSettings;
use crate::container::{log_error_chain, ContainerGroupSpec, GroupSpecError, LoadPriority};

pub const DEFAULT_CONTAINER_FILE_PREFIX: &str = "soul_trap_";

const SETTINGS_TABLE: &str = "soul_trap";
const CONTAINERS_KEY: &str = "containers";
const RECORDS_KEY: &str = "records";

/// Container groups read from one file, plus the entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFileReport {
    pub groups: Vec<ContainerGroupSpec>,
    pub rejected: Vec<ConfigError>,
}

pub fn parse_settings(content: &str, path: &str) -> Result<TrapSettings, ConfigError> {
    let value = parse_toml(content, path)?;
    match value.get(SETTINGS_TABLE) {
        Some(table) => table
            .clone()
            .try_into::<TrapSettings>()
            .map_err(|err| ConfigError::ParseConfigFile {
                path: path.to_string(),
                message: err.to_string(),
            }),
        None => {
            tracing::warn!(path, "settings file has no [{SETTINGS_TABLE}] table; using defaults");
            Ok(TrapSettings::default())
        }
    }
}

/// Reads the settings file. A missing file is not an error.
pub fn load_settings_file(path: &Path) -> Result<TrapSettings, ConfigError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "settings file not found; using defaults");
        return Ok(TrapSettings::default());
    }
    let content = read_file(path)?;
    let settings = parse_settings(&content, &path.display().to_string())?;
    tracing::info!(path = %path.display(), ?settings, "loaded soul trap settings");
    Ok(settings)
}

pub fn parse_container_groups(
    content: &str,
    file: &str,
) -> Result<ContainerFileReport, ConfigError> {
    let value = parse_toml(content, file)?;
    let mut report = ContainerFileReport::default();

    let Some(entries) = value.get(CONTAINERS_KEY) else {
        tracing::warn!(file, "container file has no [[{CONTAINERS_KEY}]] entries");
        return Ok(report);
    };
    let entries = entries
        .as_array()
        .ok_or_else(|| ConfigError::ParseConfigFile {
            path: file.to_string(),
            message: format!("`{CONTAINERS_KEY}` must be an array of tables"),
        })?;

    for (index, entry) in entries.iter().enumerate() {
        match parse_group(entry) {
            Ok(group) => {
                tracing::debug!(
                    file,
                    group = group.id(),
                    capacity = %group.capacity(),
                    reusable = group.is_reusable(),
                    priority = %group.priority(),
                    "read container group"
                );
                report.groups.push(group);
            }
            Err(source) => {
                let error = ConfigError::InvalidGroup {
                    file: file.to_string(),
                    index,
                    source,
                };
                log_error_chain(&error);
                report.rejected.push(error);
            }
        }
    }
    Ok(report)
}

/// Reads every `<prefix>*.toml` file in `dir`, in file name order.
pub fn load_container_dir(
    dir: &Path,
    prefix: &str,
) -> Result<Vec<ContainerGroupSpec>, ConfigError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|err| ConfigError::ReadConfigFile {
            path: dir.display().to_string(),
            message: err.to_string(),
        })?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "toml")
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(prefix))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(ConfigError::NoConfigFiles {
            dir: dir.display().to_string(),
            prefix: prefix.to_string(),
        });
    }

    let mut groups = Vec::new();
    for path in &paths {
        tracing::info!(path = %path.display(), "reading container file");
        let file = path.display().to_string();
        let parsed = read_file(path).and_then(|content| parse_container_groups(&content, &file));
        match parsed {
            Ok(report) => groups.extend(report.groups),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping container file");
            }
        }
    }

    if groups.is_empty() {
        return Err(ConfigError::NoValidGroups);
    }
    Ok(groups)
}

/// Parses `[[records]]` entries into a catalog.
pub fn parse_record_catalog(content: &str, file: &str) -> Result<RecordCatalog, ConfigError> {
    let value = parse_toml(content, file)?;
    let entries = value
        .get(RECORDS_KEY)
        .and_then(toml::Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut catalog = RecordCatalog::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let record: ContainerRecord =
            entry
                .try_into()
                .map_err(|err: toml::de::Error| ConfigError::InvalidRecord {
                    file: file.to_string(),
                    index,
                    message: err.to_string(),
                })?;
        catalog.insert(record)?;
    }
    tracing::debug!(file, records = catalog.len(), "loaded record catalog");
    Ok(catalog)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|err| ConfigError::ReadConfigFile {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

fn parse_toml(content: &str, path: &str) -> Result<toml::Value, ConfigError> {
    let value: toml::Value = toml::from_str(content).map_err(|err| ConfigError::ParseConfigFile {
        path: path.to_string(),
        message: err.to_string(),
    })?;
    if !value.is_table() {
        return Err(ConfigError::ParseConfigFile {
            path: path.to_string(),
            message: "root is not a TOML table".to_string(),
        });
    }
    Ok(value)
}

fn parse_group(entry: &toml::Value) -> Result<ContainerGroupSpec, GroupSpecError> {
    let id = entry
        .get("id")
        .and_then(toml::Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(GroupSpecError::MissingId)?
        .to_string();

    let reusable = match entry.get("reusable") {
        None => false,
        Some(value) => value.as_bool().ok_or_else(|| GroupSpecError::InvalidField {
            group: id.clone(),
            field: "reusable",
            expected: "boolean",
        })?,
    };

    let capacity = match entry.get("capacity") {
        Some(toml::Value::String(name)) => ContainerCapacity::parse(name),
        Some(toml::Value::Integer(index)) => ContainerCapacity::from_legacy_index(*index),
        Some(_) => None,
        None => {
            return Err(GroupSpecError::InvalidField {
                group: id,
                field: "capacity",
                expected: "capacity name or integer",
            })
        }
    }
    .ok_or_else(|| GroupSpecError::InvalidCapacity {
        group: id.clone(),
        value: entry
            .get("capacity")
            .map(ToString::to_string)
            .unwrap_or_default(),
    })?;

    let priority = match entry.get("priority") {
        None => LoadPriority::Auto,
        Some(value) => value
            .as_str()
            .and_then(LoadPriority::parse)
            .ok_or_else(|| GroupSpecError::InvalidPriority {
                group: id.clone(),
                value: value.to_string(),
            })?,
    };

    let members = entry
        .get("members")
        .and_then(toml::Value::as_array)
        .ok_or_else(|| GroupSpecError::InvalidField {
            group: id.clone(),
            field: "members",
            expected: "array",
        })?
        .iter()
        .enumerate()
        .map(|(index, member)| parse_member(&id, index, member))
        .collect::<Result<Vec<_>, _>>()?;

    ContainerGroupSpec::new(id, reusable, capacity, priority, members)
}

fn parse_member(
    group: &str,
    index: usize,
    member: &toml::Value,
) -> Result<RecordLocator, GroupSpecError> {
    let invalid = |reason: &str| GroupSpecError::InvalidMember {
        group: group.to_string(),
        index,
        reason: reason.to_string(),
    };

    let pair = member
        .as_array()
        .filter(|pair| pair.len() == 2)
        .ok_or_else(|| invalid("expected a [form_id, \"plugin\"] pair"))?;
    let form_id = pair[0]
        .as_integer()
        .and_then(|raw| u32::try_from(raw).ok())
        .ok_or_else(|| invalid("form id must be a non-negative 32-bit integer"))?;
    let plugin = pair[1]
        .as_str()
        .map(str::trim)
        .filter(|plugin| !plugin.is_empty())
        .ok_or_else(|| invalid("plugin must be a non-empty string"))?;

    Ok(RecordLocator::new(form_id, plugin))
}
