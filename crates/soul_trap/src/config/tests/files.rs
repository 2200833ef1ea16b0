use super::*;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{unique}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn sample_settings_match_defaults() {
    let settings = parse_settings(SAMPLE_SETTINGS, "soul_trap.toml").expect("settings");
    assert_eq!(settings, TrapSettings::default());
}

#[test]
fn settings_keys_are_optional() {
    let settings = parse_settings(
        "[soul_trap]\nsoul_shrinking_technique = \"split\"\n[soul_trap.thresholds]\ngrand = 45\n",
        "partial.toml",
    )
    .expect("settings");
    assert_eq!(settings.soul_shrinking_technique, ShrinkingTechnique::Split);
    assert_eq!(settings.thresholds.grand, 45);
    assert_eq!(settings.thresholds.black, 50);
    assert!(settings.allow_soul_relocation);

    let empty = parse_settings("", "empty.toml").expect("empty settings");
    assert_eq!(empty, TrapSettings::default());
}

#[test]
fn settings_reject_unknown_enum_values() {
    let err = parse_settings(
        "[soul_trap]\nsoul_trap_leveling = \"sometimes\"\n",
        "bad.toml",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ParseConfigFile { .. }));
}

#[test]
fn missing_settings_file_yields_defaults() {
    let dir = temp_dir("soul-trap-settings");
    let settings = load_settings_file(&dir.join("absent.toml")).expect("defaults");
    assert_eq!(settings, TrapSettings::default());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn sample_data_builds_a_map() {
    let catalog = parse_record_catalog(SAMPLE_RECORDS, "records.toml").expect("catalog");
    let report = parse_container_groups(SAMPLE_CONTAINERS, "soul_trap_vanilla.toml")
        .expect("containers");
    assert!(report.rejected.is_empty());
    assert_eq!(report.groups.len(), 6);

    let (map, build) = ContainerMap::build(&report.groups, &catalog).expect("map");
    assert!(build.failed.is_empty(), "{:?}", build.failed);
    assert_eq!(map.groups(ContainerCapacity::Dual).len(), 1);
    assert_eq!(map.groups(ContainerCapacity::Grand).len(), 2);
    assert_eq!(map.groups(ContainerCapacity::Grand)[0].id(), "azura_star");
    assert_eq!(map.groups(ContainerCapacity::Lesser).len(), 1);
    assert_eq!(
        map.base_record_of(RecordId(0x0500_0824)),
        Some(RecordId(0x0006_3B27))
    );
}

#[test]
fn invalid_groups_are_skipped_with_a_reason() {
    let content = r#"
[[containers]]
id = "ok"
capacity = "petty"
members = [[0x1, "A.esp"], [0x2, "A.esp"]]

[[containers]]
id = "bad_capacity"
capacity = 9
members = [[0x1, "A.esp"], [0x2, "A.esp"]]

[[containers]]
id = "bad_member"
capacity = "petty"
members = [[0x1, "A.esp"], ["0x2", "A.esp"]]

[[containers]]
capacity = "petty"
members = [[0x1, "A.esp"], [0x2, "A.esp"]]

[[containers]]
id = "bad_priority"
capacity = "petty"
priority = "urgent"
members = [[0x1, "A.esp"], [0x2, "A.esp"]]
"#;
    let report = parse_container_groups(content, "mixed.toml").expect("report");
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].id(), "ok");

    let reasons: Vec<_> = report
        .rejected
        .iter()
        .map(|error| match error {
            ConfigError::InvalidGroup { source, .. } => source.clone(),
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert!(matches!(reasons[0], GroupSpecError::InvalidCapacity { .. }));
    assert!(matches!(
        reasons[1],
        GroupSpecError::InvalidMember { index: 1, .. }
    ));
    assert_eq!(reasons[2], GroupSpecError::MissingId);
    assert!(matches!(reasons[3], GroupSpecError::InvalidPriority { .. }));
}

#[test]
fn directory_loader_filters_by_prefix() {
    let dir = temp_dir("soul-trap-containers");
    fs::write(dir.join("soul_trap_vanilla.toml"), SAMPLE_CONTAINERS).expect("write");
    fs::write(dir.join("soul_trap_broken.toml"), "[[containers]\n").expect("write");
    fs::write(dir.join("other.toml"), SAMPLE_CONTAINERS).expect("write");

    let groups = load_container_dir(&dir, DEFAULT_CONTAINER_FILE_PREFIX).expect("groups");
    assert_eq!(groups.len(), 6);

    let err = load_container_dir(&dir, "missing_").unwrap_err();
    assert!(matches!(err, ConfigError::NoConfigFiles { .. }));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn directory_without_valid_groups_is_an_error() {
    let dir = temp_dir("soul-trap-empty");
    fs::write(dir.join("soul_trap_empty.toml"), "# nothing here\n").expect("write");
    let err = load_container_dir(&dir, DEFAULT_CONTAINER_FILE_PREFIX).unwrap_err();
    assert_eq!(err, ConfigError::NoValidGroups);
    let _ = fs::remove_dir_all(dir);
}
