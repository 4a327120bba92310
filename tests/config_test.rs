//! Tests for layered settings and service wiring

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

use orgchart::application::services::RefreshStatus;
use orgchart::application::ApplicationError;
use orgchart::config::{local_config_path, Settings};
use orgchart::domain::{NodeDraft, NodeSource, OrphanPolicy};
use orgchart::infrastructure::di::ServiceContainer;
use orgchart::util::testing::init_test_setup;

/// Serializes tests that read or write `ORGCHART_*` process env vars.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

const ENV_KEYS: [&str; 3] = [
    "ORGCHART_ON_ORPHAN",
    "ORGCHART_GEOMETRY__PADDING",
    "ORGCHART_GEOMETRY__UNIT_HEIGHT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn given_local_config_when_loading_then_overrides_and_resolves_store_path() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
store_path = "data/org.json"
on_orphan = "promote_to_root"

[geometry]
padding = 10
"#,
    )
    .unwrap();

    let _guard = env_lock();

    // Act
    let settings = Settings::load(Some(dir.path())).unwrap();

    // Assert
    assert_eq!(settings.store_path, dir.path().join("data/org.json"));
    assert_eq!(settings.on_orphan, OrphanPolicy::PromoteToRoot);
    assert_eq!(settings.geometry.padding, 10);
}

#[test]
fn given_absolute_store_path_when_loading_then_kept_as_is() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("elsewhere").join("org.json");
    fs::write(
        local_config_path(dir.path()),
        format!("store_path = {:?}\n", store.to_string_lossy()),
    )
    .unwrap();
    let _guard = env_lock();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings.store_path, store);
}

#[test]
fn given_malformed_local_config_when_loading_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "on_orphan = [").unwrap();
    let _guard = env_lock();

    // Act
    let result = Settings::load(Some(dir.path()));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_env_overrides_when_loading_then_env_wins_over_local_file() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "on_orphan = \"drop\"\n\n[geometry]\npadding = 10\n",
    )
    .unwrap();
    let _guard = env_lock();
    std::env::set_var("ORGCHART_ON_ORPHAN", "promote_to_root");
    std::env::set_var("ORGCHART_GEOMETRY__PADDING", "7");

    // Act
    let result = Settings::load(Some(dir.path()));
    clear_env();

    // Assert
    let settings = result.unwrap();
    assert_eq!(settings.on_orphan, OrphanPolicy::PromoteToRoot);
    assert_eq!(settings.geometry.padding, 7);
    assert_eq!(settings.geometry.unit_height, 90);
}

#[test]
fn given_unparsable_env_number_when_loading_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let _guard = env_lock();
    std::env::set_var("ORGCHART_GEOMETRY__UNIT_HEIGHT", "abc");

    // Act
    let result = Settings::load(Some(dir.path()));
    clear_env();

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("unit_height")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_template_when_parsing_then_valid_toml() {
    let template = Settings::template();

    let parsed: Result<toml::Value, _> = toml::from_str(&template);

    assert!(parsed.is_ok());
    assert!(template.contains("staff_offset"));
}

#[test]
fn given_container_on_empty_dir_when_adding_then_store_created() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        store_path: dir.path().join("orgchart.json"),
        ..Settings::default()
    };
    let container = ServiceContainer::new(settings);
    let mut service = container.structure_service();

    // Act
    let status = service.refresh().unwrap();
    let record = service
        .add_node(NodeDraft::new(
            None,
            NodeSource::Custom {
                title: "Board".to_string(),
                position: None,
            },
        ))
        .unwrap();

    // Assert
    assert_eq!(status, RefreshStatus::Rebuilt { roots: 0, nodes: 0 });
    assert_eq!(record.sort_order, 0);
    assert!(PathBuf::from(&container.settings.store_path).exists());
    assert_eq!(service.forest().len(), 1);
}
