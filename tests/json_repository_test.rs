//! Tests for the JSON file repository

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use orgchart::application::services::{RefreshStatus, StructureService};
use orgchart::domain::{ForestBuilder, Geometry, NodeDraft, NodeSource, OrgNodeRecord};
use orgchart::infrastructure::{
    JsonFileRepository, NodeRepository, RealFileSystem, RepositoryError, StoreDocument,
};
use orgchart::util::testing::{init_test_setup, principal_with_staff};

fn repository(dir: &TempDir, name: &str) -> JsonFileRepository {
    JsonFileRepository::new(dir.path().join(name), Arc::new(RealFileSystem))
}

#[test]
fn given_missing_file_when_fetching_then_empty_store() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "orgchart.json");

    // Act
    let nodes = repo.fetch_nodes().unwrap();
    let members = repo.fetch_active_members().unwrap();

    // Assert
    assert!(nodes.is_empty());
    assert!(members.is_empty());
    assert!(!repo.path().exists());
}

#[test]
fn given_malformed_file_when_fetching_then_format_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "orgchart.json");
    fs::write(repo.path(), "{ not json").unwrap();

    // Act
    let result = repo.fetch_nodes();

    // Assert
    assert!(matches!(result, Err(RepositoryError::Format { .. })));
}

#[test]
fn given_hand_written_store_when_fetching_then_defaults_applied() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "orgchart.json");
    fs::write(
        repo.path(),
        r#"{
            "nodes": [
                {"id": "b", "parent_id": "a", "sort_order": 1, "layout_type": "staff_right"},
                {"id": "a", "parent_id": null, "member_id": "m1"}
            ],
            "members": [
                {"id": "m1", "name": "Ada", "position": "CEO"},
                {"id": "m2", "name": "Bob", "is_active": false}
            ]
        }"#,
    )
    .unwrap();

    // Act
    let nodes = repo.fetch_nodes().unwrap();
    let members = repo.fetch_active_members().unwrap();

    // Assert
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(nodes[1].layout_type.is_staff());
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Ada");
}

#[test]
fn given_insert_when_saving_then_written_atomically_in_nested_dir() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "data/org/orgchart.json");
    let draft = NodeDraft::new(
        None,
        NodeSource::Custom {
            title: "  Board  ".to_string(),
            position: None,
        },
    );

    // Act
    let record = repo.insert(draft, 0).unwrap();

    // Assert
    assert_eq!(record.custom_title.as_deref(), Some("Board"));
    assert!(repo.path().exists());
    let tmp = dir.path().join("data/org/orgchart.json.tmp");
    assert!(!tmp.exists());

    let doc: StoreDocument =
        serde_json::from_str(&fs::read_to_string(repo.path()).unwrap()).unwrap();
    assert_eq!(doc.nodes, vec![record]);
}

#[test]
fn given_persisted_store_when_service_mutates_then_reload_sees_changes() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "orgchart.json");
    let doc = StoreDocument {
        nodes: principal_with_staff(),
        members: vec![],
    };
    fs::write(repo.path(), serde_json::to_string(&doc).unwrap()).unwrap();

    let repo: Arc<dyn NodeRepository> = Arc::new(repo);
    let mut service =
        StructureService::new(Arc::clone(&repo), ForestBuilder::new(), Geometry::default());
    service.refresh().unwrap();

    // Act
    let added = service
        .add_node(NodeDraft::new(
            Some("B"),
            NodeSource::Custom {
                title: "Team".to_string(),
                position: Some("Engineering".to_string()),
            },
        ))
        .unwrap();
    service.delete_node(&"C".to_string()).unwrap();

    // Assert
    let reread = repository(&dir, "orgchart.json");
    let mut fresh = StructureService::new(Arc::new(reread), ForestBuilder::new(), Geometry::default());
    let status = fresh.refresh().unwrap();
    assert_eq!(status, RefreshStatus::Rebuilt { roots: 1, nodes: 4 });
    assert!(fresh.find("C").is_none());
    let team = fresh.find(&added.id).unwrap();
    assert_eq!(team.content.position(), Some("Engineering"));
    assert_eq!(fresh.forest(), service.forest());
}

#[test]
fn given_unknown_id_when_deleting_then_not_found_and_file_untouched() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir, "orgchart.json");
    let doc = StoreDocument {
        nodes: vec![OrgNodeRecord::new("a", None, 0)],
        members: vec![],
    };
    let content = serde_json::to_string(&doc).unwrap();
    fs::write(repo.path(), &content).unwrap();

    // Act
    let result = repo.delete(&"zzz".to_string());

    // Assert
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    assert_eq!(fs::read_to_string(repo.path()).unwrap(), content);
}
