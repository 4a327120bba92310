//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::StructureService;
use crate::config::Settings;
use crate::domain::ForestBuilder;
use crate::infrastructure::repository::JsonFileRepository;
use crate::infrastructure::traits::{FileSystem, NodeRepository, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Node store
    pub repo: Arc<dyn NodeRepository>,
}

impl ServiceContainer {
    /// Create a new service container backed by the JSON store in `settings`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let repo = Arc::new(JsonFileRepository::new(
            settings.store_path.clone(),
            Arc::clone(&fs),
        ));
        Self::with_deps(settings, fs, repo)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        repo: Arc<dyn NodeRepository>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, repo }
    }

    /// Structure service configured from settings, with an empty forest.
    pub fn structure_service(&self) -> StructureService {
        StructureService::new(
            Arc::clone(&self.repo),
            ForestBuilder::with_orphan_policy(self.settings.on_orphan),
            self.settings.geometry,
        )
    }
}
