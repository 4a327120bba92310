//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Local config: `<project_dir>/.orgchart.toml`
//! 4. Environment variables: `ORGCHART_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{Geometry, OrphanPolicy};

/// Raw geometry for intermediate parsing (`None` → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGeometry {
    pub unit_height: Option<u32>,
    pub padding: Option<u32>,
    pub staff_offset: Option<u32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub on_orphan: Option<OrphanPolicy>,
    pub geometry: RawGeometry,
}

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON store file (default: ./orgchart.json)
    pub store_path: PathBuf,
    /// Handling of records whose parent does not exist (default: drop)
    pub on_orphan: OrphanPolicy,
    /// Staff box geometry
    pub geometry: Geometry,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("orgchart.json"),
            on_orphan: OrphanPolicy::default(),
            geometry: Geometry::default(),
        }
    }
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".orgchart.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.store_path = expand_path(&self.store_path);
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            on_orphan: overlay.on_orphan.unwrap_or(self.on_orphan),
            geometry: Geometry {
                unit_height: overlay
                    .geometry
                    .unit_height
                    .unwrap_or(self.geometry.unit_height),
                padding: overlay.geometry.padding.unwrap_or(self.geometry.padding),
                staff_offset: overlay
                    .geometry
                    .staff_offset
                    .unwrap_or(self.geometry.staff_offset),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.orgchart.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
    /// 3. Local config: `<project_dir>/.orgchart.toml`
    /// 4. Environment variables: `ORGCHART_*` prefix
    ///
    /// A relative `store_path` from the local file is resolved against
    /// `project_dir`.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.store_path = raw.store_path.map(|p| {
                    let p = expand_path(&p);
                    if p.is_relative() {
                        dir.join(p)
                    } else {
                        p
                    }
                });
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply ORGCHART_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGCHART")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<String>(&config, "store_path")? {
            settings.store_path = PathBuf::from(val);
        }
        if let Some(val) = env_value::<String>(&config, "on_orphan")? {
            settings.on_orphan = parse_orphan_policy(&val)?;
        }
        if let Some(val) = env_value(&config, "geometry.unit_height")? {
            settings.geometry.unit_height = val;
        }
        if let Some(val) = env_value(&config, "geometry.padding")? {
            settings.geometry.padding = val;
        }
        if let Some(val) = env_value(&config, "geometry.staff_offset")? {
            settings.geometry.staff_offset = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   Local:  <project_dir>/.orgchart.toml
#   Env:    ORGCHART_* environment variables (ORGCHART_GEOMETRY__PADDING=...)

# JSON store holding nodes and members
# store_path = "orgchart.json"

# Records whose parent does not exist: "drop" or "promote_to_root"
# on_orphan = "drop"

[geometry]
# Vertical space reserved per staff entry
# unit_height = 90

# Extra space once a node has any staff entry
# padding = 40

# Lateral offset of the staff box connector
# staff_offset = 140
"#
        .to_string()
    }
}

fn parse_orphan_policy(value: &str) -> Result<OrphanPolicy, ApplicationError> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "drop" => Ok(OrphanPolicy::Drop),
        "promote_to_root" => Ok(OrphanPolicy::PromoteToRoot),
        other => Err(ApplicationError::Config {
            message: format!("invalid on_orphan value: {other}"),
        }),
    }
}

/// Typed env value; `None` when unset, an error when set but unparsable.
fn env_value<T: DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("environment override {key}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
