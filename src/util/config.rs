//! Configuration file support for workspace loading.
//!
//! Two configuration file locations are recognized:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.mvn/berth.toml` - Workspace-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the project-level configuration file inside `.mvn/`.
pub const PROJECT_CONFIG_FILE: &str = "berth.toml";

/// Workspace loading configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Discovery settings
    pub discovery: DiscoveryConfig,

    /// Descriptor model settings
    pub model: ModelConfig,

    /// Network and repository settings
    pub net: NetConfig,

    /// Override properties, consulted before any descriptor-declared value
    pub properties: IndexMap<String, String>,
}

/// Settings that shape the discovery walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Pin the workspace root instead of walking up the filesystem
    pub root_project_dir: Option<PathBuf>,

    /// Start directory used by `current_workspace`
    pub current_project: Option<PathBuf>,

    /// Skip submodules that fail to load instead of aborting
    pub warn_on_failed_workspace_modules: bool,

    /// Fail when a project version keeps unresolved placeholders
    pub require_resolved_versions: bool,

    /// Descriptor file names tried when `pom.xml` is absent
    pub alternate_descriptors: Vec<String>,
}

/// Settings for the descriptor model builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModelConfig {
    /// Build effective models (inheritance applied) instead of raw ones
    pub effective_model_builder: bool,

    /// Profile ids to activate; `!id` deactivates
    pub active_profiles: Vec<String>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetConfig {
    /// Offline mode (never expect remote resolution)
    pub offline: bool,

    /// Local repository consulted for parents living outside the workspace
    pub local_repository: Option<PathBuf>,
}

impl WorkspaceConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: WorkspaceConfig) {
        if other.discovery.root_project_dir.is_some() {
            self.discovery.root_project_dir = other.discovery.root_project_dir;
        }
        if other.discovery.current_project.is_some() {
            self.discovery.current_project = other.discovery.current_project;
        }
        if other.discovery.warn_on_failed_workspace_modules {
            self.discovery.warn_on_failed_workspace_modules = true;
        }
        if other.discovery.require_resolved_versions {
            self.discovery.require_resolved_versions = true;
        }
        if !other.discovery.alternate_descriptors.is_empty() {
            self.discovery.alternate_descriptors = other.discovery.alternate_descriptors;
        }

        if other.model.effective_model_builder {
            self.model.effective_model_builder = true;
        }
        if !other.model.active_profiles.is_empty() {
            self.model.active_profiles = other.model.active_profiles;
        }

        if other.net.offline {
            self.net.offline = true;
        }
        if other.net.local_repository.is_some() {
            self.net.local_repository = other.net.local_repository;
        }

        self.properties.extend(other.properties);
    }

    /// Use effective models instead of raw ones.
    pub fn with_effective_model_builder(mut self, enabled: bool) -> Self {
        self.model.effective_model_builder = enabled;
        self
    }

    /// Pin the workspace root directory.
    pub fn with_root_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.discovery.root_project_dir = Some(dir.into());
        self
    }

    /// Set the start directory for `current_workspace`.
    pub fn with_current_project(mut self, dir: impl Into<PathBuf>) -> Self {
        self.discovery.current_project = Some(dir.into());
        self
    }

    /// Skip failing submodules with a warning.
    pub fn with_warn_on_failed_workspace_modules(mut self, enabled: bool) -> Self {
        self.discovery.warn_on_failed_workspace_modules = enabled;
        self
    }

    /// Require every project version to be fully resolved.
    pub fn with_require_resolved_versions(mut self, enabled: bool) -> Self {
        self.discovery.require_resolved_versions = enabled;
        self
    }

    /// Add an alternate descriptor file name.
    pub fn with_alternate_descriptor(mut self, name: impl Into<String>) -> Self {
        self.discovery.alternate_descriptors.push(name.into());
        self
    }

    /// Request a profile (or `!id` to deactivate it).
    pub fn with_active_profile(mut self, id: impl Into<String>) -> Self {
        self.model.active_profiles.push(id.into());
        self
    }

    /// Set offline mode.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.net.offline = offline;
        self
    }

    /// Set the local repository directory.
    pub fn with_local_repository(mut self, dir: impl Into<PathBuf>) -> Self {
        self.net.local_repository = Some(dir.into());
        self
    }

    /// Add an override property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.mvn/berth.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> WorkspaceConfig {
    let mut config = WorkspaceConfig::default();

    if global_path.exists() {
        config.merge(WorkspaceConfig::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(WorkspaceConfig::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".berth"))
}

/// Get the global config path (~/.berth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.mvn/berth.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mvn").join(PROJECT_CONFIG_FILE)
}
