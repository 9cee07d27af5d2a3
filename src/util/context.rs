//! Global context for workspace loading.
//!
//! Bundles the working directory, the merged configuration and the override
//! source every load reads from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::descriptor::locate_descriptor;
use crate::core::errors::WorkspaceError;
use crate::util::config::{global_config_path, load_config, project_config_path, WorkspaceConfig};
use crate::util::fs::{absolutize, normalize_path};
use crate::util::overrides::{LayeredOverrides, MapOverrides, OverrideSource, TOP_LEVEL_BASEDIR};

/// Global context containing configuration and overrides.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged configuration
    config: WorkspaceConfig,

    /// Override properties, consulted before descriptor properties
    overrides: Arc<dyn OverrideSource>,
}

impl GlobalContext {
    /// Create a GlobalContext from the process working directory and the
    /// global and project configuration files.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::from_config_files(cwd))
    }

    /// Create a GlobalContext for `cwd`, merging `~/.berth/config.toml` with
    /// `<cwd>/.mvn/berth.toml`.
    pub fn from_config_files(cwd: PathBuf) -> Self {
        let global = global_config_path().unwrap_or_else(|| PathBuf::from(".berth/config.toml"));
        let config = load_config(&global, &project_config_path(&cwd));
        Self::with_config(cwd, config)
    }

    /// Create a GlobalContext with an explicit configuration.
    ///
    /// Override properties default to the configuration's `[properties]`.
    pub fn with_config(cwd: PathBuf, config: WorkspaceConfig) -> Self {
        let overrides = Arc::new(MapOverrides::from(config.properties.clone()));
        GlobalContext {
            cwd,
            config,
            overrides,
        }
    }

    /// Replace the override source.
    ///
    /// Configuration properties stay available as a lower-priority layer.
    pub fn with_overrides(mut self, overrides: Arc<dyn OverrideSource>) -> Self {
        self.overrides = if self.config.properties.is_empty() {
            overrides
        } else {
            Arc::new(
                LayeredOverrides::new()
                    .push(overrides)
                    .push(Arc::new(MapOverrides::from(self.config.properties.clone()))),
            )
        };
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Get the override source.
    pub fn overrides(&self) -> &dyn OverrideSource {
        self.overrides.as_ref()
    }

    /// Get a shared handle to the override source.
    pub fn shared_overrides(&self) -> Arc<dyn OverrideSource> {
        Arc::clone(&self.overrides)
    }

    /// Descriptor file names tried when `pom.xml` is absent.
    pub fn alternate_descriptors(&self) -> &[String] {
        &self.config.discovery.alternate_descriptors
    }

    /// Directory `current_workspace` starts from: the configured current
    /// project, or the working directory.
    pub fn current_project_dir(&self) -> PathBuf {
        match &self.config.discovery.current_project {
            Some(dir) => absolutize(&self.cwd, dir),
            None => self.cwd.clone(),
        }
    }

    /// Explicit workspace root, from configuration or the
    /// `maven.top-level-basedir` override property.
    pub fn root_project_dir(&self) -> Option<PathBuf> {
        self.config
            .discovery
            .root_project_dir
            .clone()
            .or_else(|| self.overrides.get(TOP_LEVEL_BASEDIR).map(PathBuf::from))
            .map(|dir| normalize_path(&absolutize(&self.cwd, &dir)))
    }

    /// Find the descriptor governing the working directory, searching upward.
    pub fn find_descriptor(&self) -> Result<PathBuf, WorkspaceError> {
        locate_descriptor(&self.cwd, self.alternate_descriptors())
    }
}
