//! Local workspace - every project discovered around a start directory.
//!
//! Projects live in an arena indexed by [`ProjectId`]; the GA registry and
//! the directory index point into it. The first project registered under a
//! GA key wins. A workspace is immutable once discovery returns it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::coordinate::{ArtifactCoords, ArtifactKey, POM_TYPE};
use crate::core::model::ModelMode;
use crate::core::module::{ArtifactSources, SourceDir, WorkspaceModule, TESTS_CLASSIFIER};
use crate::core::project::{LocalProject, ProjectId};
use crate::resolver::interpolate::{has_placeholders, Interpolated};
use crate::resolver::version::VersionResolver;
use crate::util::fs::normalize_path;
use crate::util::overrides::OverrideSource;

/// Artifact type whose files live in the test output directory.
const TEST_JAR_TYPE: &str = "test-jar";

/// The projects of one multi-module build.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    pub(crate) root_dir: PathBuf,
    pub(crate) projects: Vec<LocalProject>,
    pub(crate) by_key: IndexMap<ArtifactKey, ProjectId>,
    pub(crate) by_dir: HashMap<PathBuf, ProjectId>,
    pub(crate) current: ProjectId,
    pub(crate) mode: ModelMode,
    pub(crate) overrides: Arc<dyn OverrideSource>,
    pub(crate) warnings: Vec<String>,
    pub(crate) directory_breaks: Vec<PathBuf>,
}

impl LocalWorkspace {
    /// The topmost directory of the workspace.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// The project discovery started from.
    pub fn current_project(&self) -> &LocalProject {
        self.project(self.current)
    }

    /// The project in the root directory, if it has a descriptor.
    pub fn root_project(&self) -> Option<&LocalProject> {
        self.project_at(&self.root_dir)
    }

    /// Look up a project by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` comes from another workspace.
    pub fn project(&self, id: ProjectId) -> &LocalProject {
        &self.projects[id.0]
    }

    /// Look up a registered project by group and artifact id.
    pub fn get_project(&self, group_id: &str, artifact_id: &str) -> Option<&LocalProject> {
        self.get(&ArtifactKey::ga(group_id, artifact_id))
    }

    /// Look up a registered project by GA key.
    pub fn get(&self, key: &ArtifactKey) -> Option<&LocalProject> {
        self.by_key.get(key).map(|&id| self.project(id))
    }

    /// Look up a project by directory.
    pub fn project_at(&self, dir: &Path) -> Option<&LocalProject> {
        self.by_dir
            .get(dir)
            .or_else(|| self.by_dir.get(&normalize_path(dir)))
            .map(|&id| self.project(id))
            .filter(|p| self.is_registered(p))
    }

    /// Registered projects in discovery order.
    pub fn projects(&self) -> impl Iterator<Item = &LocalProject> + '_ {
        self.by_key.values().map(|&id| self.project(id))
    }

    /// Registered GA keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &ArtifactKey> + '_ {
        self.by_key.keys()
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Number of registered projects.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// The model mode every project was loaded in.
    pub fn mode(&self) -> ModelMode {
        self.mode
    }

    /// The local parent of `project`.
    pub fn local_parent(&self, project: &LocalProject) -> Option<&LocalProject> {
        project.local_parent_id().map(|id| self.project(id))
    }

    /// Local ancestors of `project`, nearest first.
    pub fn parents<'a>(&'a self, project: &'a LocalProject) -> impl Iterator<Item = &'a LocalProject> + 'a {
        std::iter::successors(self.local_parent(project), move |p| self.local_parent(p))
    }

    /// Aggregated submodules of `project`, in declaration order.
    pub fn modules<'a>(&'a self, project: &'a LocalProject) -> impl Iterator<Item = &'a LocalProject> + 'a {
        project.module_ids().iter().map(move |&id| self.project(id))
    }

    /// Problems skipped while loading with `warn_on_failed_workspace_modules`.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Ancestor directories without a descriptor that ended the upward walk.
    pub fn directory_breaks(&self) -> &[PathBuf] {
        &self.directory_breaks
    }

    /// Resolve a placeholder version against the overrides and the root
    /// descriptor's properties.
    pub fn resolve_version(&self, version: &str) -> Interpolated {
        let resolver = VersionResolver::new(self.overrides.as_ref());
        match self.root_project() {
            Some(root) => resolver
                .with_root_properties(root.model().properties())
                .resolve(version),
            None => resolver.resolve(version),
        }
    }

    /// Describe `project` for build tooling.
    pub fn module_view(&self, project: &LocalProject) -> WorkspaceModule {
        let layout = project.layout();
        WorkspaceModule {
            id: project.coordinate().clone(),
            packaging: project.packaging().to_string(),
            module_dir: project.dir().to_path_buf(),
            build_dir: project.output_dir().to_path_buf(),
            parent: self.local_parent(project).map(|p| p.key().clone()),
            main_sources: ArtifactSources::main(
                vec![SourceDir::new(project.sources_dir(), project.classes_dir())],
                layout.resources.clone(),
            ),
            test_sources: ArtifactSources::tests(
                vec![SourceDir::new(project.test_sources_dir(), project.test_classes_dir())],
                layout.test_resources.clone(),
            ),
        }
    }

    /// Find the local file backing an artifact.
    ///
    /// The project must be registered under the artifact's GA key and its
    /// version must equal the requested one, or the requested version's
    /// placeholders must resolve to it.
    pub fn find_artifact(&self, coords: &ArtifactCoords) -> Option<PathBuf> {
        let project = self.get(coords.key())?;
        if !self.version_matches(project, coords.version()) {
            tracing::trace!(artifact = %coords, found = project.version(), "version mismatch");
            return None;
        }

        if coords.kind() == POM_TYPE {
            return Some(project.pom_file().to_path_buf());
        }

        let packaged = project.output_dir().join(coords.file_name(project.version()));
        if packaged.exists() {
            return Some(packaged);
        }

        let dir = if coords.classifier() == TESTS_CLASSIFIER || coords.kind() == TEST_JAR_TYPE {
            project.test_classes_dir()
        } else if coords.classifier().is_empty() {
            project.classes_dir()
        } else {
            return None;
        };
        dir.exists().then(|| dir.to_path_buf())
    }

    fn version_matches(&self, project: &LocalProject, requested: &str) -> bool {
        if requested == project.version() || requested == project.raw_version() {
            return true;
        }
        has_placeholders(requested) && self.resolve_version(requested).value == project.version()
    }

    fn is_registered(&self, project: &LocalProject) -> bool {
        self.by_key.get(project.key()) == Some(&project.id())
    }
}
