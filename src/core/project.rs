//! Local project - one descriptor on disk, with its resolved coordinate and
//! build directories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::coordinate::{ArtifactKey, Coordinate};
use crate::core::errors::{Result, WorkspaceError};
use crate::core::layout::BuildLayout;
use crate::core::model::ProjectModel;
use crate::resolver::interpolate::has_placeholders;
use crate::util::overrides::OverrideSource;

/// Index of a project inside its workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub(crate) usize);

impl ProjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A project loaded from a local descriptor.
#[derive(Debug, Clone)]
pub struct LocalProject {
    id: ProjectId,
    dir: PathBuf,
    pom: PathBuf,
    coordinate: Coordinate,
    raw_version: String,
    model: Arc<dyn ProjectModel>,
    parent: Option<ProjectId>,
    modules: Vec<ProjectId>,
    layout: BuildLayout,
}

impl LocalProject {
    /// Create a project from its model.
    ///
    /// Group and version fall back to the parent reference. The version keeps
    /// its placeholders until [`set_version`](Self::set_version) is called.
    pub(crate) fn new(
        id: ProjectId,
        pom: PathBuf,
        model: Arc<dyn ProjectModel>,
        overrides: &dyn OverrideSource,
    ) -> Result<Self> {
        let group_id = model
            .resolved_group_id()
            .ok_or_else(|| WorkspaceError::parse(&pom, "missing <groupId> and no <parent> to inherit it from"))?
            .to_string();
        let raw_version = model
            .resolved_version()
            .ok_or_else(|| WorkspaceError::parse(&pom, "missing <version> and no <parent> to inherit it from"))?
            .to_string();

        let dir = pom
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let layout = BuildLayout::compute(&dir, &[model.as_ref()], overrides);
        let coordinate = Coordinate::new(group_id, model.artifact_id(), raw_version.clone());

        Ok(LocalProject {
            id,
            dir,
            pom,
            coordinate,
            raw_version,
            model,
            parent: None,
            modules: Vec::new(),
            layout,
        })
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// The project directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The descriptor file used.
    pub fn pom_file(&self) -> &Path {
        &self.pom
    }

    pub fn key(&self) -> &ArtifactKey {
        self.coordinate.key()
    }

    /// The coordinate with the resolved version.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn group_id(&self) -> &str {
        self.coordinate.group_id()
    }

    pub fn artifact_id(&self) -> &str {
        self.coordinate.artifact_id()
    }

    /// The resolved version. May still hold placeholders nothing could
    /// resolve.
    pub fn version(&self) -> &str {
        self.coordinate.version()
    }

    /// The version as declared (or inherited from the parent reference).
    pub fn raw_version(&self) -> &str {
        &self.raw_version
    }

    /// Whether the resolved version still holds placeholders.
    pub fn has_unresolved_version(&self) -> bool {
        has_placeholders(self.version())
    }

    pub fn model(&self) -> &dyn ProjectModel {
        self.model.as_ref()
    }

    pub fn packaging(&self) -> &str {
        self.model.packaging()
    }

    /// Id of the local parent, once linked.
    pub fn local_parent_id(&self) -> Option<ProjectId> {
        self.parent
    }

    /// Ids of the aggregated submodules, in declaration order.
    pub fn module_ids(&self) -> &[ProjectId] {
        &self.modules
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// The build output directory (`target`).
    pub fn output_dir(&self) -> &Path {
        &self.layout.output_dir
    }

    pub fn classes_dir(&self) -> &Path {
        &self.layout.classes_dir
    }

    pub fn test_classes_dir(&self) -> &Path {
        &self.layout.test_classes_dir
    }

    pub fn sources_dir(&self) -> &Path {
        &self.layout.sources_dir
    }

    pub fn test_sources_dir(&self) -> &Path {
        &self.layout.test_sources_dir
    }

    pub(crate) fn set_parent(&mut self, parent: ProjectId) {
        debug_assert!(self.parent.is_none(), "local parent is set once");
        self.parent.get_or_insert(parent);
    }

    pub(crate) fn push_module(&mut self, module: ProjectId) {
        if !self.modules.contains(&module) {
            self.modules.push(module);
        }
    }

    pub(crate) fn set_version(&mut self, version: String) {
        self.coordinate = Coordinate::from_key(self.coordinate.key().clone(), version);
    }

    pub(crate) fn set_layout(&mut self, layout: BuildLayout) {
        self.layout = layout;
    }
}

impl fmt::Display for LocalProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.coordinate, self.dir.display())
    }
}
