//! Raw descriptor models.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::errors::Result;
use crate::core::model::pom::PomDocument;
use crate::core::model::profile::ProfileActivator;
use crate::core::model::{
    BuildSettings, Dependency, ModelBuilder, ModelMode, ParentRef, ProjectModel, DEFAULT_PACKAGING,
};
use crate::util::overrides::OverrideSource;
use crate::util::GlobalContext;

/// A descriptor as written, with its active profiles folded in.
#[derive(Debug, Clone)]
pub struct RawModel {
    doc: PomDocument,
    modules: Vec<String>,
    properties: IndexMap<String, String>,
    dependencies: Vec<Dependency>,
}

impl RawModel {
    /// Fold the profiles `activator` selects into the document.
    pub fn new(doc: PomDocument, activator: &ProfileActivator<'_>) -> Self {
        let basedir = doc.path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut modules = doc.modules.clone();
        let mut properties = doc.properties.clone();
        let mut dependencies = doc.dependencies.clone();

        for profile in activator.active(&doc.profiles, &basedir) {
            for module in &profile.modules {
                if !modules.contains(module) {
                    modules.push(module.clone());
                }
            }
            properties.extend(profile.properties.clone());
            dependencies.extend(profile.dependencies.iter().cloned());
        }

        RawModel {
            doc,
            modules,
            properties,
            dependencies,
        }
    }

    /// The underlying document.
    pub fn document(&self) -> &PomDocument {
        &self.doc
    }
}

impl ProjectModel for RawModel {
    fn pom_file(&self) -> &Path {
        &self.doc.path
    }

    fn group_id(&self) -> Option<&str> {
        self.doc.group_id.as_deref()
    }

    fn artifact_id(&self) -> &str {
        &self.doc.artifact_id
    }

    fn version(&self) -> Option<&str> {
        self.doc.version.as_deref()
    }

    fn packaging(&self) -> &str {
        self.doc.packaging.as_deref().unwrap_or(DEFAULT_PACKAGING)
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.doc.parent.as_ref()
    }

    fn modules(&self) -> &[String] {
        &self.modules
    }

    fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    fn build(&self) -> &BuildSettings {
        &self.doc.build
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn mode(&self) -> ModelMode {
        ModelMode::Raw
    }
}

/// Builds [`RawModel`]s.
#[derive(Debug)]
pub struct RawModelBuilder {
    overrides: Arc<dyn OverrideSource>,
    active_profiles: Vec<String>,
}

impl RawModelBuilder {
    pub fn new(ctx: &GlobalContext) -> Self {
        RawModelBuilder {
            overrides: ctx.shared_overrides(),
            active_profiles: ctx.config().model.active_profiles.clone(),
        }
    }

    /// Read one descriptor into a [`RawModel`] without erasing its type.
    pub fn read(&self, pom: &Path) -> Result<RawModel> {
        let doc = PomDocument::load(pom)?;
        let activator = ProfileActivator::new(self.overrides.as_ref(), &self.active_profiles);
        Ok(RawModel::new(doc, &activator))
    }
}

impl ModelBuilder for RawModelBuilder {
    fn mode(&self) -> ModelMode {
        ModelMode::Raw
    }

    fn build(&mut self, pom: &Path) -> Result<Arc<dyn ProjectModel>> {
        tracing::trace!(pom = %pom.display(), "reading raw model");
        Ok(Arc::new(self.read(pom)?))
    }
}

/// Path of the descriptor for a coordinate inside a local repository.
pub(crate) fn repository_pom(repo: &Path, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
    let mut path = repo.to_path_buf();
    path.extend(group_id.split('.'));
    path.push(artifact_id);
    path.push(version);
    path.push(format!("{artifact_id}-{version}.pom"));
    path
}
