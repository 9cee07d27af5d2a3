//! Effective descriptor models.
//!
//! The effective builder applies parent inheritance, profile activation and
//! interpolation up front. Parents are looked up through the declared
//! relative path first and then in the configured local repository. A parent
//! found nowhere contributes only its coordinate.
//!
//! Inheritance is assembled on raw text; interpolation then runs once, in
//! the child's context, so `${project.basedir}` inherited from a parent
//! points at the child.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::coordinate::ArtifactKey;
use crate::core::errors::{Result, WorkspaceError};
use crate::core::model::raw::{repository_pom, RawModel, RawModelBuilder};
use crate::core::model::{
    BuildSettings, Dependency, ModelBuilder, ModelMode, ParentRef, ProjectModel, Resource,
};
use crate::resolver::interpolate::interpolate;
use crate::util::fs::{normalize_path, resolve_against};
use crate::util::overrides::OverrideSource;
use crate::util::GlobalContext;

/// Nested property references deeper than this stay unexpanded.
const MAX_EXPANSION_DEPTH: usize = 16;

/// A descriptor with inheritance and interpolation applied.
#[derive(Debug, Clone)]
pub struct EffectiveModel {
    pom: PathBuf,
    group_id: Option<String>,
    artifact_id: String,
    version: Option<String>,
    packaging: String,
    parent: Option<ParentRef>,
    modules: Vec<String>,
    properties: IndexMap<String, String>,
    build: BuildSettings,
    dependencies: Vec<Dependency>,
}

impl ProjectModel for EffectiveModel {
    fn pom_file(&self) -> &Path {
        &self.pom
    }

    fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn packaging(&self) -> &str {
        &self.packaging
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn modules(&self) -> &[String] {
        &self.modules
    }

    fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    fn build(&self) -> &BuildSettings {
        &self.build
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn mode(&self) -> ModelMode {
        ModelMode::Effective
    }
}

/// Inheritance applied, nothing interpolated yet.
#[derive(Debug)]
struct Assembly {
    raw: RawModel,
    group_id: Option<String>,
    version: Option<String>,
    properties: IndexMap<String, String>,
    build: BuildSettings,
}

/// Builds [`EffectiveModel`]s, caching assembled inheritance per descriptor.
#[derive(Debug)]
pub struct EffectiveModelBuilder {
    raw: RawModelBuilder,
    overrides: Arc<dyn OverrideSource>,
    alternates: Vec<String>,
    local_repository: Option<PathBuf>,
    offline: bool,
    assembled: HashMap<PathBuf, Arc<Assembly>>,
    in_progress: Vec<PathBuf>,
}

impl EffectiveModelBuilder {
    pub fn new(ctx: &GlobalContext) -> Self {
        let config = ctx.config();
        EffectiveModelBuilder {
            raw: RawModelBuilder::new(ctx),
            overrides: ctx.shared_overrides(),
            alternates: config.discovery.alternate_descriptors.clone(),
            local_repository: config.net.local_repository.clone(),
            offline: config.net.offline,
            assembled: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    fn assemble(&mut self, pom: &Path) -> Result<Arc<Assembly>> {
        let key = normalize_path(pom);
        if let Some(assembly) = self.assembled.get(&key) {
            return Ok(Arc::clone(assembly));
        }
        if let Some(pos) = self.in_progress.iter().position(|p| p == &key) {
            let mut cycle = self.in_progress[pos..].to_vec();
            cycle.push(key);
            return Err(WorkspaceError::CyclicModule { cycle });
        }

        self.in_progress.push(key.clone());
        let result = self.assemble_uncached(&key);
        self.in_progress.pop();

        let assembly = Arc::new(result?);
        self.assembled.insert(key, Arc::clone(&assembly));
        Ok(assembly)
    }

    fn assemble_uncached(&mut self, pom: &Path) -> Result<Assembly> {
        let raw = self.raw.read(pom)?;
        let parent = match raw.parent() {
            Some(reference) => {
                let reference = reference.clone();
                self.parent_assembly(raw.project_dir(), &reference)?
            }
            None => None,
        };

        let own = |value: Option<&str>| value.map(str::to_string);
        let assembly = match parent {
            Some(parent) => {
                let mut properties = parent.properties.clone();
                properties.extend(raw.properties().iter().map(|(k, v)| (k.clone(), v.clone())));
                Assembly {
                    group_id: own(raw.group_id()).or_else(|| parent.group_id.clone()),
                    version: own(raw.version()).or_else(|| parent.version.clone()),
                    properties,
                    build: raw.build().inherit_from(&parent.build),
                    raw,
                }
            }
            None => Assembly {
                group_id: own(raw.resolved_group_id()),
                version: own(raw.resolved_version()),
                properties: raw.properties().clone(),
                build: raw.build().clone(),
                raw,
            },
        };
        Ok(assembly)
    }

    fn parent_assembly(
        &mut self,
        project_dir: &Path,
        reference: &ParentRef,
    ) -> Result<Option<Arc<Assembly>>> {
        if let Some(pom) = reference.local_descriptor(project_dir, &self.alternates)? {
            match self.assemble(&pom) {
                Ok(parent) => {
                    let key = ArtifactKey::ga(
                        parent.group_id.as_deref().unwrap_or_default(),
                        parent.raw.artifact_id(),
                    );
                    if reference.matches(&key, parent.version.as_deref().unwrap_or_default()) {
                        return Ok(Some(parent));
                    }
                    debug!(
                        pom = %pom.display(),
                        parent = %reference.key(),
                        "descriptor at relative path is not the declared parent"
                    );
                }
                Err(e) if e.is_descriptor_problem() => {
                    debug!(pom = %pom.display(), "unreadable descriptor at parent path: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        if let (Some(repo), Some(version)) = (&self.local_repository, reference.version.as_deref()) {
            let pom = repository_pom(repo, &reference.group_id, &reference.artifact_id, version);
            if pom.is_file() {
                debug!(parent = %reference.key(), pom = %pom.display(), "parent from local repository");
                return self.assemble(&pom).map(Some);
            }
        }

        if self.offline {
            debug!(parent = %reference.key(), "parent unavailable offline; inheriting its coordinate only");
        } else {
            debug!(parent = %reference.key(), "parent not available locally; inheriting its coordinate only");
        }
        Ok(None)
    }

    fn interpolate(&self, assembly: &Assembly) -> EffectiveModel {
        let raw = &assembly.raw;
        let basedir = raw.project_dir().to_path_buf();
        let mut scope = Scope::new(self.overrides.as_ref(), &assembly.properties);

        let base = basedir.display().to_string();
        scope.define("project.basedir", &base);
        scope.define("basedir", &base);
        scope.define("project.artifactId", raw.artifact_id());
        scope.define("project.packaging", raw.packaging());

        let group_id = assembly.group_id.as_deref().map(|g| scope.expand(g));
        if let Some(group_id) = &group_id {
            scope.define("project.groupId", group_id);
        }
        let version = assembly.version.as_deref().map(|v| scope.expand(v));
        if let Some(version) = &version {
            scope.define("project.version", version);
        }

        let declared = &assembly.build;
        let path = |scope: &Scope<'_>, value: &str| {
            resolve_against(&basedir, scope.expand(value))
                .display()
                .to_string()
        };

        let directory = path(&scope, declared.directory.as_deref().unwrap_or("target"));
        scope.define("project.build.directory", &directory);

        let output_directory = declared.output_directory.as_deref().map(|v| path(&scope, v));
        let test_output_directory = declared.test_output_directory.as_deref().map(|v| path(&scope, v));
        let source_directory = declared.source_directory.as_deref().map(|v| path(&scope, v));
        let test_source_directory = declared.test_source_directory.as_deref().map(|v| path(&scope, v));
        scope.define(
            "project.build.outputDirectory",
            output_directory.clone().unwrap_or_else(|| format!("{directory}/classes")),
        );
        scope.define(
            "project.build.testOutputDirectory",
            test_output_directory
                .clone()
                .unwrap_or_else(|| format!("{directory}/test-classes")),
        );

        let resources = |list: &Option<Vec<Resource>>| {
            list.as_ref().map(|list| {
                list.iter()
                    .map(|r| Resource {
                        directory: scope.expand(&r.directory),
                        target_path: r.target_path.as_deref().map(|t| scope.expand(t)),
                    })
                    .collect()
            })
        };

        let build = BuildSettings {
            directory: declared.directory.as_ref().map(|_| directory.clone()),
            output_directory,
            test_output_directory,
            source_directory,
            test_source_directory,
            final_name: declared.final_name.as_deref().map(|f| scope.expand(f)),
            resources: resources(&declared.resources),
            test_resources: resources(&declared.test_resources),
        };

        let properties = assembly
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), scope.expand(v)))
            .collect();

        let dependencies = raw
            .dependencies()
            .iter()
            .map(|d| Dependency {
                group_id: scope.expand(&d.group_id),
                artifact_id: scope.expand(&d.artifact_id),
                version: d.version.as_deref().map(|v| scope.expand(v)),
                ..d.clone()
            })
            .collect();

        EffectiveModel {
            pom: raw.pom_file().to_path_buf(),
            group_id,
            artifact_id: raw.artifact_id().to_string(),
            version,
            packaging: raw.packaging().to_string(),
            parent: raw.parent().cloned(),
            modules: raw.modules().to_vec(),
            properties,
            build,
            dependencies,
        }
    }
}

impl ModelBuilder for EffectiveModelBuilder {
    fn mode(&self) -> ModelMode {
        ModelMode::Effective
    }

    fn build(&mut self, pom: &Path) -> Result<Arc<dyn ProjectModel>> {
        tracing::trace!(pom = %pom.display(), "building effective model");
        let assembly = self.assemble(pom)?;
        Ok(Arc::new(self.interpolate(&assembly)))
    }
}

/// Interpolation context of one project: overrides, then properties, then
/// `project.*` builtins.
struct Scope<'a> {
    overrides: &'a dyn OverrideSource,
    properties: &'a IndexMap<String, String>,
    builtins: HashMap<&'static str, String>,
}

impl<'a> Scope<'a> {
    fn new(overrides: &'a dyn OverrideSource, properties: &'a IndexMap<String, String>) -> Self {
        Scope {
            overrides,
            properties,
            builtins: HashMap::new(),
        }
    }

    fn define(&mut self, name: &'static str, value: impl Into<String>) {
        self.builtins.insert(name, value.into());
    }

    fn expand(&self, value: &str) -> String {
        self.expand_at(value, 0)
    }

    fn expand_at(&self, value: &str, depth: usize) -> String {
        interpolate(value, |name| self.lookup(name, depth)).value
    }

    fn lookup(&self, name: &str, depth: usize) -> Option<String> {
        if depth >= MAX_EXPANSION_DEPTH {
            return None;
        }
        let value = self
            .overrides
            .get(name)
            .or_else(|| self.properties.get(name).cloned())
            .or_else(|| self.builtins.get(name).cloned())?;
        Some(self.expand_at(&value, depth + 1))
    }
}
