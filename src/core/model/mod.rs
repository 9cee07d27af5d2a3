//! Descriptor models.
//!
//! A [`ProjectModel`] is one project's descriptor in one of two modes:
//!
//! - **raw**: exactly what the file declares (plus active profiles). Build
//!   settings and placeholders are resolved later by walking the local
//!   parent chain.
//! - **effective**: inheritance, profile activation and interpolation are
//!   already applied by the [`ModelBuilder`].
//!
//! The mode is chosen once per load via [`model_builder`].

pub mod effective;
pub mod pom;
pub mod profile;
pub mod raw;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::coordinate::{ArtifactKey, DEFAULT_TYPE};
use crate::core::descriptor::find_descriptor;
use crate::core::errors::Result;
use crate::resolver::interpolate::has_placeholders;
use crate::util::GlobalContext;

pub use effective::{EffectiveModel, EffectiveModelBuilder};
pub use pom::PomDocument;
pub use profile::{Activation, Profile, ProfileActivator};
pub use raw::{RawModel, RawModelBuilder};

/// Default parent location relative to the child's directory.
pub const DEFAULT_PARENT_PATH: &str = "../pom.xml";

/// Default packaging.
pub const DEFAULT_PACKAGING: &str = "jar";

/// Which flavor of model a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelMode {
    Raw,
    Effective,
}

/// The `<parent>` reference of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    /// `None` when absent; `Some("")` when explicitly empty.
    pub relative_path: Option<String>,
}

impl ParentRef {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::ga(&self.group_id, &self.artifact_id)
    }

    /// Descriptor the relative path points at, if it exists.
    ///
    /// An explicitly empty relative path never resolves locally.
    pub fn local_descriptor(&self, project_dir: &Path, alternates: &[String]) -> Result<Option<PathBuf>> {
        let relative = match self.relative_path.as_deref() {
            Some("") => return Ok(None),
            Some(path) => path,
            None => DEFAULT_PARENT_PATH,
        };

        let candidate = project_dir.join(relative);
        if candidate.is_file() {
            Ok(Some(candidate))
        } else if candidate.is_dir() {
            find_descriptor(&candidate, alternates)
        } else {
            Ok(None)
        }
    }

    /// Whether a loaded project with `key` and `version` is the referenced
    /// parent. Versions only matter when both sides are literal.
    pub fn matches(&self, key: &ArtifactKey, version: &str) -> bool {
        if key.group_id() != self.group_id || key.artifact_id() != self.artifact_id {
            return false;
        }
        match self.version.as_deref() {
            Some(wanted) if !has_placeholders(wanted) && !has_placeholders(version) => {
                wanted == version
            }
            _ => true,
        }
    }
}

/// One `<resource>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub directory: String,
    pub target_path: Option<String>,
}

/// Build settings as declared. `None` means "not declared here".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    pub directory: Option<String>,
    pub output_directory: Option<String>,
    pub test_output_directory: Option<String>,
    pub source_directory: Option<String>,
    pub test_source_directory: Option<String>,
    pub final_name: Option<String>,
    pub resources: Option<Vec<Resource>>,
    pub test_resources: Option<Vec<Resource>>,
}

impl BuildSettings {
    /// Fill every undeclared field from `parent`.
    pub fn inherit_from(&self, parent: &BuildSettings) -> BuildSettings {
        fn pick<T: Clone>(own: &Option<T>, parent: &Option<T>) -> Option<T> {
            own.clone().or_else(|| parent.clone())
        }

        BuildSettings {
            directory: pick(&self.directory, &parent.directory),
            output_directory: pick(&self.output_directory, &parent.output_directory),
            test_output_directory: pick(&self.test_output_directory, &parent.test_output_directory),
            source_directory: pick(&self.source_directory, &parent.source_directory),
            test_source_directory: pick(&self.test_source_directory, &parent.test_source_directory),
            // finalName defaults per project
            final_name: self.final_name.clone(),
            resources: pick(&self.resources, &parent.resources),
            test_resources: pick(&self.test_resources, &parent.test_resources),
        }
    }
}

/// One `<dependency>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub kind: String,
    pub classifier: Option<String>,
    pub scope: Option<String>,
}

impl Dependency {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::ga(&self.group_id, &self.artifact_id)
    }

    /// Whether this is a plain jar dependency without classifier.
    pub fn is_main_artifact(&self) -> bool {
        self.kind == DEFAULT_TYPE && self.classifier.is_none()
    }
}

/// Capabilities every descriptor model offers, regardless of mode.
pub trait ProjectModel: fmt::Debug + Send + Sync {
    /// The descriptor file this model was read from.
    fn pom_file(&self) -> &Path;

    /// Declared (raw) or inherited (effective) group id.
    fn group_id(&self) -> Option<&str>;

    fn artifact_id(&self) -> &str;

    /// Declared (raw) or inherited (effective) version.
    fn version(&self) -> Option<&str>;

    fn packaging(&self) -> &str;

    fn parent(&self) -> Option<&ParentRef>;

    /// Module entries, including those of active profiles.
    fn modules(&self) -> &[String];

    /// Properties, including those of active profiles.
    fn properties(&self) -> &IndexMap<String, String>;

    fn build(&self) -> &BuildSettings;

    fn dependencies(&self) -> &[Dependency];

    fn mode(&self) -> ModelMode;

    /// Directory containing the descriptor.
    fn project_dir(&self) -> &Path {
        self.pom_file().parent().unwrap_or_else(|| Path::new("."))
    }

    /// Group id, falling back to the parent reference.
    fn resolved_group_id(&self) -> Option<&str> {
        self.group_id()
            .or_else(|| self.parent().map(|p| p.group_id.as_str()))
    }

    /// Version, falling back to the parent reference.
    fn resolved_version(&self) -> Option<&str> {
        self.version()
            .or_else(|| self.parent().and_then(|p| p.version.as_deref()))
    }
}

/// Produces [`ProjectModel`]s from descriptor files.
pub trait ModelBuilder: Send {
    fn mode(&self) -> ModelMode;

    /// Read the descriptor at `pom`.
    fn build(&mut self, pom: &Path) -> Result<Arc<dyn ProjectModel>>;
}

/// Select the builder for this load from the configuration.
pub fn model_builder(ctx: &GlobalContext) -> Box<dyn ModelBuilder> {
    if ctx.config().model.effective_model_builder {
        Box::new(EffectiveModelBuilder::new(ctx))
    } else {
        Box::new(RawModelBuilder::new(ctx))
    }
}
