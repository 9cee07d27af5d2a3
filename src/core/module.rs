//! Workspace module view: a project's sources and outputs, as a build tool
//! wants to see them.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::core::coordinate::{ArtifactKey, Coordinate};

/// Classifier of the main artifact.
pub const MAIN_CLASSIFIER: &str = "";

/// Classifier of the test artifact.
pub const TESTS_CLASSIFIER: &str = "tests";

/// Source trees compiled or copied into one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir {
    roots: IndexSet<PathBuf>,
    output_dir: PathBuf,
}

impl SourceDir {
    pub fn new(root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let mut roots = IndexSet::new();
        roots.insert(root.into());
        SourceDir {
            roots,
            output_dir: output_dir.into(),
        }
    }

    /// Add another source tree root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(root.into());
        self
    }

    /// Source tree roots in insertion order.
    pub fn roots(&self) -> &IndexSet<PathBuf> {
        &self.roots
    }

    /// The first root.
    pub fn dir(&self) -> &Path {
        self.roots.first().map(PathBuf::as_path).unwrap_or_else(|| Path::new(""))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Sources and resources of one artifact (main or tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSources {
    classifier: String,
    source_dirs: Vec<SourceDir>,
    resource_dirs: Vec<SourceDir>,
}

impl ArtifactSources {
    pub fn main(source_dirs: Vec<SourceDir>, resource_dirs: Vec<SourceDir>) -> Self {
        ArtifactSources {
            classifier: MAIN_CLASSIFIER.to_string(),
            source_dirs,
            resource_dirs,
        }
    }

    pub fn tests(source_dirs: Vec<SourceDir>, resource_dirs: Vec<SourceDir>) -> Self {
        ArtifactSources {
            classifier: TESTS_CLASSIFIER.to_string(),
            source_dirs,
            resource_dirs,
        }
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn source_dirs(&self) -> &[SourceDir] {
        &self.source_dirs
    }

    pub fn resource_dirs(&self) -> &[SourceDir] {
        &self.resource_dirs
    }
}

/// A project described for build tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceModule {
    pub(crate) id: Coordinate,
    pub(crate) packaging: String,
    pub(crate) module_dir: PathBuf,
    pub(crate) build_dir: PathBuf,
    pub(crate) parent: Option<ArtifactKey>,
    pub(crate) main_sources: ArtifactSources,
    pub(crate) test_sources: ArtifactSources,
}

impl WorkspaceModule {
    pub fn id(&self) -> &Coordinate {
        &self.id
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// GA key of the local parent, if any.
    pub fn parent(&self) -> Option<&ArtifactKey> {
        self.parent.as_ref()
    }

    pub fn main_sources(&self) -> &ArtifactSources {
        &self.main_sources
    }

    pub fn test_sources(&self) -> &ArtifactSources {
        &self.test_sources
    }
}
