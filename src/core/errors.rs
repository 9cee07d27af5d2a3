//! Workspace error types and diagnostics.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout discovery.
pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;

/// Error raised while locating, reading or linking workspace projects.
#[derive(Debug, Error, Diagnostic)]
pub enum WorkspaceError {
    #[error("no project descriptor found in {} or any of its parent directories", .dir.display())]
    #[diagnostic(
        code(berth::descriptor_not_found),
        help("point the loader at a directory inside a project that has a pom.xml")
    )]
    DescriptorNotFound { dir: PathBuf },

    #[error("multiple project descriptors found in {}: {}", .dir.display(), display_paths(.candidates))]
    #[diagnostic(
        code(berth::ambiguous_descriptor),
        help("pass the descriptor file explicitly or keep a single descriptor per directory")
    )]
    AmbiguousDescriptor {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    #[diagnostic(code(berth::descriptor_parse))]
    DescriptorParse { path: PathBuf, message: String },

    #[error("module cycle detected: {}", display_paths(.cycle))]
    #[diagnostic(
        code(berth::cyclic_module),
        help("a module must not declare itself or one of its aggregators as a submodule")
    )]
    CyclicModule { cycle: Vec<PathBuf> },

    #[error("dependency cycle detected in the workspace involving `{project}`")]
    #[diagnostic(code(berth::cyclic_dependency))]
    CyclicDependency { project: String },

    #[error("version `{version}` of `{project}` has unresolved placeholders: {}", .placeholders.join(", "))]
    #[diagnostic(
        code(berth::unresolved_version),
        help("define the properties in the workspace root descriptor or pass them as overrides")
    )]
    UnresolvedVersionPlaceholder {
        project: String,
        version: String,
        placeholders: Vec<String>,
    },

    #[error("I/O error on {}", .path.display())]
    #[diagnostic(code(berth::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    /// Build a [`WorkspaceError::DescriptorParse`] for `path`.
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        WorkspaceError::DescriptorParse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Build a [`WorkspaceError::Io`] for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        WorkspaceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error describes a broken descriptor rather than a broken
    /// workspace structure. Only these may be downgraded to warnings for
    /// discovered modules.
    pub fn is_descriptor_problem(&self) -> bool {
        matches!(
            self,
            WorkspaceError::DescriptorParse { .. }
                | WorkspaceError::AmbiguousDescriptor { .. }
                | WorkspaceError::Io { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
