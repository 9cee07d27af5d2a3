//! berth - discovery of multi-module Maven-style local workspaces
//!
//! Given any directory inside a project, this crate finds the project's
//! descriptor, walks up to the workspace root, expands declared modules,
//! links local parents and resolves CI-friendly placeholder versions and
//! build directories. The result is an immutable [`LocalWorkspace`] that
//! answers "which local project (and which output directory) backs this
//! artifact?".

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use core::{
    coordinate::{ArtifactCoords, ArtifactKey, Coordinate},
    errors::{Result, WorkspaceError},
    module::WorkspaceModule,
    project::{LocalProject, ProjectId},
    workspace::LocalWorkspace,
};

pub use ops::{current_workspace, load_project, load_workspace, load_workspaces, LoadedProject};
pub use resolver::WorkspaceGraph;
pub use util::{GlobalContext, MapOverrides, OverrideSource, WorkspaceConfig};
