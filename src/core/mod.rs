//! Core data structures for berth.
//!
//! This module contains the foundational types of a local workspace:
//! - Coordinates and GA keys
//! - Descriptor lookup and descriptor models (raw and effective)
//! - Local projects, their build layout and module view
//! - The workspace registry

pub mod coordinate;
pub mod descriptor;
pub mod errors;
pub mod layout;
pub mod model;
pub mod module;
pub mod project;
pub mod workspace;

pub use coordinate::{ArtifactCoords, ArtifactKey, Coordinate};
pub use descriptor::{find_descriptor, locate_descriptor, POM_XML};
pub use errors::{Result, WorkspaceError};
pub use layout::BuildLayout;
pub use model::{ModelBuilder, ModelMode, ProjectModel};
pub use module::{ArtifactSources, SourceDir, WorkspaceModule};
pub use project::{LocalProject, ProjectId};
pub use workspace::LocalWorkspace;
