//! Resolution of placeholders, versions and workspace relationships.
//!
//! Everything here is pure: it works on already-loaded projects and never
//! touches the filesystem.

pub mod graph;
pub mod interpolate;
pub mod version;

pub use graph::{EdgeKind, WorkspaceGraph};
pub use interpolate::{has_placeholders, interpolate, Interpolated};
pub use version::VersionResolver;
