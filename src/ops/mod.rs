//! High-level operations.
//!
//! Entry points for loading single projects and whole workspaces.

pub(crate) mod discovery;
pub mod load;

pub use load::{current_workspace, load_project, load_workspace, load_workspaces, LoadedProject};
