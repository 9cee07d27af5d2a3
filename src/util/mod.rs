//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod overrides;

pub use config::WorkspaceConfig;
pub use context::GlobalContext;
pub use overrides::{EnvOverrides, LayeredOverrides, MapOverrides, OverrideSource};
