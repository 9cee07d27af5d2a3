//! Resolution of placeholder versions.
//!
//! A version such as `${revision}${sha1}${changelist}` is resolved token by
//! token: first from the override source, then from the properties of the
//! workspace root descriptor. Intermediate ancestors are never consulted.

use indexmap::IndexMap;

use crate::core::errors::{Result, WorkspaceError};
use crate::resolver::interpolate::{has_placeholders, interpolate, Interpolated};
use crate::util::overrides::OverrideSource;

/// Resolves placeholder versions against overrides and root properties.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    overrides: &'a dyn OverrideSource,
    root_properties: Option<&'a IndexMap<String, String>>,
}

impl<'a> VersionResolver<'a> {
    /// A resolver that only knows the overrides.
    pub fn new(overrides: &'a dyn OverrideSource) -> Self {
        VersionResolver {
            overrides,
            root_properties: None,
        }
    }

    /// Also consult the root descriptor's properties.
    pub fn with_root_properties(mut self, properties: &'a IndexMap<String, String>) -> Self {
        self.root_properties = Some(properties);
        self
    }

    /// Resolve as many tokens as possible.
    pub fn resolve(&self, version: &str) -> Interpolated {
        if !has_placeholders(version) {
            return Interpolated {
                value: version.to_string(),
                unresolved: Vec::new(),
            };
        }
        interpolate(version, |name| {
            self.overrides
                .get(name)
                .or_else(|| self.root_properties.and_then(|p| p.get(name).cloned()))
        })
    }

    /// Resolve every token or fail with `UnresolvedVersionPlaceholder`.
    pub fn resolve_strict(&self, version: &str, project: &str) -> Result<String> {
        let resolved = self.resolve(version);
        if resolved.is_resolved() {
            Ok(resolved.value)
        } else {
            Err(WorkspaceError::UnresolvedVersionPlaceholder {
                project: project.to_string(),
                version: version.to_string(),
                placeholders: resolved.unresolved,
            })
        }
    }
}
