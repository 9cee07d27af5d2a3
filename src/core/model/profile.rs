//! Build profiles and their activation.
//!
//! Both model modes activate profiles the same way, so raw and effective
//! loads discover the same set of modules.

use std::path::Path;

use indexmap::IndexMap;

use crate::core::model::Dependency;
use crate::util::fs::resolve_against;
use crate::util::overrides::OverrideSource;

/// A `<profile>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub activation: Activation,
    pub modules: Vec<String>,
    pub properties: IndexMap<String, String>,
    pub dependencies: Vec<Dependency>,
}

/// The `<activation>` block of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    pub active_by_default: bool,
    pub property: Option<PropertyActivation>,
    pub file: Option<FileActivation>,
    /// A `<jdk>` or `<os>` condition was declared.
    pub unsupported: bool,
}

/// `<property><name>..</name><value>..</value></property>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyActivation {
    pub name: String,
    pub value: Option<String>,
}

/// `<file><exists>..</exists><missing>..</missing></file>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileActivation {
    pub exists: Option<String>,
    pub missing: Option<String>,
}

/// Decides which profiles of a descriptor are active.
#[derive(Debug, Clone, Copy)]
pub struct ProfileActivator<'a> {
    overrides: &'a dyn OverrideSource,
    requested: &'a [String],
}

impl<'a> ProfileActivator<'a> {
    /// `requested` lists profile ids to force on, or `!id` to force off.
    pub fn new(overrides: &'a dyn OverrideSource, requested: &'a [String]) -> Self {
        ProfileActivator {
            overrides,
            requested,
        }
    }

    /// Active profiles of one descriptor, in declaration order.
    pub fn active<'p>(&self, profiles: &'p [Profile], basedir: &Path) -> Vec<&'p Profile> {
        let candidates = profiles.iter().filter(|p| !self.is_deactivated(&p.id));

        let active: Vec<&Profile> = candidates
            .clone()
            .filter(|p| self.is_requested(&p.id) || self.matches(&p.activation, basedir))
            .collect();

        if !active.is_empty() {
            return active;
        }

        candidates.filter(|p| p.activation.active_by_default).collect()
    }

    fn is_requested(&self, id: &str) -> bool {
        self.requested.iter().any(|r| r == id)
    }

    fn is_deactivated(&self, id: &str) -> bool {
        self.requested
            .iter()
            .filter_map(|r| r.strip_prefix('!').or_else(|| r.strip_prefix('-')))
            .any(|r| r == id)
    }

    /// All declared conditions must hold, and at least one must be declared.
    fn matches(&self, activation: &Activation, basedir: &Path) -> bool {
        if activation.unsupported {
            return false;
        }
        if activation.property.is_none() && activation.file.is_none() {
            return false;
        }

        let property_ok = activation
            .property
            .as_ref()
            .map_or(true, |p| self.property_matches(p));
        let file_ok = activation
            .file
            .as_ref()
            .map_or(true, |f| file_matches(f, basedir));

        property_ok && file_ok
    }

    fn property_matches(&self, activation: &PropertyActivation) -> bool {
        if let Some(name) = activation.name.strip_prefix('!') {
            return self.overrides.get(name).is_none();
        }

        let actual = self.overrides.get(&activation.name);
        match activation.value.as_deref() {
            None => actual.is_some(),
            Some(expected) => match expected.strip_prefix('!') {
                Some(negated) => actual.as_deref() != Some(negated),
                None => actual.as_deref() == Some(expected),
            },
        }
    }
}

fn file_matches(activation: &FileActivation, basedir: &Path) -> bool {
    let exists = |value: &str| {
        let base = basedir.display().to_string();
        let expanded = value
            .replace("${project.basedir}", &base)
            .replace("${basedir}", &base);
        resolve_against(basedir, expanded).exists()
    };

    if let Some(path) = &activation.exists {
        if !exists(path) {
            return false;
        }
    }
    if let Some(path) = &activation.missing {
        if exists(path) {
            return false;
        }
    }
    true
}
