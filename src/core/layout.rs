//! Build directory conventions.
//!
//! Every directory has a conventional default that a descriptor may
//! override through its `<build>` section:
//!
//! | setting                  | default                     |
//! |--------------------------|-----------------------------|
//! | `directory`              | `<dir>/target`              |
//! | `outputDirectory`        | `<output>/classes`          |
//! | `testOutputDirectory`    | `<output>/test-classes`     |
//! | `sourceDirectory`        | `<dir>/src/main/java`       |
//! | `testSourceDirectory`    | `<dir>/src/test/java`       |
//!
//! Values may reference `${project.basedir}`, `${basedir}`,
//! `${project.build.directory}`, properties and overrides; relative values
//! resolve against the project directory.

use std::path::{Path, PathBuf};

use crate::core::model::{ProjectModel, Resource};
use crate::core::module::SourceDir;
use crate::resolver::interpolate::interpolate;
use crate::util::fs::resolve_against;
use crate::util::overrides::OverrideSource;

pub const DEFAULT_BUILD_DIR: &str = "target";
pub const DEFAULT_CLASSES_DIR: &str = "classes";
pub const DEFAULT_TEST_CLASSES_DIR: &str = "test-classes";
pub const DEFAULT_SOURCES_DIR: &str = "src/main/java";
pub const DEFAULT_TEST_SOURCES_DIR: &str = "src/test/java";
pub const DEFAULT_RESOURCES_DIR: &str = "src/main/resources";
pub const DEFAULT_TEST_RESOURCES_DIR: &str = "src/test/resources";

/// Resolved build directories of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub output_dir: PathBuf,
    pub classes_dir: PathBuf,
    pub test_classes_dir: PathBuf,
    pub sources_dir: PathBuf,
    pub test_sources_dir: PathBuf,
    pub resources: Vec<SourceDir>,
    pub test_resources: Vec<SourceDir>,
}

impl BuildLayout {
    /// Compute the layout of the project in `dir`.
    ///
    /// `chain` starts with the project's own model, followed by its local
    /// ancestors nearest first. Each setting comes from the nearest model
    /// declaring it; for effective models the chain is just the project.
    pub fn compute(dir: &Path, chain: &[&dyn ProjectModel], overrides: &dyn OverrideSource) -> Self {
        let mut scope = LayoutScope {
            dir,
            chain,
            overrides,
            builtins: Vec::new(),
        };
        let base = dir.display().to_string();
        scope.define("project.basedir", &base);
        scope.define("basedir", &base);

        let output_dir = scope.path(nearest(chain, |m| m.build().directory.as_deref()), DEFAULT_BUILD_DIR);
        scope.define("project.build.directory", output_dir.display().to_string());

        let classes_dir = nearest(chain, |m| m.build().output_directory.as_deref())
            .map(|v| scope.resolve(v))
            .unwrap_or_else(|| output_dir.join(DEFAULT_CLASSES_DIR));
        let test_classes_dir = nearest(chain, |m| m.build().test_output_directory.as_deref())
            .map(|v| scope.resolve(v))
            .unwrap_or_else(|| output_dir.join(DEFAULT_TEST_CLASSES_DIR));
        scope.define("project.build.outputDirectory", classes_dir.display().to_string());
        scope.define("project.build.testOutputDirectory", test_classes_dir.display().to_string());

        let sources_dir = scope.path(
            nearest(chain, |m| m.build().source_directory.as_deref()),
            DEFAULT_SOURCES_DIR,
        );
        let test_sources_dir = scope.path(
            nearest(chain, |m| m.build().test_source_directory.as_deref()),
            DEFAULT_TEST_SOURCES_DIR,
        );

        let resources = scope.resources(
            nearest(chain, |m| m.build().resources.as_deref()),
            DEFAULT_RESOURCES_DIR,
            &classes_dir,
        );
        let test_resources = scope.resources(
            nearest(chain, |m| m.build().test_resources.as_deref()),
            DEFAULT_TEST_RESOURCES_DIR,
            &test_classes_dir,
        );

        BuildLayout {
            output_dir,
            classes_dir,
            test_classes_dir,
            sources_dir,
            test_sources_dir,
            resources,
            test_resources,
        }
    }
}

fn nearest<'m, T: ?Sized>(
    chain: &[&'m dyn ProjectModel],
    field: impl Fn(&'m dyn ProjectModel) -> Option<&'m T>,
) -> Option<&'m T> {
    chain.iter().find_map(|m| field(*m))
}

struct LayoutScope<'a> {
    dir: &'a Path,
    chain: &'a [&'a dyn ProjectModel],
    overrides: &'a dyn OverrideSource,
    builtins: Vec<(&'static str, String)>,
}

impl LayoutScope<'_> {
    fn define(&mut self, name: &'static str, value: impl Into<String>) {
        self.builtins.push((name, value.into()));
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .or_else(|| self.chain.iter().find_map(|m| m.properties().get(name).cloned()))
            .or_else(|| {
                self.builtins
                    .iter()
                    .rev()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| v.clone())
            })
    }

    fn expand(&self, value: &str) -> String {
        interpolate(value, |name| self.lookup(name)).value
    }

    fn resolve(&self, value: &str) -> PathBuf {
        resolve_against(self.dir, self.expand(value))
    }

    fn path(&self, declared: Option<&str>, default: &str) -> PathBuf {
        self.resolve(declared.unwrap_or(default))
    }

    /// Default entry first unless the base resource directory is relocated;
    /// declared entries follow in order.
    ///
    /// A declared resource without `targetPath` counts as relocating the base
    /// directory, since it lands where the default entry would. A resource
    /// that only sets `targetPath` keeps the default entry.
    fn resources(&self, declared: Option<&[Resource]>, default_dir: &str, classes_dir: &Path) -> Vec<SourceDir> {
        let declared = declared.unwrap_or_default();
        let relocated = declared.iter().any(|r| r.target_path.is_none());

        let mut dirs = Vec::with_capacity(declared.len() + 1);
        if !relocated {
            dirs.push(SourceDir::new(self.dir.join(default_dir), classes_dir));
        }
        for resource in declared {
            let output = match &resource.target_path {
                Some(target) => resolve_against(classes_dir, self.expand(target)),
                None => classes_dir.to_path_buf(),
            };
            dirs.push(SourceDir::new(self.resolve(&resource.directory), output));
        }
        dirs
    }
}
