//! Loading projects and workspaces.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::core::descriptor::locate_descriptor;
use crate::core::errors::Result;
use crate::core::model::model_builder;
use crate::core::project::{LocalProject, ProjectId};
use crate::core::workspace::LocalWorkspace;
use crate::ops::discovery::Discovery;
use crate::resolver::version::VersionResolver;
use crate::util::fs::{absolutize, normalize_path};
use crate::util::GlobalContext;

/// Result of [`load_project`].
#[derive(Debug, Clone)]
pub enum LoadedProject {
    /// The project on its own: no workspace, no local parent.
    Detached(Box<LocalProject>),

    /// The project needed its workspace root to resolve its version.
    Attached(LocalWorkspace),
}

impl LoadedProject {
    /// The loaded project.
    pub fn project(&self) -> &LocalProject {
        match self {
            LoadedProject::Detached(project) => project,
            LoadedProject::Attached(ws) => ws.current_project(),
        }
    }

    /// The workspace, when one had to be loaded.
    pub fn workspace(&self) -> Option<&LocalWorkspace> {
        match self {
            LoadedProject::Detached(_) => None,
            LoadedProject::Attached(ws) => Some(ws),
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, LoadedProject::Attached(_))
    }

    pub fn into_workspace(self) -> Option<LocalWorkspace> {
        match self {
            LoadedProject::Detached(_) => None,
            LoadedProject::Attached(ws) => Some(ws),
        }
    }
}

/// Load the project governing `path`.
///
/// `path` may be a project directory, a descriptor file, or any directory
/// below a project such as `target/classes`. The project comes back detached
/// unless its version has placeholders that the overrides alone cannot
/// resolve; then the whole workspace is loaded to consult the root
/// descriptor.
pub fn load_project(path: &Path, ctx: &GlobalContext) -> Result<LoadedProject> {
    let start = absolutize(ctx.cwd(), path);
    let pom = normalize_path(&locate_descriptor(&start, ctx.alternate_descriptors())?);

    let mut builder = model_builder(ctx);
    let model = builder.build(&pom)?;
    let mut project = LocalProject::new(ProjectId(0), pom, model, ctx.overrides())?;

    let resolved = VersionResolver::new(ctx.overrides()).resolve(project.raw_version());
    if !resolved.is_resolved() {
        debug!(
            project = %project,
            unresolved = ?resolved.unresolved,
            "version needs the workspace root; loading the workspace"
        );
        return load_workspace(&start, ctx).map(LoadedProject::Attached);
    }
    project.set_version(resolved.value);

    Ok(LoadedProject::Detached(Box::new(project)))
}

/// Discover the workspace around `path`.
///
/// The returned workspace's [`current_project`](LocalWorkspace::current_project)
/// is the project governing `path`.
pub fn load_workspace(path: &Path, ctx: &GlobalContext) -> Result<LocalWorkspace> {
    let start = absolutize(ctx.cwd(), path);
    Discovery::new(ctx).run(&start)
}

/// Discover the workspace around the context's current project directory.
pub fn current_workspace(ctx: &GlobalContext) -> Result<LocalWorkspace> {
    load_workspace(&ctx.current_project_dir(), ctx)
}

/// Discover several independent workspaces in parallel.
///
/// Results come back in input order.
pub fn load_workspaces(paths: &[PathBuf], ctx: &GlobalContext) -> Vec<Result<LocalWorkspace>> {
    paths
        .par_iter()
        .map(|path| load_workspace(path, ctx))
        .collect()
}
