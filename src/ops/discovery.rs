//! Workspace discovery.
//!
//! Starting from one project, discovery:
//!
//! 1. loads and registers the start project, so its GA key always wins;
//! 2. walks filesystem ancestors while each has a descriptor, stopping at
//!    the root override or at the first directory break;
//! 3. expands declared modules depth-first from the override root, the
//!    ancestors (top-down) and the start project;
//! 4. links local parents and expands the parents found that way, until
//!    nothing changes;
//! 5. resolves placeholder versions and build directories against the
//!    topmost project of the ancestor and parent chain.
//!
//! Each directory is loaded at most once.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::coordinate::ArtifactKey;
use crate::core::descriptor::{find_descriptor, locate_descriptor, resolve_module};
use crate::core::errors::{Result, WorkspaceError};
use crate::core::layout::BuildLayout;
use crate::core::model::{model_builder, ModelBuilder, ModelMode, ProjectModel};
use crate::core::project::{LocalProject, ProjectId};
use crate::core::workspace::LocalWorkspace;
use crate::resolver::version::VersionResolver;
use crate::util::fs::normalize_path;
use crate::util::GlobalContext;

/// Mutable state of one `load_workspace` call.
pub(crate) struct Discovery<'a> {
    ctx: &'a GlobalContext,
    builder: Box<dyn ModelBuilder>,
    projects: Vec<LocalProject>,
    by_dir: HashMap<PathBuf, ProjectId>,
    by_key: IndexMap<ArtifactKey, ProjectId>,
    expanded: HashSet<ProjectId>,
    module_stack: Vec<ProjectId>,
    warnings: Vec<String>,
    directory_breaks: Vec<PathBuf>,
}

impl<'a> Discovery<'a> {
    pub(crate) fn new(ctx: &'a GlobalContext) -> Self {
        Discovery {
            ctx,
            builder: model_builder(ctx),
            projects: Vec::new(),
            by_dir: HashMap::new(),
            by_key: IndexMap::new(),
            expanded: HashSet::new(),
            module_stack: Vec::new(),
            warnings: Vec::new(),
            directory_breaks: Vec::new(),
        }
    }

    /// Discover the workspace around `start`.
    pub(crate) fn run(mut self, start: &Path) -> Result<LocalWorkspace> {
        let start_pom = locate_descriptor(start, self.alternates())?;
        let current = self.load(&start_pom)?;
        self.register(current);
        debug!(project = %self.projects[current.0], "loaded start project");

        let override_root = self.ctx.root_project_dir();
        let ancestors = self.walk_up(current, override_root.as_deref())?;

        let mut seeds = Vec::new();
        if let Some(root) = &override_root {
            match find_descriptor(root, self.alternates()) {
                Ok(Some(pom)) => match self.load(&pom) {
                    Ok(id) => {
                        self.register(id);
                        seeds.push(id);
                    }
                    Err(e) => self.recover(root, e)?,
                },
                Ok(None) => debug!(root = %root.display(), "root override has no descriptor"),
                Err(e) => self.recover(root, e)?,
            }
        }
        seeds.extend(ancestors.iter().rev().copied());
        seeds.push(current);

        for seed in seeds {
            if self.is_registered(seed) {
                self.expand(seed)?;
            }
        }

        self.link_and_expand_parents()?;

        let root_dir = match override_root {
            Some(root) => root,
            None => {
                let top = ancestors.last().copied().unwrap_or(current);
                let topmost = std::iter::successors(Some(top), |&id| self.projects[id.0].local_parent_id())
                    .last()
                    .unwrap_or(top);
                self.projects[topmost.0].dir().to_path_buf()
            }
        };

        self.finish(current, root_dir)
    }

    fn alternates(&self) -> &'a [String] {
        self.ctx.alternate_descriptors()
    }

    /// Load a descriptor, or return the project already loaded from its
    /// directory.
    fn load(&mut self, pom: &Path) -> Result<ProjectId> {
        let pom = normalize_path(pom);
        let dir = pom
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if let Some(&id) = self.by_dir.get(&dir) {
            return Ok(id);
        }

        trace!(pom = %pom.display(), "loading descriptor");
        let model = self.builder.build(&pom)?;
        let id = ProjectId(self.projects.len());
        let project = LocalProject::new(id, pom, model, self.ctx.overrides())?;
        self.by_dir.insert(dir, id);
        self.projects.push(project);
        Ok(id)
    }

    /// Register `id` under its GA key unless another project holds it.
    fn register(&mut self, id: ProjectId) -> bool {
        let key = self.projects[id.0].key().clone();
        match self.by_key.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(id);
                true
            }
            Entry::Occupied(entry) => {
                let holder = *entry.get();
                if holder != id {
                    debug!(
                        ignored = %self.projects[id.0],
                        kept = %self.projects[holder.0],
                        "duplicate project key"
                    );
                }
                holder == id
            }
        }
    }

    fn is_registered(&self, id: ProjectId) -> bool {
        self.by_key.get(self.projects[id.0].key()) == Some(&id)
    }

    /// Downgrade a descriptor problem to a warning when configured to.
    fn recover(&mut self, location: &Path, err: WorkspaceError) -> Result<()> {
        if self.ctx.config().discovery.warn_on_failed_workspace_modules && err.is_descriptor_problem() {
            warn!(location = %location.display(), "skipping workspace module: {err}");
            self.warnings
                .push(format!("{}: {err}", location.display()));
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Load ancestors while each has a descriptor. Returns them nearest
    /// first.
    fn walk_up(&mut self, current: ProjectId, stop_at: Option<&Path>) -> Result<Vec<ProjectId>> {
        let mut ancestors = Vec::new();
        let mut dir = self.projects[current.0].dir().to_path_buf();

        loop {
            if stop_at == Some(dir.as_path()) {
                trace!(dir = %dir.display(), "reached root override");
                break;
            }
            let Some(parent_dir) = dir.parent().map(Path::to_path_buf) else {
                break;
            };

            let pom = match find_descriptor(&parent_dir, self.alternates()) {
                Ok(Some(pom)) => pom,
                Ok(None) => {
                    debug!(dir = %parent_dir.display(), "directory break");
                    self.directory_breaks.push(parent_dir);
                    break;
                }
                Err(e) => {
                    self.recover(&parent_dir, e)?;
                    break;
                }
            };

            match self.load(&pom) {
                Ok(id) => {
                    self.register(id);
                    ancestors.push(id);
                    dir = parent_dir;
                }
                Err(e) => {
                    self.recover(&pom, e)?;
                    break;
                }
            }
        }

        Ok(ancestors)
    }

    /// Expand the declared modules of `id`, depth-first.
    fn expand(&mut self, id: ProjectId) -> Result<()> {
        if let Some(pos) = self.module_stack.iter().position(|&p| p == id) {
            let mut cycle: Vec<PathBuf> = self.module_stack[pos..]
                .iter()
                .map(|p| self.projects[p.0].dir().to_path_buf())
                .collect();
            cycle.push(self.projects[id.0].dir().to_path_buf());
            return Err(WorkspaceError::CyclicModule { cycle });
        }
        if !self.expanded.insert(id) {
            return Ok(());
        }

        self.module_stack.push(id);
        let dir = self.projects[id.0].dir().to_path_buf();
        let modules = self.projects[id.0].model().modules().to_vec();

        for module in modules {
            let pom = match resolve_module(&dir, &module, self.alternates()) {
                Ok(Some(pom)) => pom,
                Ok(None) => {
                    debug!(aggregator = %dir.display(), module, "module not found, skipping");
                    continue;
                }
                Err(e) => {
                    self.recover(&dir.join(&module), e)?;
                    continue;
                }
            };

            let child = match self.load(&pom) {
                Ok(child) => child,
                Err(e) => {
                    self.recover(&pom, e)?;
                    continue;
                }
            };

            if !self.register(child) {
                continue;
            }
            self.projects[id.0].push_module(child);
            self.expand(child)?;
        }

        self.module_stack.pop();
        Ok(())
    }

    /// Link local parents, then expand the parents found that way, until no
    /// new parent turns up.
    fn link_and_expand_parents(&mut self) -> Result<()> {
        loop {
            self.link_parents()?;

            let pending: Vec<ProjectId> = self
                .projects
                .iter()
                .filter(|p| self.is_registered(p.id()))
                .filter_map(|p| p.local_parent_id())
                .filter(|parent| !self.expanded.contains(parent))
                .collect();
            if pending.is_empty() {
                return Ok(());
            }

            for parent in pending {
                trace!(parent = %self.projects[parent.0], "expanding parent reached through its child");
                self.expand(parent)?;
            }
        }
    }

    /// Link local parents of every registered project, loading parents that
    /// were not discovered yet.
    fn link_parents(&mut self) -> Result<()> {
        let mut next = 0;
        while next < self.projects.len() {
            let id = ProjectId(next);
            next += 1;
            if self.is_registered(id) && self.projects[id.0].local_parent_id().is_none() {
                self.link_parent(id)?;
            }
        }
        Ok(())
    }

    fn link_parent(&mut self, id: ProjectId) -> Result<()> {
        let project = &self.projects[id.0];
        let Some(reference) = project.model().parent().cloned() else {
            return Ok(());
        };
        let dir = project.dir().to_path_buf();

        let pom = match reference.local_descriptor(&dir, self.alternates()) {
            Ok(Some(pom)) => pom,
            Ok(None) => {
                trace!(project = %self.projects[id.0], parent = %reference.key(), "parent is not local");
                return Ok(());
            }
            Err(e) => return self.recover(&dir, e),
        };

        let parent = match self.load(&pom) {
            Ok(parent) => parent,
            Err(e) => return self.recover(&pom, e),
        };

        let candidate = &self.projects[parent.0];
        if !reference.matches(candidate.key(), candidate.raw_version()) {
            debug!(
                project = %self.projects[id.0],
                found = %candidate,
                "descriptor at parent path is not the declared parent"
            );
            return Ok(());
        }

        let mut chain = vec![self.projects[id.0].dir().to_path_buf()];
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            chain.push(self.projects[ancestor.0].dir().to_path_buf());
            if ancestor == id {
                return Err(WorkspaceError::CyclicModule { cycle: chain });
            }
            cursor = self.projects[ancestor.0].local_parent_id();
        }

        if !self.register(parent) {
            debug!(
                project = %self.projects[id.0],
                parent = %self.projects[parent.0],
                "parent key is held by another project, not linking"
            );
            return Ok(());
        }
        self.projects[id.0].set_parent(parent);
        Ok(())
    }

    /// Resolve versions and layouts, then freeze the workspace.
    fn finish(mut self, current: ProjectId, root_dir: PathBuf) -> Result<LocalWorkspace> {
        let root_dir = normalize_path(&root_dir);
        let root_properties = self
            .by_dir
            .get(&root_dir)
            .map(|&id| self.projects[id.0].model().properties().clone());

        let strict = self.ctx.config().discovery.require_resolved_versions;
        let overrides = self.ctx.overrides();
        let mut resolver = VersionResolver::new(overrides);
        if let Some(properties) = &root_properties {
            resolver = resolver.with_root_properties(properties);
        }

        let mut versions = Vec::with_capacity(self.projects.len());
        for project in &self.projects {
            let version = if strict && self.is_registered(project.id()) {
                resolver.resolve_strict(project.raw_version(), &project.key().to_string())?
            } else {
                resolver.resolve(project.version()).value
            };
            versions.push(version);
        }
        for (project, version) in self.projects.iter_mut().zip(versions) {
            project.set_version(version);
        }

        let mode = self.builder.mode();
        if mode == ModelMode::Raw {
            let layouts: Vec<Option<BuildLayout>> = self
                .projects
                .iter()
                .map(|project| {
                    project.local_parent_id()?;
                    let mut chain: Vec<&dyn ProjectModel> = vec![project.model()];
                    let mut cursor = project.local_parent_id();
                    while let Some(parent) = cursor {
                        chain.push(self.projects[parent.0].model());
                        cursor = self.projects[parent.0].local_parent_id();
                    }
                    Some(BuildLayout::compute(project.dir(), &chain, overrides))
                })
                .collect();
            for (project, layout) in self.projects.iter_mut().zip(layouts) {
                if let Some(layout) = layout {
                    project.set_layout(layout);
                }
            }
        }

        debug!(
            root = %root_dir.display(),
            projects = self.by_key.len(),
            warnings = self.warnings.len(),
            "workspace discovered"
        );

        Ok(LocalWorkspace {
            root_dir,
            projects: self.projects,
            by_key: self.by_key,
            by_dir: self.by_dir,
            current,
            mode,
            overrides: self.ctx.shared_overrides(),
            warnings: self.warnings,
            directory_breaks: self.directory_breaks,
        })
    }
}
