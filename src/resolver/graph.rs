//! Workspace graph - relationships between the registered projects.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::core::coordinate::ArtifactKey;
use crate::core::errors::{Result, WorkspaceError};
use crate::core::workspace::LocalWorkspace;

/// Why one project points at another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Project -> its local parent.
    Parent,
    /// Aggregator -> one of its modules.
    Module,
    /// Project -> a workspace project it depends on.
    Dependency,
}

impl EdgeKind {
    /// Whether the target must be built before the source.
    fn is_prerequisite(self) -> bool {
        !matches!(self, EdgeKind::Module)
    }
}

/// Directed graph over a workspace's registered projects.
#[derive(Debug, Clone)]
pub struct WorkspaceGraph {
    graph: DiGraph<ArtifactKey, EdgeKind>,
    nodes: HashMap<ArtifactKey, NodeIndex>,
}

impl WorkspaceGraph {
    /// Build the graph of `ws`.
    ///
    /// Dependencies match workspace projects by GA key only; the declared
    /// version is ignored since the workspace copy is what gets built.
    pub fn new(ws: &LocalWorkspace) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for key in ws.keys() {
            nodes.insert(key.clone(), graph.add_node(key.clone()));
        }

        for project in ws.projects() {
            let from = nodes[project.key()];

            if let Some(parent) = ws.local_parent(project) {
                if let Some(&to) = nodes.get(parent.key()) {
                    graph.update_edge(from, to, EdgeKind::Parent);
                }
            }

            for module in ws.modules(project) {
                if let Some(&to) = nodes.get(module.key()) {
                    graph.update_edge(from, to, EdgeKind::Module);
                }
            }

            for dependency in project.model().dependencies() {
                let key = dependency.key();
                if &key == project.key() {
                    continue;
                }
                let Some(&to) = nodes.get(&key) else {
                    continue;
                };
                match graph.find_edge(from, to) {
                    Some(edge) if graph[edge] == EdgeKind::Module => {
                        graph[edge] = EdgeKind::Dependency;
                    }
                    Some(_) => {}
                    None => {
                        graph.add_edge(from, to, EdgeKind::Dependency);
                    }
                }
            }
        }

        WorkspaceGraph { graph, nodes }
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Kind of the edge from `from` to `to`, if any.
    pub fn edge(&self, from: &ArtifactKey, to: &ArtifactKey) -> Option<EdgeKind> {
        let (&a, &b) = (self.nodes.get(from)?, self.nodes.get(to)?);
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// Projects in build order, prerequisites first.
    pub fn build_order(&self) -> Result<Vec<&ArtifactKey>> {
        let prerequisites = self.graph.filter_map(
            |_, key| Some(key.clone()),
            |_, kind| kind.is_prerequisite().then_some(*kind),
        );

        match toposort(&prerequisites, None) {
            Ok(order) => Ok(order.into_iter().rev().map(|n| &self.graph[n]).collect()),
            Err(cycle) => Err(WorkspaceError::CyclicDependency {
                project: self.graph[cycle.node_id()].to_string(),
            }),
        }
    }

    /// Projects that directly require `key` (as parent or dependency).
    pub fn dependents(&self, key: &ArtifactKey) -> Vec<&ArtifactKey> {
        self.neighbors(key, Direction::Incoming)
    }

    /// Projects `key` directly requires (its parent and dependencies).
    pub fn prerequisites(&self, key: &ArtifactKey) -> Vec<&ArtifactKey> {
        self.neighbors(key, Direction::Outgoing)
    }

    fn neighbors(&self, key: &ArtifactKey, direction: Direction) -> Vec<&ArtifactKey> {
        let Some(&node) = self.nodes.get(key) else {
            return Vec::new();
        };
        let mut found: Vec<&ArtifactKey> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| e.weight().is_prerequisite())
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                &self.graph[other]
            })
            .collect();
        found.sort();
        found
    }
}
