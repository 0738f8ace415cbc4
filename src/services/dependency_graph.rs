use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::domain::dependency::{DependencyEdge, ProjectId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("dependency cycle detected: {}", format_cycle(.cycle))]
    CycleDetected { cycle: Vec<ProjectId> },
}

fn format_cycle(cycle: &[ProjectId]) -> String {
    let mut path: Vec<&str> = cycle.iter().map(ProjectId::as_str).collect();
    if let Some(first) = path.first().copied() {
        path.push(first);
    }
    path.join(" -> ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    /// Position of the node's frame on the search stack.
    OnStack(usize),
    Done,
}

struct Frame {
    node: NodeIndex,
    dependencies: Vec<NodeIndex>,
    cursor: usize,
}

/// Directed "depends on" graph of projects. An edge points from the
/// dependent project to the project it waits for.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ProjectId, ()>,
    indices: BTreeMap<ProjectId, NodeIndex>,
}

impl DependencyGraph {
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DependencyEdge>) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Like [`DependencyGraph::from_edges`], but also keeps projects that
    /// take part in no edge.
    pub fn with_projects<'a>(
        projects: impl IntoIterator<Item = &'a ProjectId>,
        edges: impl IntoIterator<Item = &'a DependencyEdge>,
    ) -> Self {
        let mut graph = Self::default();
        for project in projects {
            graph.node(project);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    fn node(&mut self, id: &ProjectId) -> NodeIndex {
        if let Some(index) = self.indices.get(id) {
            return *index;
        }
        let index = self.graph.add_node(id.clone());
        self.indices.insert(id.clone(), index);
        index
    }

    fn add_edge(&mut self, edge: &DependencyEdge) {
        let dependent = self.node(&edge.source);
        let dependency = self.node(&edge.target);
        self.graph.update_edge(dependent, dependency, ());
    }

    pub fn project_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains(&self, id: &ProjectId) -> bool {
        self.indices.contains_key(id)
    }

    /// Direct dependencies of `id`, ascending.
    pub fn upstream(&self, id: &ProjectId) -> Vec<ProjectId> {
        let Some(index) = self.indices.get(id) else {
            return Vec::new();
        };
        self.sorted_neighbours(*index, Direction::Outgoing)
            .into_iter()
            .map(|node| self.graph[node].clone())
            .collect()
    }

    fn sorted_neighbours(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbours: Vec<NodeIndex> =
            self.graph.neighbors_directed(node, direction).collect();
        neighbours.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        neighbours
    }

    /// Depth-first search with an explicit stack, so adversarially deep
    /// graphs cannot overflow the call stack. Returns the projects of the
    /// first cycle found, in dependency order, starting from the smallest id
    /// from which the search reached it.
    pub fn find_cycle(&self) -> Option<Vec<ProjectId>> {
        let mut state = vec![Visit::Unvisited; self.graph.node_count()];

        for &root in self.indices.values() {
            if state[root.index()] != Visit::Unvisited {
                continue;
            }
            state[root.index()] = Visit::OnStack(0);
            let mut stack = vec![Frame {
                node: root,
                dependencies: self.sorted_neighbours(root, Direction::Outgoing),
                cursor: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let node = frame.node;
                let next = frame.dependencies.get(frame.cursor).copied();
                frame.cursor += 1;

                let Some(next) = next else {
                    state[node.index()] = Visit::Done;
                    stack.pop();
                    continue;
                };

                match state[next.index()] {
                    Visit::Unvisited => {
                        state[next.index()] = Visit::OnStack(stack.len());
                        stack.push(Frame {
                            node: next,
                            dependencies: self.sorted_neighbours(next, Direction::Outgoing),
                            cursor: 0,
                        });
                    }
                    Visit::OnStack(start) => {
                        return Some(
                            stack[start..]
                                .iter()
                                .map(|frame| self.graph[frame.node].clone())
                                .collect(),
                        );
                    }
                    Visit::Done => {}
                }
            }
        }
        None
    }

    /// Dependencies before dependents; among projects that are ready at the
    /// same time the smallest id goes first.
    pub fn topological_order(&self) -> Result<Vec<ProjectId>, DependencyGraphError> {
        if let Some(cycle) = self.find_cycle() {
            return Err(DependencyGraphError::CycleDetected { cycle });
        }

        let mut waiting_on: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| {
                self.graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .count()
            })
            .collect();
        let mut ready: BinaryHeap<Reverse<(&ProjectId, NodeIndex)>> = self
            .indices
            .iter()
            .filter(|(_, node)| waiting_on[node.index()] == 0)
            .map(|(id, node)| Reverse((id, *node)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((id, node))) = ready.pop() {
            order.push(id.clone());
            for dependent in self.graph.neighbors_directed(node, Direction::Incoming) {
                waiting_on[dependent.index()] -= 1;
                if waiting_on[dependent.index()] == 0 {
                    ready.push(Reverse((&self.graph[dependent], dependent)));
                }
            }
        }
        Ok(order)
    }

    /// Length of the longest dependency chain ending at each project.
    /// `order` must be a topological order of this graph.
    pub fn chain_depths(&self, order: &[ProjectId]) -> BTreeMap<ProjectId, usize> {
        let mut depths: BTreeMap<ProjectId, usize> = BTreeMap::new();
        for id in order {
            let depth = self
                .upstream(id)
                .iter()
                .filter_map(|dependency| depths.get(dependency))
                .map(|depth| depth + 1)
                .max()
                .unwrap_or(0);
            depths.insert(id.clone(), depth);
        }
        depths
    }
}

/// Checks `edges` for cycles and returns the propagation order of every
/// project they mention.
pub fn validate(edges: &[DependencyEdge]) -> Result<Vec<ProjectId>, DependencyGraphError> {
    DependencyGraph::from_edges(edges).topological_order()
}

/// Whether `edges` plus `new_edge` contain a cycle. Neither input is
/// modified, so this can be asked before committing an edit.
pub fn would_introduce_cycle(edges: &[DependencyEdge], new_edge: &DependencyEdge) -> bool {
    if new_edge.is_self_dependency() {
        return true;
    }
    DependencyGraph::from_edges(edges.iter().chain(std::iter::once(new_edge)))
        .find_cycle()
        .is_some()
}
