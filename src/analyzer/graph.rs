//! File-level dependency graph.
//!
//! Paths are interned into integer ids; adjacency and reverse-adjacency are
//! id vectors, so the graph stays cheap to mutate and safe to cycle. Every
//! mutation keeps the two directions consistent: `v ∈ outgoing(u)` exactly
//! when `u ∈ incoming(v)`.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct DependencyGraph {
    paths: Vec<String>,
    index: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    removed: Vec<bool>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `path`, creating an empty node if absent. Idempotent.
    pub fn add_node(&mut self, path: &str) -> usize {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let id = self.paths.len();
        self.paths.push(path.to_string());
        self.index.insert(path.to_string(), id);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.removed.push(false);
        id
    }

    /// Add `from -> to`, creating both endpoints if needed. Idempotent.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from_id = self.add_node(from);
        let to_id = self.add_node(to);
        if !self.outgoing[from_id].contains(&to_id) {
            self.outgoing[from_id].push(to_id);
            self.incoming[to_id].push(from_id);
        }
    }

    /// Delete a node and scrub it from every adjacency list.
    pub fn remove_node(&mut self, path: &str) {
        let Some(id) = self.index.remove(path) else {
            return;
        };
        for &target in &self.outgoing[id] {
            self.incoming[target].retain(|&s| s != id);
        }
        for &source in &self.incoming[id] {
            self.outgoing[source].retain(|&t| t != id);
        }
        self.outgoing[id].clear();
        self.incoming[id].clear();
        self.removed[id] = true;
    }

    /// Delete one edge, leaving both endpoints in place.
    pub fn remove_edge(&mut self, from: &str, to: &str) {
        let (Some(&from_id), Some(&to_id)) = (self.index.get(from), self.index.get(to)) else {
            return;
        };
        self.outgoing[from_id].retain(|&t| t != to_id);
        self.incoming[to_id].retain(|&s| s != from_id);
    }

    pub fn has_node(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&from_id), Some(&to_id)) => self.outgoing[from_id].contains(&to_id),
            _ => false,
        }
    }

    /// Paths this file depends on, insertion-ordered copy.
    pub fn outgoing(&self, path: &str) -> Vec<String> {
        self.index
            .get(path)
            .map(|&id| {
                self.outgoing[id]
                    .iter()
                    .map(|&t| self.paths[t].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Paths that depend on this file, insertion-ordered copy.
    pub fn incoming(&self, path: &str) -> Vec<String> {
        self.index
            .get(path)
            .map(|&id| {
                self.incoming[id]
                    .iter()
                    .map(|&s| self.paths[s].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All node paths in insertion order.
    pub fn nodes(&self) -> Vec<String> {
        self.live_ids().map(|id| self.paths[id].clone()).collect()
    }

    /// All edges as `(from, to)` pairs, node-then-adjacency order.
    pub fn edges(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for id in self.live_ids() {
            for &target in &self.outgoing[id] {
                out.push((self.paths[id].clone(), self.paths[target].clone()));
            }
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.live_ids().count()
    }

    pub fn edge_count(&self) -> usize {
        self.live_ids().map(|id| self.outgoing[id].len()).sum()
    }

    /// Every file reachable by following outgoing edges, excluding the
    /// origin unless a cycle leads back to it.
    pub fn transitive_outgoing(&self, path: &str) -> Vec<String> {
        self.transitive(path, &self.outgoing)
    }

    /// Every file that transitively depends on `path`.
    pub fn transitive_incoming(&self, path: &str) -> Vec<String> {
        self.transitive(path, &self.incoming)
    }

    fn transitive(&self, path: &str, adjacency: &[Vec<usize>]) -> Vec<String> {
        let Some(&start) = self.index.get(path) else {
            return Vec::new();
        };
        let mut seen: HashSet<usize> = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<usize> = adjacency[start].clone();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(self.paths[id].clone());
            for &next in &adjacency[id] {
                if !seen.contains(&next) {
                    stack.push(next);
                }
            }
        }
        order
    }

    /// Files with the most outgoing edges, `(path, count)` descending,
    /// zero-degree nodes omitted, ties broken by path.
    pub fn top_k_by_outgoing(&self, k: usize) -> Vec<(String, usize)> {
        self.top_k(k, &self.outgoing)
    }

    pub fn top_k_by_incoming(&self, k: usize) -> Vec<(String, usize)> {
        self.top_k(k, &self.incoming)
    }

    fn top_k(&self, k: usize, adjacency: &[Vec<usize>]) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .live_ids()
            .filter(|&id| !adjacency[id].is_empty())
            .map(|id| (self.paths[id].clone(), adjacency[id].len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// Nodes with no edges in either direction.
    pub fn orphans(&self) -> Vec<String> {
        self.live_ids()
            .filter(|&id| self.outgoing[id].is_empty() && self.incoming[id].is_empty())
            .map(|id| self.paths[id].clone())
            .collect()
    }

    /// Nodes that depend on others but have no dependents.
    pub fn leaves(&self) -> Vec<String> {
        self.live_ids()
            .filter(|&id| !self.outgoing[id].is_empty() && self.incoming[id].is_empty())
            .map(|id| self.paths[id].clone())
            .collect()
    }

    /// Nodes that are depended upon but depend on nothing.
    pub fn roots(&self) -> Vec<String> {
        self.live_ids()
            .filter(|&id| self.outgoing[id].is_empty() && !self.incoming[id].is_empty())
            .map(|id| self.paths[id].clone())
            .collect()
    }

    pub(crate) fn live_ids(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.paths.len()).filter(|&id| !self.removed[id])
    }

    pub(crate) fn id_count(&self) -> usize {
        self.paths.len()
    }

    pub(crate) fn out_ids(&self, id: usize) -> &[usize] {
        &self.outgoing[id]
    }

    pub(crate) fn path_of(&self, id: usize) -> &str {
        &self.paths[id]
    }
}
