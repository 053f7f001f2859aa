//! Fixed-point resolution of the static graph against the present components.
//!
//! Each pass walks every vertex's child list. A present child is kept. An
//! absent child is replaced in place by its own current child list, so a
//! chain `A -> B -> C` with `B` absent becomes `A -> C`. Passes repeat until
//! nothing changes; splicing cascades across passes, which handles several
//! absent levels in a row. Duplicates produced by splicing keep their first
//! occurrence.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::{DependencyGraph, GraphError, GraphResult};
use crate::component::ComponentKey;

/// Resolved child lists for every present component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    children: BTreeMap<ComponentKey, Vec<ComponentKey>>,
    passes: usize,
}

impl Resolution {
    /// Present components `key` triggers after it installs, in order.
    pub fn children(&self, key: &str) -> &[ComponentKey] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(component, children)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentKey, &[ComponentKey])> {
        self.children.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of passes taken to reach the fixed point, including the final
    /// pass that made no changes.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Working copy of the child lists during resolution.
pub(crate) struct Splice<'g> {
    graph: &'g DependencyGraph,
    present: Vec<bool>,
    lists: Vec<Vec<usize>>,
}

impl<'g> Splice<'g> {
    pub(crate) fn new<'k>(
        graph: &'g DependencyGraph,
        present: impl IntoIterator<Item = &'k ComponentKey>,
    ) -> GraphResult<Self> {
        let mut flags = vec![false; graph.vertices.len()];
        for key in present {
            let idx = graph
                .index
                .get(key)
                .copied()
                .ok_or_else(|| GraphError::UnknownVertex { key: key.clone() })?;
            flags[idx] = true;
        }

        Ok(Self {
            graph,
            present: flags,
            lists: graph.vertices.iter().map(|v| v.children.clone()).collect(),
        })
    }

    /// Run one pass over every vertex. Returns whether anything changed.
    pub(crate) fn pass(&mut self) -> bool {
        let mut changed = false;

        for v in 0..self.lists.len() {
            let current = std::mem::take(&mut self.lists[v]);
            let mut next = Vec::with_capacity(current.len());

            for child in current {
                if self.present[child] {
                    next.push(child);
                } else {
                    // The graph is acyclic, so `child != v` and its list is intact.
                    next.extend_from_slice(&self.lists[child]);
                    changed = true;
                }
            }

            let mut seen = HashSet::with_capacity(next.len());
            next.retain(|idx| seen.insert(*idx));
            self.lists[v] = next;
        }

        changed
    }

    /// Current child keys of `key`.
    #[cfg(test)]
    pub(crate) fn current(&self, key: &str) -> Vec<&str> {
        self.graph
            .index
            .get(key)
            .map(|&idx| {
                self.lists[idx]
                    .iter()
                    .map(|&c| self.graph.vertices[c].key.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn finish(self, passes: usize) -> Resolution {
        let children = self
            .graph
            .vertices
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.present[*idx])
            .map(|(idx, vertex)| {
                let kids = self.lists[idx]
                    .iter()
                    .map(|&c| self.graph.vertices[c].key.clone())
                    .collect();
                (vertex.key.clone(), kids)
            })
            .collect();

        Resolution { children, passes }
    }
}

impl DependencyGraph {
    /// Resolve the graph against the set of present components.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if a present key does not appear
    /// in the graph.
    pub fn resolve<'k>(
        &self,
        present: impl IntoIterator<Item = &'k ComponentKey>,
    ) -> GraphResult<Resolution> {
        let mut splice = Splice::new(self, present)?;
        let mut passes = 1;
        while splice.pass() {
            passes += 1;
        }

        let resolution = splice.finish(passes);
        debug!(
            passes,
            components = resolution.children.len(),
            "Resolved dependency graph"
        );
        Ok(resolution)
    }
}
