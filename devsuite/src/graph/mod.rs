//! Static component dependency graph.
//!
//! The graph says "once A is installed, trigger B, C, ...". It lists every
//! component the platform knows about, but a session usually selects only
//! some of them, so the graph is resolved against the present set before the
//! orchestrator wires items together (see [`resolver`]).
//!
//! Vertices are stored in an index arena: a `Vec` of child-index lists plus a
//! key-to-index map. Construction rejects cycles with a three-colour DFS, so
//! resolution always reaches a fixed point.

mod error;
mod resolver;

pub use error::{GraphError, GraphResult};
pub use resolver::Resolution;

use std::collections::HashMap;

use crate::component::ComponentKey;

/// Synthetic entry vertex; never a real component.
pub const ROOT: &str = "root";

/// Built-in install order.
const BUILTIN_EDGES: &[(&str, &[&str])] = &[
    (ROOT, &["jdk"]),
    ("jdk", &["virtualbox", "devstudio", "jbosseap"]),
    ("virtualbox", &["hyperv"]),
    ("hyperv", &["cygwin"]),
    ("cygwin", &["cdk"]),
    ("devstudio", &["fusetools"]),
    ("fusetools", &[]),
    ("jbosseap", &[]),
    ("cdk", &[]),
    ("kompose", &[]),
    ("vagrant", &[]),
    ("jbossfuse", &[]),
];

#[derive(Debug, Clone)]
struct Vertex {
    key: ComponentKey,
    children: Vec<usize>,
}

/// Directed acyclic graph of component keys to ordered child lists.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    vertices: Vec<Vertex>,
    index: HashMap<ComponentKey, usize>,
}

impl DependencyGraph {
    /// The built-in developer-platform graph.
    pub fn builtin() -> Self {
        let edges = BUILTIN_EDGES
            .iter()
            .map(|(key, children)| (*key, children.iter().copied()));
        match Self::from_edges(edges) {
            Ok(graph) => graph,
            Err(e) => unreachable!("built-in graph is acyclic: {e}"),
        }
    }

    /// Build a graph from `(vertex, children)` entries.
    ///
    /// Keys that only appear as children get a vertex with no children.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] if the edges contain a cycle.
    pub fn from_edges<I, C, K>(edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (K, C)>,
        C: IntoIterator<Item = K>,
        K: Into<ComponentKey>,
    {
        let mut graph = Self {
            vertices: Vec::new(),
            index: HashMap::new(),
        };

        for (key, children) in edges {
            let parent = graph.intern(key.into());
            for child in children {
                let child = graph.intern(child.into());
                graph.vertices[parent].children.push(child);
            }
        }

        graph.check_acyclic()?;
        Ok(graph)
    }

    fn intern(&mut self, key: ComponentKey) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.vertices.len();
        self.index.insert(key.clone(), idx);
        self.vertices.push(Vertex {
            key,
            children: Vec::new(),
        });
        idx
    }

    /// Whether the key appears anywhere in the graph.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Declaration order of a vertex. Parents are declared before children in
    /// the built-in graph, so sorting by position installs parents first.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Static children of a key, in declaration order.
    pub fn children(&self, key: &str) -> Vec<&ComponentKey> {
        self.index
            .get(key)
            .map(|&idx| {
                self.vertices[idx]
                    .children
                    .iter()
                    .map(|&c| &self.vertices[c].key)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All vertex keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.vertices.iter().map(|v| &v.key)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn check_acyclic(&self) -> GraphResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        fn visit(graph: &DependencyGraph, idx: usize, marks: &mut [Mark]) -> GraphResult<()> {
            match marks[idx] {
                Mark::Black => return Ok(()),
                Mark::Gray => {
                    return Err(GraphError::Cycle {
                        key: graph.vertices[idx].key.clone(),
                    })
                }
                Mark::White => {}
            }
            marks[idx] = Mark::Gray;
            for &child in &graph.vertices[idx].children {
                visit(graph, child, marks)?;
            }
            marks[idx] = Mark::Black;
            Ok(())
        }

        let mut marks = vec![Mark::White; self.vertices.len()];
        for idx in 0..self.vertices.len() {
            visit(self, idx, &mut marks)?;
        }
        Ok(())
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::builtin()
    }
}
