//! Graph construction and resolution errors.

use thiserror::Error;

use crate::component::ComponentKey;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A present component does not appear anywhere in the graph.
    #[error("component '{key}' is not part of the dependency graph")]
    UnknownVertex { key: ComponentKey },

    /// The static graph contains a cycle through `key`.
    #[error("dependency graph contains a cycle through '{key}'")]
    Cycle { key: ComponentKey },
}
