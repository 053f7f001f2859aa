//! Orchestrator errors

use std::fmt;

use super::item::TransitionError;
use crate::component::{ComponentError, ComponentKey};
use crate::graph::GraphError;

/// Result type for registry operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Errors from registering, removing, or wiring components.
#[derive(Debug)]
pub enum OrchestratorError {
    /// A descriptor failed validation
    Component(ComponentError),
    /// Wiring could not place a component in the graph
    Graph(GraphError),
    /// An illegal state transition
    Transition(TransitionError),
    /// The key is already in the registry
    AlreadyRegistered { key: ComponentKey },
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::Component(e) => write!(f, "{}", e),
            OrchestratorError::Graph(e) => write!(f, "{}", e),
            OrchestratorError::Transition(e) => write!(f, "{}", e),
            OrchestratorError::AlreadyRegistered { key } => {
                write!(f, "component '{}' is already registered", key)
            }
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrchestratorError::Component(e) => Some(e),
            OrchestratorError::Graph(e) => Some(e),
            OrchestratorError::Transition(e) => Some(e),
            OrchestratorError::AlreadyRegistered { .. } => None,
        }
    }
}

impl From<ComponentError> for OrchestratorError {
    fn from(e: ComponentError) -> Self {
        OrchestratorError::Component(e)
    }
}

impl From<GraphError> for OrchestratorError {
    fn from(e: GraphError) -> Self {
        OrchestratorError::Graph(e)
    }
}

impl From<TransitionError> for OrchestratorError {
    fn from(e: TransitionError) -> Self {
        OrchestratorError::Transition(e)
    }
}
