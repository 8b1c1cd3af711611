//! Error types for Sarathi

use thiserror::Error;

use crate::fsm::NodeId;

/// Reasons a planning cycle can fail.
///
/// These are routine outcomes of a stochastic planner, not bugs: the pilot
/// converts them into `Failure` events and reports them upward.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningFailure {
    #[error("start configuration collides with {obstacle}")]
    StartCollides { obstacle: String },

    #[error("goal configuration collides with {obstacle}")]
    GoalCollides { obstacle: String },

    #[error("no path found within {0} iterations")]
    MaxIterations(usize),
}

/// Sarathi error type
#[derive(Error, Debug)]
pub enum SarathiError {
    #[error("Planning failed: {0}")]
    Planning(#[from] PlanningFailure),

    #[error("Malformed event at {node}: expected {expected}, found {found}")]
    MalformedEvent {
        node: String,
        expected: &'static str,
        found: String,
    },

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Node name '{name}' already used under '{parent}'")]
    DuplicateNode { parent: String, name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SarathiError {
    fn from(e: toml::de::Error) -> Self {
        SarathiError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SarathiError>;
