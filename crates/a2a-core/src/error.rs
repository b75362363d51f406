//! Error types for a2a-core

use thiserror::Error;

use crate::protocol::{ProtocolFeature, TaskStatus};

/// Main error type shared by every a2a-hub crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No agents available")]
    NoAgentsAvailable,

    #[error("No suitable agent found for task: {task_id}")]
    NoSuitableAgent { task_id: String },

    #[error("Agent {agent_id} failed: {message}")]
    Agent { agent_id: String, message: String },

    #[error("Subtask {subtask_id} failed: {reason}")]
    SubtaskFailed { subtask_id: String, reason: String },

    #[error("No results to aggregate")]
    NoResults,

    #[error("Task decomposition failed: {0}")]
    Decomposition(String),

    #[error("Invalid transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("{0} is not supported by this agent")]
    Unsupported(ProtocolFeature),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::Agent`] from any displayable failure
    pub fn agent(agent_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Agent {
            agent_id: agent_id.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error means "the thing you asked for does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::TaskNotFound(_) | Self::SessionNotFound(_)
        )
    }
}

/// Result type alias for a2a-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = Error::InvalidTransition {
            task_id: "t-1".to_string(),
            from: TaskStatus::Completed,
            to: TaskStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition for task t-1: completed -> cancelled"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::AgentNotFound("a".into()).is_not_found());
        assert!(Error::TaskNotFound("t".into()).is_not_found());
        assert!(!Error::NoResults.is_not_found());
    }

    #[test]
    fn test_unsupported_message() {
        let err = Error::Unsupported(ProtocolFeature::Streaming);
        assert_eq!(err.to_string(), "streaming is not supported by this agent");
    }
}
