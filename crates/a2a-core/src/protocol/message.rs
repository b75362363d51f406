//! Optional protocol surface: streaming updates, peer messaging and help exchange

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::task::{Task, TaskStatus};

/// An optional slice of the agent protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolFeature {
    Streaming,
    Messaging,
    HelpExchange,
}

impl fmt::Display for ProtocolFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Streaming => "streaming",
            Self::Messaging => "messaging",
            Self::HelpExchange => "help exchange",
        };
        f.write_str(s)
    }
}

/// Which optional features an agent offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProtocolFeatures {
    pub streaming: bool,
    pub messaging: bool,
    pub help_exchange: bool,
}

impl ProtocolFeatures {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            streaming: true,
            messaging: true,
            help_exchange: true,
        }
    }

    pub fn supports(&self, feature: ProtocolFeature) -> bool {
        match feature {
            ProtocolFeature::Streaming => self.streaming,
            ProtocolFeature::Messaging => self.messaging,
            ProtocolFeature::HelpExchange => self.help_exchange,
        }
    }
}

/// Incremental progress emitted while a task streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Direct agent-to-agent message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Request for assistance broadcast by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: String,
    pub requester: String,
    pub task: Task,
    pub reason: String,
}

/// Answer to a [`HelpRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpOffer {
    pub request_id: String,
    pub helper: String,
    pub estimated_time: Duration,
    pub confidence: f64,
}
