//! Collaboration session bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use a2a_core::{A2AAgent, Task, TaskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Record of one `coordinate` call
#[derive(Clone)]
pub struct CollaborationSession {
    pub id: String,
    pub main_task: Task,
    /// Agents taking part, keyed by agent id
    pub participants: HashMap<String, Arc<dyn A2AAgent>>,
    /// Subtasks keyed by subtask id
    pub sub_tasks: HashMap<String, Task>,
    /// Agent id the router picked for each subtask
    pub assignments: HashMap<String, String>,
    /// Results keyed by subtask id, filled in once every subtask completed
    pub results: HashMap<String, TaskResult>,
    pub status: SessionStatus,
    /// Why the session failed, if it did
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollaborationSession {
    pub fn new(main_task: Task) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            main_task,
            participants: HashMap::new(),
            sub_tasks: HashMap::new(),
            assignments: HashMap::new(),
            results: HashMap::new(),
            status: SessionStatus::Active,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.touch();
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.error = Some(reason.into());
        self.touch();
    }

    pub(crate) fn cancel(&mut self, reason: impl Into<String>) {
        self.status = SessionStatus::Cancelled;
        self.error = Some(reason.into());
        self.touch();
    }

    /// Participant ids, sorted
    pub fn participant_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.participants.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl fmt::Debug for CollaborationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollaborationSession")
            .field("id", &self.id)
            .field("main_task", &self.main_task.id)
            .field("participants", &self.participant_ids())
            .field("sub_tasks", &self.sub_tasks.len())
            .field("assignments", &self.assignments)
            .field("results", &self.results.len())
            .field("status", &self.status)
            .field("error", &self.error)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_core::TaskType;

    #[test]
    fn test_new_session_is_active() {
        let session = CollaborationSession::new(Task::new(TaskType::Query, "q"));
        assert_eq!(session.status, SessionStatus::Active);
        assert!(!session.status.is_finished());
        assert!(session.participants.is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_fail_records_reason() {
        let mut session = CollaborationSession::new(Task::new(TaskType::Query, "q"));
        session.fail("no agents");
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("no agents"));
        assert!(session.updated_at >= session.created_at);
    }

    #[test]
    fn test_cancel_finishes_session() {
        let mut session = CollaborationSession::new(Task::new(TaskType::Query, "q"));
        session.cancel("caller went away");
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert!(session.status.is_finished());
        assert_eq!(session.error.as_deref(), Some("caller went away"));
    }
}
