//! Per-task state machine
//!
//! A task is recorded as `Running` when submitted and moves exactly once to a
//! terminal state: `Completed`, `Failed` or `Cancelled`. Nothing leaves a
//! terminal state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use a2a_core::{Error, Result, TaskError, TaskResponse, TaskResult, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskState {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub result: Option<TaskResult>,
    pub error: Option<TaskError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskState {
    pub fn running(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Running,
            progress: 0.0,
            result: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self, result: TaskResult) -> Result<()> {
        self.transition(TaskStatus::Completed)?;
        self.result = Some(result);
        self.progress = 1.0;
        Ok(())
    }

    pub fn fail(&mut self, error: TaskError) -> Result<()> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(error);
        self.progress = 0.0;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(TaskStatus::Cancelled)
    }

    fn transition(&mut self, to: TaskStatus) -> Result<()> {
        if self.status != TaskStatus::Running {
            return Err(Error::InvalidTransition {
                task_id: self.task_id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            result: self.result.clone(),
            error: self.error.clone(),
            progress: self.progress,
            ..TaskResponse::new(&self.task_id, self.status)
        }
    }
}
