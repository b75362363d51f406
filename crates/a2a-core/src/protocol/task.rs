//! Task, response and result types exchanged with agents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Kind of work requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Query,
    Analyze,
    Generate,
    Execute,
    /// Composite work that the coordinator decomposes into phases
    Complex,
}

/// Priority level for task execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl TaskInput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            input_type: "text".to_string(),
            content: Some(content.into()),
            data: None,
            files: vec![],
        }
    }

    pub fn data(data: JsonValue) -> Self {
        Self {
            input_type: "data".to_string(),
            content: None,
            data: Some(data),
            files: vec![],
        }
    }

    pub fn files(files: Vec<String>) -> Self {
        Self {
            input_type: "files".to_string(),
            content: None,
            data: None,
            files,
        }
    }

    /// Flatten the payload to a single string: text content first, then
    /// serialized data, then the file list.
    pub fn as_text(&self) -> String {
        if let Some(content) = &self.content {
            return content.clone();
        }
        if let Some(data) = &self.data {
            return data.to_string();
        }
        self.files.join("\n")
    }
}

impl Default for TaskInput {
    fn default() -> Self {
        Self::text("")
    }
}

/// Constraints a task places on whoever executes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskRequirements {
    /// Desired quality in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<Duration>,
    #[serde(default)]
    pub required_tools: Vec<String>,
    #[serde(default)]
    pub constraints: HashMap<String, String>,
}

/// A unit of requested work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Caller-supplied identifier, unique per submission
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub input: TaskInput,
    #[serde(default)]
    pub context: HashMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<TaskRequirements>,
    /// Carried for callers; nothing in the hub enforces it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Task {
    /// Create a text task with a fresh UUID
    pub fn new(task_type: TaskType, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_type,
            priority: TaskPriority::default(),
            input: TaskInput::text(content),
            context: HashMap::new(),
            requirements: None,
            deadline: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_input(mut self, input: TaskInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_requirements(mut self, requirements: TaskRequirements) -> Self {
        self.requirements = Some(requirements);
        self
    }

    /// Shorthand for requirements that only name tools
    pub fn with_required_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requirements = self.requirements.get_or_insert_with(TaskRequirements::default);
        requirements.required_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Tools the task requires, empty when it declares none
    pub fn required_tools(&self) -> &[String] {
        self.requirements
            .as_ref()
            .map(|r| r.required_tools.as_slice())
            .unwrap_or(&[])
    }
}

/// Structured error reported by an agent inside a [`TaskResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    pub code: String,
    pub message: String,
}

impl TaskError {
    pub const EXECUTION_ERROR: &'static str = "EXECUTION_ERROR";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(Self::EXECUTION_ERROR, message)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Named output produced alongside a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub mime_type: String,
    pub content: String,
}

/// Output of a completed task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(rename = "type")]
    pub result_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl TaskResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            result_type: "text".to_string(),
            content: Some(content.into()),
            data: None,
            files: vec![],
            artifacts: vec![],
            confidence: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}

/// An agent's answer to `send_task` / `task_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    /// Progress in [0, 1]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<Duration>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TaskResponse {
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            result: None,
            error: None,
            progress: 0.0,
            estimated_time: None,
            metadata: HashMap::new(),
        }
    }

    pub fn completed(task_id: impl Into<String>, result: TaskResult) -> Self {
        Self {
            result: Some(result),
            progress: 1.0,
            ..Self::new(task_id, TaskStatus::Completed)
        }
    }

    pub fn failed(task_id: impl Into<String>, error: TaskError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(task_id, TaskStatus::Failed)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
