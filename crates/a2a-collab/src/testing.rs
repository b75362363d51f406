//! Mock agent shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use a2a_core::{
    A2AAgent, AgentCapabilities, AgentInfo, AgentStatus, AgentType, Error, Result, Task, TaskError,
    TaskResponse, TaskResult, TaskStatus,
};

#[derive(Clone)]
pub(crate) enum Behavior {
    Complete,
    Fail(String),
    /// Fail at once on tasks whose id contains the pattern, complete the rest
    FailMatching(String),
    Error(String),
}

pub(crate) struct MockAgent {
    info: AgentInfo,
    capabilities: AgentCapabilities,
    unreachable: AtomicBool,
    info_calls: AtomicUsize,
    behavior: Behavior,
    delay: Option<Duration>,
    handled: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn new(id: &str) -> Self {
        Self {
            info: AgentInfo::new(id, format!("{} agent", id)),
            capabilities: AgentCapabilities::default(),
            unreachable: AtomicBool::new(false),
            info_calls: AtomicUsize::new(0),
            behavior: Behavior::Complete,
            delay: None,
            handled: Mutex::new(vec![]),
            cancelled: Mutex::new(vec![]),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = self.capabilities.with_capabilities(capabilities.iter().copied());
        self
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.capabilities = self.capabilities.with_tools(tools.iter().copied());
        self
    }

    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.info.agent_type = agent_type;
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.info.status = status;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_info(self) -> Self {
        self.unreachable.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Ids of the tasks this agent was asked to execute
    pub fn handled(&self) -> Vec<String> {
        self.handled.lock().clone()
    }

    /// How many times `info()` was called
    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().clone()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::agent(&self.info.id, "unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl A2AAgent for MockAgent {
    async fn info(&self) -> Result<AgentInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.info.clone())
    }

    async fn capabilities(&self) -> Result<AgentCapabilities> {
        self.check_reachable()?;
        Ok(self.capabilities.clone())
    }

    async fn send_task(&self, task: &Task) -> Result<TaskResponse> {
        self.handled.lock().push(task.id.clone());

        if let Behavior::FailMatching(pattern) = &self.behavior {
            if task.id.contains(pattern.as_str()) {
                return Ok(TaskResponse::failed(&task.id, TaskError::execution("matched failure pattern")));
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Complete | Behavior::FailMatching(_) => Ok(TaskResponse::completed(
                &task.id,
                TaskResult::text(format!("{} handled {}", self.info.id, task.id)).with_confidence(0.8),
            )),
            Behavior::Fail(message) => Ok(TaskResponse::failed(&task.id, TaskError::execution(message))),
            Behavior::Error(message) => Err(Error::agent(&self.info.id, message)),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskResponse> {
        if self.handled.lock().iter().any(|id| id == task_id) {
            Ok(TaskResponse::new(task_id, TaskStatus::Completed))
        } else {
            Err(Error::TaskNotFound(task_id.to_string()))
        }
    }

    async fn cancel_task(&self, task_id: &str) -> Result<()> {
        self.cancelled.lock().push(task_id.to_string());
        Ok(())
    }
}
