//! Adapter Agent
//!
//! Wraps an [`Executor`] so it can be registered with the hub. Each submitted
//! task is tracked through [`TaskState`]; executor failures come back as a
//! failed `TaskResponse`, never as an `Err`.
//!
//! Cancelling marks the task cancelled but does not interrupt the executor.
//! Whatever it returns afterwards is discarded. A caller that drops the
//! `send_task` future (a timeout, an aborted join handle) cancels the task the
//! same way.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use a2a_core::{
    A2AAgent, AgentCapabilities, AgentInfo, AgentType, Error, Result, Task, TaskError,
    TaskResponse, TaskResult, TaskStatus,
};

use crate::executor::Executor;
use crate::state::TaskState;

const DEFAULT_VENDOR: &str = "a2a-hub";

/// Cancels a still-running task when `send_task` is dropped before the
/// executor returns
struct InFlight<'a> {
    tasks: &'a RwLock<HashMap<String, TaskState>>,
    agent_id: &'a str,
    task_id: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut tasks = self.tasks.write();
        let Some(state) = tasks.get_mut(self.task_id) else {
            return;
        };
        if !state.status.is_terminal() && state.cancel().is_ok() {
            info!(
                "Agent '{}' cancelled task {}: caller stopped waiting",
                self.agent_id, self.task_id
            );
        }
    }
}

pub struct AdapterAgent<E: Executor> {
    executor: E,
    info: AgentInfo,
    capabilities: AgentCapabilities,
    /// Present only when a concurrency cap was configured
    permits: Option<Arc<Semaphore>>,
    tasks: RwLock<HashMap<String, TaskState>>,
}

impl<E: Executor> AdapterAgent<E> {
    /// Adapter with defaults derived from the executor
    pub fn new(executor: E) -> Self {
        Self::builder(executor).build()
    }

    pub fn builder(executor: E) -> AdapterAgentBuilder<E> {
        AdapterAgentBuilder::new(executor)
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Copies of every tracked task state
    pub async fn task_states(&self) -> HashMap<String, TaskState> {
        self.tasks.read().clone()
    }

    /// Forget tasks that reached a terminal state. Returns how many.
    pub async fn clear_finished(&self) -> usize {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|_, state| !state.status.is_terminal());
        before - tasks.len()
    }

    fn begin(&self, task_id: &str) -> Result<()> {
        let mut tasks = self.tasks.write();
        if let Some(existing) = tasks.get(task_id) {
            if !existing.status.is_terminal() {
                return Err(Error::InvalidTransition {
                    task_id: task_id.to_string(),
                    from: existing.status,
                    to: TaskStatus::Running,
                });
            }
        }
        tasks.insert(task_id.to_string(), TaskState::running(task_id));
        Ok(())
    }

    fn finish(&self, task_id: &str, outcome: anyhow::Result<String>) -> Result<TaskResponse> {
        let mut tasks = self.tasks.write();
        let state = tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if state.status.is_terminal() {
            debug!("Task {} already {}, dropping executor output", task_id, state.status);
            return Ok(state.to_response());
        }

        match outcome {
            Ok(output) => {
                state.complete(TaskResult::text(output))?;
                info!("Agent '{}' completed task {}", self.info.id, task_id);
            }
            Err(e) => {
                warn!("Agent '{}' failed task {}: {:#}", self.info.id, task_id, e);
                state.fail(TaskError::execution(format!("{:#}", e)))?;
            }
        }

        Ok(state.to_response())
    }
}

#[async_trait]
impl<E: Executor> A2AAgent for AdapterAgent<E> {
    async fn info(&self) -> Result<AgentInfo> {
        Ok(self.info.clone())
    }

    async fn capabilities(&self) -> Result<AgentCapabilities> {
        Ok(self.capabilities.clone())
    }

    async fn send_task(&self, task: &Task) -> Result<TaskResponse> {
        self.begin(&task.id)?;
        let _in_flight = InFlight {
            tasks: &self.tasks,
            agent_id: &self.info.id,
            task_id: &task.id,
        };

        let _permit = match &self.permits {
            Some(permits) => Some(
                permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::agent(&self.info.id, e))?,
            ),
            None => None,
        };

        debug!("Agent '{}' executing task {}", self.info.id, task.id);
        let outcome = self.executor.execute(&task.input.as_text()).await;

        self.finish(&task.id, outcome)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskResponse> {
        self.tasks
            .read()
            .get(task_id)
            .map(TaskState::to_response)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    async fn cancel_task(&self, task_id: &str) -> Result<()> {
        let mut tasks = self.tasks.write();
        let state = tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        state.cancel()?;

        info!("Agent '{}' cancelled task {}", self.info.id, task_id);
        Ok(())
    }
}

/// Builder for [`AdapterAgent`]
pub struct AdapterAgentBuilder<E: Executor> {
    executor: E,
    id: Option<String>,
    version: String,
    vendor: String,
    agent_type: AgentType,
    capabilities: Vec<String>,
    tools: Vec<String>,
    languages: Option<Vec<String>>,
    max_concurrent_tasks: Option<u32>,
    avg_response_time: Option<Duration>,
    metadata: HashMap<String, String>,
}

impl<E: Executor> AdapterAgentBuilder<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            id: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            vendor: DEFAULT_VENDOR.to_string(),
            agent_type: AgentType::default(),
            capabilities: vec![],
            tools: vec![],
            languages: None,
            max_concurrent_tasks: None,
            avg_response_time: None,
            metadata: HashMap::new(),
        }
    }

    /// Agent id; defaults to the executor name
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn agent_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    /// Cap concurrent executions. Tasks over the cap stay `Running` while
    /// they wait for a slot. Zero means no cap.
    pub fn max_concurrent_tasks(mut self, max: u32) -> Self {
        self.max_concurrent_tasks = Some(max);
        self
    }

    pub fn avg_response_time(mut self, avg: Duration) -> Self {
        self.avg_response_time = Some(avg);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> AdapterAgent<E> {
        let id = self.id.unwrap_or_else(|| self.executor.name().to_string());

        let mut info = AgentInfo::new(id, self.executor.name())
            .with_description(self.executor.description())
            .with_version(self.version)
            .with_vendor(self.vendor)
            .with_type(self.agent_type);
        info.metadata = self.metadata;

        let mut capabilities = AgentCapabilities::new()
            .with_capabilities(self.capabilities)
            .with_tools(self.tools);
        if let Some(languages) = self.languages {
            capabilities = capabilities.with_languages(languages);
        }
        if let Some(max) = self.max_concurrent_tasks {
            capabilities = capabilities.with_max_concurrent_tasks(max);
        }
        if let Some(avg) = self.avg_response_time {
            capabilities = capabilities.with_avg_response_time(avg);
        }

        let permits = self
            .max_concurrent_tasks
            .filter(|max| *max > 0)
            .map(|max| Arc::new(Semaphore::new(max as usize)));

        AdapterAgent {
            executor: self.executor,
            info,
            capabilities,
            permits,
            tasks: RwLock::new(HashMap::new()),
        }
    }
}
