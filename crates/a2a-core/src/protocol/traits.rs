//! The agent contract
//!
//! Every participant registered with the hub presents [`A2AAgent`]. The first
//! five methods are what the registry, router and coordinator rely on. The
//! remaining methods belong to optional protocol slices: an agent advertises
//! which ones it offers through [`A2AAgent::features`], and the default
//! implementations answer [`Error::Unsupported`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::agent::{AgentCapabilities, AgentInfo};
use super::message::{AgentMessage, HelpOffer, HelpRequest, ProtocolFeature, ProtocolFeatures, TaskUpdate};
use super::task::{Task, TaskResponse};
use crate::{Error, Result};

#[async_trait]
pub trait A2AAgent: Send + Sync + 'static {
    /// Describe the agent
    async fn info(&self) -> Result<AgentInfo>;

    /// Report what the agent can do
    async fn capabilities(&self) -> Result<AgentCapabilities>;

    /// Execute a task and report its outcome.
    ///
    /// Agent-side failures are reported as a `TaskResponse` with
    /// `status == Failed`; an `Err` means the plumbing itself broke.
    async fn send_task(&self, task: &Task) -> Result<TaskResponse>;

    /// Current state of a previously submitted task
    async fn task_status(&self, task_id: &str) -> Result<TaskResponse>;

    /// Cancel a running task
    async fn cancel_task(&self, task_id: &str) -> Result<()>;

    /// Optional protocol slices this agent offers
    fn features(&self) -> ProtocolFeatures {
        ProtocolFeatures::none()
    }

    async fn stream_task(&self, _task: &Task) -> Result<mpsc::Receiver<TaskUpdate>> {
        Err(Error::Unsupported(ProtocolFeature::Streaming))
    }

    async fn send_message(&self, _message: AgentMessage) -> Result<()> {
        Err(Error::Unsupported(ProtocolFeature::Messaging))
    }

    async fn receive_messages(&self) -> Result<Vec<AgentMessage>> {
        Err(Error::Unsupported(ProtocolFeature::Messaging))
    }

    async fn request_help(&self, _request: HelpRequest) -> Result<Vec<HelpOffer>> {
        Err(Error::Unsupported(ProtocolFeature::HelpExchange))
    }

    async fn offer_help(&self, _request: &HelpRequest) -> Result<HelpOffer> {
        Err(Error::Unsupported(ProtocolFeature::HelpExchange))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{TaskResult, TaskType};

    struct Minimal;

    #[async_trait]
    impl A2AAgent for Minimal {
        async fn info(&self) -> Result<AgentInfo> {
            Ok(AgentInfo::new("minimal", "Minimal"))
        }

        async fn capabilities(&self) -> Result<AgentCapabilities> {
            Ok(AgentCapabilities::default())
        }

        async fn send_task(&self, task: &Task) -> Result<TaskResponse> {
            Ok(TaskResponse::completed(&task.id, TaskResult::text("done")))
        }

        async fn task_status(&self, task_id: &str) -> Result<TaskResponse> {
            Err(Error::TaskNotFound(task_id.to_string()))
        }

        async fn cancel_task(&self, task_id: &str) -> Result<()> {
            Err(Error::TaskNotFound(task_id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_optional_surface_reports_unsupported() {
        let agent = Minimal;
        let task = Task::new(TaskType::Query, "q");

        assert_eq!(agent.features(), ProtocolFeatures::none());
        assert!(matches!(
            agent.stream_task(&task).await,
            Err(Error::Unsupported(ProtocolFeature::Streaming))
        ));
        assert!(matches!(
            agent.receive_messages().await,
            Err(Error::Unsupported(ProtocolFeature::Messaging))
        ));
        let request = HelpRequest {
            id: "h".into(),
            requester: "minimal".into(),
            task: task.clone(),
            reason: "stuck".into(),
        };
        assert!(matches!(
            agent.offer_help(&request).await,
            Err(Error::Unsupported(ProtocolFeature::HelpExchange))
        ));
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let agent: std::sync::Arc<dyn A2AAgent> = std::sync::Arc::new(Minimal);
        let task = Task::new(TaskType::Query, "q");
        let response = agent.send_task(&task).await.unwrap();
        assert!(response.is_completed());
    }
}
