//! Protocol data types and the agent contract

mod agent;
mod message;
mod task;
mod traits;

pub use agent::{AgentCapabilities, AgentInfo, AgentStatus, AgentType};
pub use message::{AgentMessage, HelpOffer, HelpRequest, ProtocolFeature, ProtocolFeatures, TaskUpdate};
pub use task::{
    Artifact, Task, TaskError, TaskInput, TaskPriority, TaskRequirements, TaskResponse, TaskResult,
    TaskStatus, TaskType,
};
pub use traits::A2AAgent;
