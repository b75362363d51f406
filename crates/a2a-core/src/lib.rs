//! a2a-core: shared foundation of the a2a-hub
//!
//! Protocol data types exchanged with agents, the [`A2AAgent`] contract every
//! participant presents, the error taxonomy, configuration and tracing setup.

pub mod config;
pub mod error;
pub mod protocol;
pub mod telemetry;

pub use config::{
    CoordinatorConfig, DispatchMode, HubConfig, HybridWeights, LoggingConfig, RouterConfig,
    RoutingStrategy,
};
pub use error::{Error, Result};
pub use protocol::{
    A2AAgent, AgentCapabilities, AgentInfo, AgentMessage, AgentStatus, AgentType, Artifact, HelpOffer,
    HelpRequest, ProtocolFeature, ProtocolFeatures, Task, TaskError, TaskInput, TaskPriority,
    TaskRequirements, TaskResponse, TaskResult, TaskStatus, TaskType, TaskUpdate,
};
