//! a2a-collab: multi-agent coordination for the a2a-hub
//!
//! Keeps the roster of live agents, picks the best agent for each task and
//! runs complex tasks as parallel collaborations across several agents.

pub mod coordinator;
pub mod decompose;
pub mod metrics;
pub mod registry;
pub mod router;
pub mod scoring;
pub mod session;

#[cfg(test)]
mod testing;

pub use coordinator::{CollaborationCoordinator, aggregate_results};
pub use decompose::{NoDecomposition, PhaseDecomposer, TaskDecomposer};
pub use metrics::AgentMetrics;
pub use registry::{AgentRegistry, HealthReport, HealthStatus, RegisteredAgent};
pub use router::{ScoredAgent, TaskRouter};
pub use session::{CollaborationSession, SessionStatus};
