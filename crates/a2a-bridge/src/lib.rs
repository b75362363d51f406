//! a2a-bridge: run any executor as an a2a-hub agent
//!
//! Implement [`Executor`] for the thing that does the work, wrap it in an
//! [`AdapterAgent`], and register the adapter like any other agent.

pub mod adapter;
pub mod executor;
pub mod state;

pub use adapter::{AdapterAgent, AdapterAgentBuilder};
pub use executor::Executor;
pub use state::TaskState;
