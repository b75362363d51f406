//! Shared fixtures for the a2a-collab integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use a2a_bridge::{AdapterAgent, Executor};
use a2a_collab::{AgentRegistry, TaskRouter};

/// Prefixes its input with its own name
pub struct Labeler {
    name: String,
    delay: Option<Duration>,
}

impl Labeler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delay: None,
        }
    }

    pub fn slow(name: &str, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl Executor for Labeler {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Labels its input"
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("{} did: {}", self.name, input))
    }
}

/// Fails on every input
pub struct Refuser;

#[async_trait]
impl Executor for Refuser {
    fn name(&self) -> &str {
        "refuser"
    }

    fn description(&self) -> &str {
        "Refuses every task"
    }

    async fn execute(&self, _input: &str) -> anyhow::Result<String> {
        anyhow::bail!("refused")
    }
}

pub fn specialist(id: &str, capabilities: &[&str], tools: &[&str]) -> Arc<AdapterAgent<Labeler>> {
    Arc::new(
        AdapterAgent::builder(Labeler::new(id))
            .capabilities(capabilities.iter().copied())
            .tools(tools.iter().copied())
            .build(),
    )
}

pub async fn hub(agents: Vec<Arc<dyn a2a_core::A2AAgent>>) -> (Arc<AgentRegistry>, Arc<TaskRouter>) {
    let registry = Arc::new(AgentRegistry::new());
    for agent in agents {
        registry.register(agent).await.unwrap();
    }
    let router = Arc::new(TaskRouter::new(registry.clone()));
    (registry, router)
}
