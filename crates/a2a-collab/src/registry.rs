//! Agent Registry
//!
//! In-process membership table: which agents exist, what they declared at
//! registration, and when they were last heard from. All state lives behind a
//! single read/write lock; lookups share it, mutations take it exclusively.
//! Agent calls are made before the lock is taken, never while holding it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use a2a_core::{A2AAgent, AgentCapabilities, AgentInfo, AgentStatus, AgentType, Error, Result};

/// An agent is unhealthy once it has been silent for longer than this
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry-owned record of one agent
#[derive(Clone)]
pub struct RegisteredAgent {
    pub agent: Arc<dyn A2AAgent>,
    pub info: AgentInfo,
    pub capabilities: AgentCapabilities,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Time between registration and the latest heartbeat
    pub uptime: Duration,
}

impl RegisteredAgent {
    fn new(agent: Arc<dyn A2AAgent>, info: AgentInfo, capabilities: AgentCapabilities) -> Self {
        let now = Utc::now();
        Self {
            agent,
            info,
            capabilities,
            registered_at: now,
            last_seen: now,
            uptime: Duration::ZERO,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
        self.uptime = (now - self.registered_at).to_std().unwrap_or_default();
    }

    fn health_at(&self, now: DateTime<Utc>) -> HealthReport {
        let silent = (now - self.last_seen).to_std().unwrap_or_default();
        let status = if silent > HEARTBEAT_TIMEOUT {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            agent_id: self.info.id.clone(),
            status,
            last_heartbeat: self.last_seen,
            uptime: self.uptime,
        }
    }
}

impl fmt::Debug for RegisteredAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAgent")
            .field("info", &self.info)
            .field("capabilities", &self.capabilities)
            .field("registered_at", &self.registered_at)
            .field("last_seen", &self.last_seen)
            .field("uptime", &self.uptime)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of a liveness check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub agent_id: String,
    pub status: HealthStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub uptime: Duration,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Membership table for registered agents
pub struct AgentRegistry {
    agents: RwLock<HashMap<String, RegisteredAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Register an agent under the id it reports.
    ///
    /// Info and capabilities are queried once and snapshotted. Registering an
    /// id that already exists replaces the previous record.
    pub async fn register(&self, agent: Arc<dyn A2AAgent>) -> Result<String> {
        let info = agent.info().await?;
        let capabilities = agent.capabilities().await?;
        let id = info.id.clone();

        info!("Registering agent: {} ({})", info.name, id);

        let record = RegisteredAgent::new(agent, info, capabilities);
        let mut agents = self.agents.write().await;
        if agents.insert(id.clone(), record).is_some() {
            debug!("Replaced existing registration for agent: {}", id);
        }

        Ok(id)
    }

    /// Remove an agent. Returns whether anything was removed.
    pub async fn unregister(&self, agent_id: &str) -> bool {
        let removed = self.agents.write().await.remove(agent_id).is_some();
        if removed {
            info!("Unregistered agent: {}", agent_id);
        }
        removed
    }

    pub async fn update_status(&self, agent_id: &str, status: AgentStatus) -> Result<()> {
        let mut agents = self.agents.write().await;
        let record = agents
            .get_mut(agent_id)
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))?;

        debug!("Agent {} status: {} -> {}", agent_id, record.info.status, status);
        record.info.status = status;
        record.last_seen = Utc::now();
        Ok(())
    }

    pub async fn find_by_id(&self, agent_id: &str) -> Result<Arc<dyn A2AAgent>> {
        self.agents
            .read()
            .await
            .get(agent_id)
            .map(|r| r.agent.clone())
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))
    }

    /// Agents declaring exactly this capability
    pub async fn find_by_capability(&self, capability: &str) -> Vec<Arc<dyn A2AAgent>> {
        self.agents
            .read()
            .await
            .values()
            .filter(|r| r.capabilities.has_capability(capability))
            .map(|r| r.agent.clone())
            .collect()
    }

    pub async fn find_by_type(&self, agent_type: AgentType) -> Vec<Arc<dyn A2AAgent>> {
        self.agents
            .read()
            .await
            .values()
            .filter(|r| r.info.agent_type == agent_type)
            .map(|r| r.agent.clone())
            .collect()
    }

    /// All registered agents, in no particular order
    pub async fn list_all(&self) -> Vec<Arc<dyn A2AAgent>> {
        self.agents
            .read()
            .await
            .values()
            .map(|r| r.agent.clone())
            .collect()
    }

    /// Copy of one registration record
    pub async fn get(&self, agent_id: &str) -> Result<RegisteredAgent> {
        self.agents
            .read()
            .await
            .get(agent_id)
            .cloned()
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))
    }

    /// Copies of every registration record, in no particular order
    pub async fn snapshot(&self) -> Vec<RegisteredAgent> {
        self.agents.read().await.values().cloned().collect()
    }

    /// Info recorded at registration, with the latest status applied
    pub async fn info(&self, agent_id: &str) -> Result<AgentInfo> {
        self.get(agent_id).await.map(|r| r.info)
    }

    /// Capabilities snapshot taken at registration
    pub async fn capabilities(&self, agent_id: &str) -> Result<AgentCapabilities> {
        self.get(agent_id).await.map(|r| r.capabilities)
    }

    pub async fn status(&self, agent_id: &str) -> Result<AgentStatus> {
        self.get(agent_id).await.map(|r| r.info.status)
    }

    pub async fn heartbeat(&self, agent_id: &str) -> Result<()> {
        let mut agents = self.agents.write().await;
        let record = agents
            .get_mut(agent_id)
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))?;
        record.touch(Utc::now());
        Ok(())
    }

    pub async fn check_health(&self, agent_id: &str) -> Result<HealthReport> {
        let agents = self.agents.read().await;
        let record = agents
            .get(agent_id)
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))?;
        Ok(record.health_at(Utc::now()))
    }

    pub async fn check_all_health(&self) -> Vec<HealthReport> {
        let now = Utc::now();
        self.agents
            .read()
            .await
            .values()
            .map(|r| r.health_at(now))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
