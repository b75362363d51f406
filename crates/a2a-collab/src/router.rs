//! Task Router
//!
//! Picks agents for a task by scoring every registered, reachable, online
//! agent under a [`RoutingStrategy`]. Also owns the per-agent metrics that
//! callers feed back after dispatch; nothing updates them automatically.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use a2a_core::{A2AAgent, Error, HybridWeights, Result, RouterConfig, RoutingStrategy, Task};

use crate::metrics::AgentMetrics;
use crate::registry::{AgentRegistry, RegisteredAgent};
use crate::scoring;

/// A candidate agent and its score for one task
#[derive(Clone)]
pub struct ScoredAgent {
    pub agent_id: String,
    pub agent: Arc<dyn A2AAgent>,
    pub score: f64,
}

impl fmt::Debug for ScoredAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoredAgent")
            .field("agent_id", &self.agent_id)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

pub struct TaskRouter {
    registry: Arc<AgentRegistry>,
    strategy: RwLock<RoutingStrategy>,
    weights: HybridWeights,
    metrics: RwLock<HashMap<String, AgentMetrics>>,
}

impl TaskRouter {
    /// Create a router using the hybrid strategy and default weights
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self::with_config(registry, &RouterConfig::default())
    }

    pub fn with_config(registry: Arc<AgentRegistry>, config: &RouterConfig) -> Self {
        Self {
            registry,
            strategy: RwLock::new(config.strategy),
            weights: config.weights,
            metrics: RwLock::new(HashMap::new()),
        }
    }

    pub fn strategy(&self) -> RoutingStrategy {
        *self.strategy.read()
    }

    pub fn set_strategy(&self, strategy: RoutingStrategy) {
        *self.strategy.write() = strategy;
    }

    pub fn weights(&self) -> &HybridWeights {
        &self.weights
    }

    /// Best agent for the task under the configured strategy
    pub async fn route(&self, task: &Task) -> Result<Arc<dyn A2AAgent>> {
        self.route_with_strategy(task, self.strategy()).await
    }

    /// Best agent for the task under an explicit strategy.
    ///
    /// Only a strictly positive score can win; ties go to the first candidate
    /// encountered, and candidate order is unspecified.
    pub async fn route_with_strategy(
        &self,
        task: &Task,
        strategy: RoutingStrategy,
    ) -> Result<Arc<dyn A2AAgent>> {
        Ok(self.select(task, strategy).await?.agent)
    }

    /// Best agent for the task together with its registry id and score
    pub async fn route_scored(&self, task: &Task) -> Result<ScoredAgent> {
        self.select(task, self.strategy()).await
    }

    async fn select(&self, task: &Task, strategy: RoutingStrategy) -> Result<ScoredAgent> {
        let candidates = self.rank_unsorted(task, strategy).await?;

        let mut best: Option<ScoredAgent> = None;
        for candidate in candidates {
            let best_score = best.as_ref().map(|b| b.score).unwrap_or(0.0);
            if candidate.score > best_score {
                best = Some(candidate);
            }
        }

        let best = best.ok_or_else(|| Error::NoSuitableAgent {
            task_id: task.id.clone(),
        })?;

        debug!(
            "Routed task {} to agent {} (strategy: {}, score: {:.3})",
            task.id, best.agent_id, strategy, best.score
        );
        Ok(best)
    }

    /// Up to `count` distinct agents, best first
    pub async fn route_multiple(&self, task: &Task, count: usize) -> Result<Vec<Arc<dyn A2AAgent>>> {
        let ranked = self.rank(task, self.strategy()).await?;
        Ok(ranked.into_iter().take(count).map(|c| c.agent).collect())
    }

    /// Route by current load only, leaving the configured strategy untouched
    pub async fn route_with_load_balancing(&self, task: &Task) -> Result<Arc<dyn A2AAgent>> {
        self.route_with_strategy(task, RoutingStrategy::Load).await
    }

    /// Every eligible agent with its score, sorted by non-increasing score.
    ///
    /// Fails with `NoAgentsAvailable` when the registry is empty and with
    /// `NoSuitableAgent` when no agent is online and reachable.
    pub async fn rank(&self, task: &Task, strategy: RoutingStrategy) -> Result<Vec<ScoredAgent>> {
        let mut candidates = self.rank_unsorted(task, strategy).await?;
        // Stable sort keeps encounter order among equal scores
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(candidates)
    }

    /// Score one registered agent for a task under the configured strategy
    pub async fn score(&self, task: &Task, agent_id: &str) -> Result<f64> {
        let record = self.registry.get(agent_id).await?;
        let metrics = self.metrics(agent_id);
        Ok(scoring::score(
            self.strategy(),
            task,
            &record.capabilities,
            metrics.as_ref(),
            &self.weights,
        ))
    }

    async fn rank_unsorted(&self, task: &Task, strategy: RoutingStrategy) -> Result<Vec<ScoredAgent>> {
        let records = self.registry.snapshot().await;
        if records.is_empty() {
            return Err(Error::NoAgentsAvailable);
        }

        let mut eligible = Vec::with_capacity(records.len());
        for record in records {
            if self.is_eligible(&record).await {
                eligible.push(record);
            }
        }

        if eligible.is_empty() {
            return Err(Error::NoSuitableAgent {
                task_id: task.id.clone(),
            });
        }

        let metrics = self.metrics.read();
        Ok(eligible
            .into_iter()
            .map(|record| {
                let score = scoring::score(
                    strategy,
                    task,
                    &record.capabilities,
                    metrics.get(record.id()),
                    &self.weights,
                );
                ScoredAgent {
                    agent_id: record.info.id,
                    agent: record.agent,
                    score,
                }
            })
            .collect())
    }

    /// Online in the registry, reachable, and reporting itself online
    async fn is_eligible(&self, record: &RegisteredAgent) -> bool {
        if !record.info.status.is_routable() {
            debug!("Skipping agent {}: status {}", record.id(), record.info.status);
            return false;
        }

        match record.agent.info().await {
            Ok(info) if info.status.is_routable() => true,
            Ok(info) => {
                debug!("Skipping agent {}: reports status {}", record.id(), info.status);
                false
            }
            Err(e) => {
                warn!("Skipping agent {}: {}", record.id(), e);
                false
            }
        }
    }

    /// Record the outcome of a task executed by an agent
    pub fn update_metrics(&self, agent_id: &str, success: bool, response_time: Duration) {
        let mut metrics = self.metrics.write();
        metrics
            .entry(agent_id.to_string())
            .or_default()
            .record(success, response_time);
    }

    pub fn increment_load(&self, agent_id: &str) {
        self.metrics
            .write()
            .entry(agent_id.to_string())
            .or_default()
            .increment_load();
    }

    pub fn decrement_load(&self, agent_id: &str) {
        self.metrics
            .write()
            .entry(agent_id.to_string())
            .or_default()
            .decrement_load();
    }

    pub fn metrics(&self, agent_id: &str) -> Option<AgentMetrics> {
        self.metrics.read().get(agent_id).cloned()
    }

    pub fn all_metrics(&self) -> HashMap<String, AgentMetrics> {
        self.metrics.read().clone()
    }

    /// Forget an agent's history. Returns whether any existed.
    pub fn reset_metrics(&self, agent_id: &str) -> bool {
        self.metrics.write().remove(agent_id).is_some()
    }
}
