//! Scoring functions used by the router
//!
//! Each returns a value in roughly [0, 1]. The hybrid score is a weighted sum
//! and is only meaningful as a relative ranking.

use a2a_core::{AgentCapabilities, HybridWeights, RoutingStrategy, Task};

use crate::metrics::AgentMetrics;

/// Flat capability score for tasks that require no tools
pub const NO_REQUIREMENTS_SCORE: f64 = 0.8;
/// Score given to agents with no recorded history
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Load at which an agent scores zero on load
pub const MAX_LOAD: u32 = 10;
/// Response time at which the speed component bottoms out, in seconds
pub const SLOW_RESPONSE_SECS: f64 = 5.0;
/// Completed tasks needed for full reputation
pub const REPUTATION_TASKS: f64 = 100.0;

/// Fraction of required tools the agent declares
pub fn capability_score(task: &Task, capabilities: &AgentCapabilities) -> f64 {
    let required = task.required_tools();
    if required.is_empty() {
        return NO_REQUIREMENTS_SCORE;
    }

    let matched = required.iter().filter(|tool| capabilities.has_tool(tool)).count();
    matched as f64 / required.len() as f64
}

pub fn load_score(metrics: Option<&AgentMetrics>) -> f64 {
    match metrics {
        Some(m) => 1.0 - f64::from(m.current_load.min(MAX_LOAD)) / f64::from(MAX_LOAD),
        None => 1.0,
    }
}

pub fn performance_score(metrics: Option<&AgentMetrics>) -> f64 {
    match metrics {
        Some(m) => {
            let speed = (1.0 - m.avg_response_time / SLOW_RESPONSE_SECS).max(0.0);
            0.7 * m.success_rate + 0.3 * speed
        }
        None => NEUTRAL_SCORE,
    }
}

pub fn reputation_score(metrics: Option<&AgentMetrics>) -> f64 {
    match metrics {
        Some(m) => (m.completed_tasks as f64 / REPUTATION_TASKS).min(1.0),
        None => NEUTRAL_SCORE,
    }
}

pub fn hybrid_score(
    task: &Task,
    capabilities: &AgentCapabilities,
    metrics: Option<&AgentMetrics>,
    weights: &HybridWeights,
) -> f64 {
    capability_score(task, capabilities) * weights.capability
        + load_score(metrics) * weights.load
        + performance_score(metrics) * weights.performance
        + reputation_score(metrics) * weights.reputation
}

/// Score an agent under the given strategy
pub fn score(
    strategy: RoutingStrategy,
    task: &Task,
    capabilities: &AgentCapabilities,
    metrics: Option<&AgentMetrics>,
    weights: &HybridWeights,
) -> f64 {
    match strategy {
        RoutingStrategy::Capability => capability_score(task, capabilities),
        RoutingStrategy::Load => load_score(metrics),
        RoutingStrategy::Performance => performance_score(metrics),
        RoutingStrategy::Hybrid => hybrid_score(task, capabilities, metrics, weights),
    }
}
