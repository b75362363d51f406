//! Per-agent performance metrics kept by the router

use serde::Serialize;
use std::time::Duration;

/// Smoothing factor for the response-time moving average
pub const RESPONSE_TIME_ALPHA: f64 = 0.3;

/// Outcome history and in-flight load for one agent.
///
/// `success_rate == completed_tasks / total_tasks` whenever `total_tasks > 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentMetrics {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    /// Exponential moving average, in seconds
    pub avg_response_time: f64,
    pub success_rate: f64,
    pub current_load: u32,
}

impl AgentMetrics {
    /// Fold one finished task into the history
    pub fn record(&mut self, success: bool, response_time: Duration) {
        let sample = response_time.as_secs_f64();
        let first = self.total_tasks == 0;

        self.total_tasks += 1;
        if success {
            self.completed_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
        self.success_rate = self.completed_tasks as f64 / self.total_tasks as f64;

        self.avg_response_time = if first {
            sample
        } else {
            RESPONSE_TIME_ALPHA * sample + (1.0 - RESPONSE_TIME_ALPHA) * self.avg_response_time
        };
    }

    pub fn increment_load(&mut self) {
        self.current_load = self.current_load.saturating_add(1);
    }

    /// Floors at zero
    pub fn decrement_load(&mut self) {
        self.current_load = self.current_load.saturating_sub(1);
    }
}
