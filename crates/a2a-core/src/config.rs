//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `a2a-hub.toml` configuration file
//! 3. Defaults
//!
//! `${VAR_NAME}` references inside the configuration file are expanded from
//! the environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::Error;

/// Default configuration file looked up by [`HubConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "a2a-hub.toml";

/// Scoring policy used by the task router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    /// Rank by how many required tools an agent declares
    Capability,
    /// Rank by current in-flight load
    Load,
    /// Rank by historical success rate and response time
    Performance,
    /// Weighted blend of all of the above plus reputation
    #[default]
    Hybrid,
}

impl RoutingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capability => "capability",
            Self::Load => "load",
            Self::Performance => "performance",
            Self::Hybrid => "hybrid",
        }
    }
}

impl FromStr for RoutingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "capability" => Ok(Self::Capability),
            "load" => Ok(Self::Load),
            "performance" => Ok(Self::Performance),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::Config(format!("Unknown routing strategy: {}", other))),
        }
    }
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights of the hybrid score. They should sum to 1 for scores to stay
/// comparable across configurations, but nothing enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    #[serde(default = "default_capability_weight")]
    pub capability: f64,
    #[serde(default = "default_load_weight")]
    pub load: f64,
    #[serde(default = "default_performance_weight")]
    pub performance: f64,
    #[serde(default = "default_reputation_weight")]
    pub reputation: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            capability: default_capability_weight(),
            load: default_load_weight(),
            performance: default_performance_weight(),
            reputation: default_reputation_weight(),
        }
    }
}

impl HybridWeights {
    pub fn sum(&self) -> f64 {
        self.capability + self.load + self.performance + self.reputation
    }
}

fn default_capability_weight() -> f64 {
    0.4
}

fn default_load_weight() -> f64 {
    0.3
}

fn default_performance_weight() -> f64 {
    0.2
}

fn default_reputation_weight() -> f64 {
    0.1
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterConfig {
    #[serde(default)]
    pub strategy: RoutingStrategy,

    #[serde(default)]
    pub weights: HybridWeights,
}

/// How the coordinator picks the agent that executes a subtask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Each subtask runs on the agent the router picked for it
    #[default]
    Assigned,
    /// Each subtask runs on an arbitrary session participant
    AnyParticipant,
}

impl FromStr for DispatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assigned" => Ok(Self::Assigned),
            "any_participant" | "any-participant" => Ok(Self::AnyParticipant),
            other => Err(Error::Config(format!("Unknown dispatch mode: {}", other))),
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Abort in-flight subtasks as soon as one fails
    #[serde(default)]
    pub fail_fast: bool,

    /// Maximum subtasks dispatched at once (0 = unbounded)
    #[serde(default)]
    pub max_concurrency: usize,

    /// Feed load and outcome metrics back to the router around each dispatch
    #[serde(default)]
    pub track_metrics: bool,

    #[serde(default)]
    pub dispatch: DispatchMode,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_concurrency: 0,
            track_metrics: false,
            dispatch: DispatchMode::Assigned,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Main configuration for a2a-hub
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HubConfig {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HubConfig {
    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unknown variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse configuration from a TOML string, without env overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let toml: TomlConfig = toml::from_str(&expanded)?;
        Self::from_toml_config(toml)
    }

    /// Load configuration from a TOML file, then apply env overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides()?;

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Load configuration from the default locations.
    ///
    /// Reads `.env` if present, then `./a2a-hub.toml` if present, otherwise
    /// falls back to defaults plus environment variables.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        debug!("No {} found, using defaults and environment", DEFAULT_CONFIG_FILE);
        Self::from_env()
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn from_toml_config(toml: TomlConfig) -> crate::Result<Self> {
        let router = toml.router.unwrap_or_default();
        let strategy = match router.strategy {
            Some(s) => s.parse()?,
            None => RoutingStrategy::default(),
        };

        let coordinator = toml.coordinator.unwrap_or_default();
        let dispatch = match coordinator.dispatch {
            Some(d) => d.parse()?,
            None => DispatchMode::default(),
        };

        let logging = toml.logging.unwrap_or_default();

        Ok(HubConfig {
            router: RouterConfig {
                strategy,
                weights: router.weights.unwrap_or_default(),
            },
            coordinator: CoordinatorConfig {
                fail_fast: coordinator.fail_fast.unwrap_or(false),
                max_concurrency: coordinator.max_concurrency.unwrap_or(0),
                track_metrics: coordinator.track_metrics.unwrap_or(false),
                dispatch,
            },
            logging: LoggingConfig {
                filter: logging.filter.unwrap_or_else(default_log_filter),
            },
        })
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) -> crate::Result<()> {
        if let Ok(strategy) = std::env::var("A2A_ROUTING_STRATEGY") {
            if !strategy.is_empty() {
                self.router.strategy = strategy.parse()?;
                debug!("Routing strategy overridden by environment: {}", self.router.strategy);
            }
        }

        if let Ok(fail_fast) = std::env::var("A2A_FAIL_FAST") {
            self.coordinator.fail_fast = parse_bool(&fail_fast);
        }

        if let Ok(max) = std::env::var("A2A_MAX_CONCURRENCY") {
            self.coordinator.max_concurrency = max
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid A2A_MAX_CONCURRENCY: {}", e)))?;
        }

        if let Ok(track) = std::env::var("A2A_TRACK_METRICS") {
            self.coordinator.track_metrics = parse_bool(&track);
        }

        if let Ok(dispatch) = std::env::var("A2A_DISPATCH") {
            if !dispatch.is_empty() {
                self.coordinator.dispatch = dispatch.parse()?;
            }
        }

        if let Ok(filter) = std::env::var("A2A_LOG") {
            if !filter.is_empty() {
                self.logging.filter = filter;
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// ============================================================================
// TOML file layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    router: Option<TomlRouterConfig>,
    coordinator: Option<TomlCoordinatorConfig>,
    logging: Option<TomlLoggingConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlRouterConfig {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    weights: Option<HybridWeights>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlCoordinatorConfig {
    #[serde(default)]
    fail_fast: Option<bool>,
    #[serde(default)]
    max_concurrency: Option<usize>,
    #[serde(default)]
    track_metrics: Option<bool>,
    #[serde(default)]
    dispatch: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLoggingConfig {
    #[serde(default)]
    filter: Option<String>,
}
