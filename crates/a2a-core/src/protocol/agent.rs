//! Agent identity and capability descriptors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Role an agent plays in a collaboration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    #[default]
    Assistant,
    Specialist,
    Coordinator,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Specialist => "specialist",
            Self::Coordinator => "coordinator",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability of an agent as seen by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Online,
    Busy,
    Offline,
    Maintenance,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Busy => "busy",
            Self::Offline => "offline",
            Self::Maintenance => "maintenance",
        }
    }

    /// Only online agents are eligible for routing
    pub fn is_routable(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive information an agent reports about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Unique identifier, the registry key
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub vendor: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub status: AgentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl AgentInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            version: "1.0.0".to_string(),
            vendor: String::new(),
            agent_type: AgentType::default(),
            status: AgentStatus::Online,
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What an agent can do. Snapshotted once at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Free-form capability labels, matched by exact string equality
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Tool names the agent can invoke
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub message_formats: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub max_concurrent_tasks: u32,
    pub avg_response_time: Duration,
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self {
            capabilities: vec![],
            tools: vec![],
            message_formats: vec!["text".to_string()],
            languages: vec!["en".to_string()],
            max_concurrent_tasks: 1,
            avg_response_time: Duration::from_secs(1),
        }
    }
}

impl AgentCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_concurrent_tasks(mut self, max: u32) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    pub fn with_avg_response_time(mut self, avg: Duration) -> Self {
        self.avg_response_time = avg;
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_info_builder() {
        let info = AgentInfo::new("agent-1", "Researcher")
            .with_description("Finds things")
            .with_type(AgentType::Specialist)
            .with_metadata("region", "eu");

        assert_eq!(info.id, "agent-1");
        assert_eq!(info.agent_type, AgentType::Specialist);
        assert_eq!(info.status, AgentStatus::Online);
        assert_eq!(info.metadata.get("region"), Some(&"eu".to_string()));
    }

    #[test]
    fn test_capability_matching_is_exact() {
        let caps = AgentCapabilities::new()
            .with_capabilities(["research"])
            .with_tools(["search"]);

        assert!(caps.has_capability("research"));
        assert!(!caps.has_capability("Research"));
        assert!(!caps.has_capability("res"));
        assert!(caps.has_tool("search"));
        assert!(!caps.has_tool("search_web"));
    }

    #[test]
    fn test_only_online_is_routable() {
        assert!(AgentStatus::Online.is_routable());
        assert!(!AgentStatus::Busy.is_routable());
        assert!(!AgentStatus::Offline.is_routable());
        assert!(!AgentStatus::Maintenance.is_routable());
    }

    #[test]
    fn test_agent_info_serializes_type_field() {
        let info = AgentInfo::new("a", "A").with_type(AgentType::Coordinator);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "coordinator");
        assert_eq!(json["status"], "online");
    }
}
