use serde::{Deserialize, Serialize};

/// Adapter configuration, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Added as `user-agent` to requests that do not set one themselves.
    pub user_agent: Option<String>,
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// The configured user agent, ignoring blank values.
    pub fn effective_user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
    }
}
