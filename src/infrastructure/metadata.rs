//! Parameter sources for dynamic pipelines
//!
//! A parameter key resolves to a single string. Outside CI the value comes
//! from an environment variable derived from the key; inside CI it comes
//! from build meta-data through the agent. Lookups never fail: anything
//! that goes wrong yields an empty string.

use super::agent::BuildkiteAgent;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Resolves parameter keys to raw string values
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Value of `key`, empty when unset
    async fn get(&self, key: &str) -> String;
}

/// Converts a parameter key to an environment variable name
///
/// Upper-cases the key and replaces each run of separator characters
/// (`- ./\,:;(){}[]`) with a single underscore.
#[must_use]
pub fn to_env_var(key: &str) -> String {
    static SEPARATORS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[- ./\\,:;(){}\[\]]+").unwrap());

    SEPARATORS
        .replace_all(&key.to_uppercase(), "_")
        .into_owned()
}

/// Reads parameters from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvParameterSource;

#[async_trait]
impl ParameterSource for EnvParameterSource {
    async fn get(&self, key: &str) -> String {
        std::env::var(to_env_var(key)).unwrap_or_default()
    }
}

/// Reads parameters from build meta-data
#[derive(Debug, Clone, Default)]
pub struct AgentMetadataSource {
    agent: BuildkiteAgent,
}

impl AgentMetadataSource {
    /// Creates a source backed by `agent`
    #[must_use]
    pub fn new(agent: BuildkiteAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl ParameterSource for AgentMetadataSource {
    async fn get(&self, key: &str) -> String {
        match self.agent.metadata_exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key, "Meta-data key does not exist");
                return String::new();
            }
            Err(err) => {
                debug!(key, error = %err, "Meta-data lookup failed");
                return String::new();
            }
        }

        self.agent.metadata_get(key).await.unwrap_or_else(|err| {
            debug!(key, error = %err, "Meta-data lookup failed");
            String::new()
        })
    }
}

/// Fixed in-memory parameter values
#[derive(Debug, Clone, Default)]
pub struct StaticParameterSource {
    values: HashMap<String, String>,
}

impl StaticParameterSource {
    /// Creates an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `key`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for StaticParameterSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl ParameterSource for StaticParameterSource {
    async fn get(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("services"), "SERVICES");
        assert_eq!(to_env_var("deploy-targets"), "DEPLOY_TARGETS");
        assert_eq!(to_env_var("a.b/c\\d"), "A_B_C_D");
        assert_eq!(to_env_var("list (x, y)"), "LIST_X_Y_");
        assert_eq!(to_env_var("k8s:[ns]{a};b"), "K8S_NS_A_B");
    }

    #[tokio::test]
    async fn test_env_source_reads_derived_name() {
        let source = EnvParameterSource;
        assert_eq!(source.get("path").await, std::env::var("PATH").unwrap_or_default());
        assert_eq!(source.get("kiteline-unset-parameter").await, "");
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticParameterSource::new().with("services", "api,web");
        assert_eq!(source.get("services").await, "api,web");
        assert_eq!(source.get("other").await, "");

        let collected: StaticParameterSource = [("a", "1")].into_iter().collect();
        assert_eq!(collected.get("a").await, "1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_agent_source_missing_key_is_empty() {
        let source = AgentMetadataSource::new(BuildkiteAgent::with_binary("false"));
        assert_eq!(source.get("services").await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_agent_source_unavailable_agent_is_empty() {
        let source = AgentMetadataSource::new(BuildkiteAgent::with_binary("kiteline-no-such-agent"));
        assert_eq!(source.get("services").await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_agent_source_reads_value() {
        let source = AgentMetadataSource::new(BuildkiteAgent::with_binary("echo"));
        assert_eq!(source.get("services").await, "meta-data get services");
    }
}
