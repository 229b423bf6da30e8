//! Shared pipeline configuration
//!
//! A configuration file carries environment variables and plugin
//! namespaces shared by every pipeline, plus any extra keys pipeline
//! authors want to share. It is loaded at most once per [`ConfigStore`];
//! loading is best-effort and falls back to the empty default.

use super::document::EnvVars;
use super::errors::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Shared settings applied across builders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Environment copied into every non-dynamic pipeline document, in file order
    #[serde(default, deserialize_with = "lenient_env")]
    pub env: EnvVars,

    /// Plugin namespace to plugin entry, in file order
    #[serde(default, deserialize_with = "lenient_plugins")]
    pub plugins: Map<String, Value>,

    /// Any other top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PipelineConfig {
    /// Creates an empty configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a shared environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Adds a plugin namespace
    #[must_use]
    pub fn with_plugin(mut self, namespace: impl Into<String>, plugin: Value) -> Self {
        self.plugins.insert(namespace.into(), plugin);
        self
    }

    /// Plugin entries shared by every command step, in namespace order
    pub fn common_plugins(&self) -> impl Iterator<Item = &Value> {
        self.plugins.values()
    }

    /// Looks up a caller-defined top-level key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Overlays the top-level keys of `loaded` onto this configuration
    ///
    /// The merge is shallow: a loaded key replaces the whole value. Scalar
    /// `env` values are stringified; `env` entries or whole `env`/`plugins`
    /// values of the wrong shape are dropped with a warning instead of
    /// failing the load.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the merged value cannot be rebuilt.
    pub fn overlay(&self, loaded: Map<String, Value>) -> Result<Self, ConfigError> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => return Err(ConfigError::Shape(value_kind(&other).to_string())),
        };
        for (key, value) in loaded {
            merged.insert(key, value);
        }
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Reads a YAML or JSON configuration file and overlays it on the default
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file is missing or malformed.
    pub async fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let loaded = parse_source(&content, is_json)?;
        Self::default().overlay(loaded)
    }
}

/// Parses file content and selects the configuration object in it.
///
/// A root `default` object wins over a root `config` object, which wins over
/// the root itself.
fn parse_source(content: &str, is_json: bool) -> Result<Map<String, Value>, ConfigError> {
    let root: Value = if is_json {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };

    let Value::Object(mut root) = root else {
        return Err(ConfigError::Shape(value_kind(&root).to_string()));
    };

    for export in ["default", "config"] {
        if matches!(root.get(export), Some(Value::Object(_))) {
            if let Some(Value::Object(selected)) = root.remove(export) {
                return Ok(selected);
            }
        }
    }
    Ok(root)
}

/// Reads `env` as string values, stringifying numbers and booleans
fn lenient_env<'de, D>(deserializer: D) -> Result<EnvVars, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(EnvVars::new()),
        other => {
            warn!(kind = value_kind(&other), "Ignoring env: expected a mapping");
            return Ok(EnvVars::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(_) => Some((key, value)),
            Value::Number(number) => Some((key, Value::String(number.to_string()))),
            Value::Bool(flag) => Some((key, Value::String(flag.to_string()))),
            other => {
                warn!(%key, kind = value_kind(&other), "Ignoring env entry: expected a scalar");
                None
            }
        })
        .collect())
}

/// Reads `plugins` as a mapping, treating null as empty
fn lenient_plugins<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(plugins) => Ok(plugins),
        Value::Null => Ok(Map::new()),
        other => {
            warn!(kind = value_kind(&other), "Ignoring plugins: expected a mapping");
            Ok(Map::new())
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One-shot holder of the shared configuration
///
/// The first call to [`load`](Self::load) decides the configuration for the
/// lifetime of the store, whether or not the file could be read. Concurrent
/// first calls wait for the single initializer.
#[derive(Debug, Default)]
pub struct ConfigStore {
    cell: OnceCell<Arc<PipelineConfig>>,
}

impl ConfigStore {
    /// Creates an uninitialized store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Creates a store already holding `config`
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(config))),
        }
    }

    /// Loads the configuration at `path` unless the store is initialized
    ///
    /// Never fails: a missing or malformed file leaves the default in place.
    pub async fn load(&self, path: impl AsRef<Path>) -> Arc<PipelineConfig> {
        let path = path.as_ref();
        self.cell
            .get_or_init(|| async {
                match PipelineConfig::from_path(path).await {
                    Ok(config) => {
                        debug!(path = %path.display(), "Configuration loaded");
                        Arc::new(config)
                    }
                    Err(ConfigError::Io { source, .. })
                        if source.kind() == std::io::ErrorKind::NotFound =>
                    {
                        debug!(path = %path.display(), "No configuration file, using defaults");
                        Arc::new(PipelineConfig::default())
                    }
                    Err(err) => {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "Could not load configuration. Proceeding without it"
                        );
                        Arc::new(PipelineConfig::default())
                    }
                }
            })
            .await
            .clone()
    }

    /// Current configuration, the empty default before the first load
    #[must_use]
    pub fn snapshot(&self) -> Arc<PipelineConfig> {
        self.cell.get().cloned().unwrap_or_default()
    }

    /// Returns true once a load has been attempted
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
