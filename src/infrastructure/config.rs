//! Generator settings

use super::agent::{BuildkiteAgent, DEFAULT_AGENT_BINARY};
use super::metadata::{AgentMetadataSource, EnvParameterSource, ParameterSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the default base directory
pub const BASE_DIR_ENV: &str = "BUILDKITE_TS_DIR";

/// Configuration file names tried in order
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

/// Settings of a generator run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the configuration file and generated output
    pub base_dir: PathBuf,
    /// Name of the generated-output directory inside `base_dir`
    pub generated_dir: String,
    /// Agent binary used for meta-data and uploads
    pub agent_binary: String,
    /// Log level
    pub log_level: String,
    /// Running inside CI
    pub ci: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(".buildkite"),
            generated_dir: ".generated".to_string(),
            agent_binary: DEFAULT_AGENT_BINARY.to_string(),
            log_level: "info".to_string(),
            ci: false,
        }
    }
}

impl Settings {
    /// Defaults adjusted from `BUILDKITE_TS_DIR` and `CI`
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(dir) = std::env::var(BASE_DIR_ENV) {
            if !dir.is_empty() {
                settings.base_dir = PathBuf::from(dir);
            }
        }
        settings.ci = is_ci();
        settings
    }

    /// Directory generated documents are written to
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.generated_dir)
    }

    /// First existing configuration file, or the preferred name if none exists
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        find_config_file(&self.base_dir)
    }

    /// Agent handle for these settings
    #[must_use]
    pub fn agent(&self) -> BuildkiteAgent {
        BuildkiteAgent::with_binary(&self.agent_binary)
    }

    /// Parameter source matching the execution context
    #[must_use]
    pub fn parameter_source(&self) -> Arc<dyn ParameterSource> {
        if self.ci {
            Arc::new(AgentMetadataSource::new(self.agent()))
        } else {
            Arc::new(EnvParameterSource)
        }
    }
}

/// Returns true when `CI` is set to `true`
#[must_use]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok_and(|value| value == "true")
}

fn find_config_file(base_dir: &Path) -> PathBuf {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| base_dir.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| base_dir.join(CONFIG_FILE_NAMES[0]))
}
