//! Infrastructure layer
//!
//! This module contains external integrations and adapters: the agent CLI,
//! parameter sources, settings, logging and output files.

mod agent;
mod config;
mod logging;
mod metadata;
mod output;

pub use agent::{BuildkiteAgent, DEFAULT_AGENT_BINARY};
pub use config::{BASE_DIR_ENV, CONFIG_FILE_NAMES, Settings, is_ci};
pub use logging::init_logging;
pub use metadata::{
    AgentMetadataSource, EnvParameterSource, ParameterSource, StaticParameterSource, to_env_var,
};
pub use output::write_generated;
