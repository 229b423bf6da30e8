//! Build context handed to pipeline constructors

use super::config::PipelineConfig;
use crate::infrastructure::{EnvParameterSource, ParameterSource};
use std::fmt;
use std::sync::Arc;

/// Everything a pipeline constructor may read
///
/// Builders receive the shared configuration and the parameter source
/// through this value instead of reading process-wide state.
#[derive(Clone)]
pub struct BuildContext {
    /// Shared configuration snapshot
    pub config: Arc<PipelineConfig>,
    /// Source of dynamic parameter values
    pub parameters: Arc<dyn ParameterSource>,
}

impl BuildContext {
    /// Creates a context reading parameters from the environment
    #[must_use]
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            config,
            parameters: Arc::new(EnvParameterSource),
        }
    }

    /// Replaces the parameter source
    #[must_use]
    pub fn with_parameters(mut self, parameters: Arc<dyn ParameterSource>) -> Self {
        self.parameters = parameters;
        self
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(Arc::new(PipelineConfig::default()))
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
