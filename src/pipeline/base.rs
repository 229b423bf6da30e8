//! Pipeline builder contract
//!
//! Concrete pipelines own a [`BasePipeline`], append steps to it in their
//! desired order from [`Pipeline::build`], and return the finished
//! [`Document`].

use super::config::PipelineConfig;
use super::context::BuildContext;
use super::document::Document;
use super::errors::PipelineError;
use super::steps::{CommandStep, Step};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A builder producing one pipeline document
#[async_trait]
pub trait Pipeline: Send {
    /// Assembles the document
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] when the document cannot be assembled.
    async fn build(&mut self) -> Result<Document, PipelineError>;

    /// Builds the document and renders it as two-space indented JSON
    ///
    /// # Errors
    ///
    /// Propagates build and serialization errors.
    async fn generate_json(&mut self) -> Result<String, PipelineError> {
        let document = self.build().await?;
        document.to_json()
    }
}

/// Constructor capability of a registrable pipeline
pub trait FromContext: Sized {
    /// Creates the pipeline from the build context
    fn from_context(context: &BuildContext) -> Self;
}

/// In-progress document plus the shared configuration
#[derive(Debug, Clone)]
pub struct BasePipeline {
    document: Document,
    config: Arc<PipelineConfig>,
}

impl BasePipeline {
    /// Starts a document whose `env` is copied from the configuration
    #[must_use]
    pub fn new(context: &BuildContext) -> Self {
        Self {
            document: Document::with_env(context.config.env.clone()),
            config: Arc::clone(&context.config),
        }
    }

    /// Starts a document without an `env` section
    #[must_use]
    pub fn without_env(context: &BuildContext) -> Self {
        Self {
            document: Document::new(),
            config: Arc::clone(&context.config),
        }
    }

    /// Appends a step
    pub fn add_step(&mut self, step: impl Into<Step>) {
        self.document.steps.push(step.into());
    }

    /// Prepends every shared plugin to the step's own plugins
    ///
    /// Shared plugins come first in namespace order, followed by the step's
    /// plugins unchanged. Nothing is deduplicated.
    pub fn add_common_plugins(&self, step: &mut CommandStep) {
        let mut plugins: Vec<Value> = self.config.common_plugins().cloned().collect();
        plugins.extend(step.plugins.take().unwrap_or_default());
        step.plugins = Some(plugins);
    }

    /// Merges shared plugins into `step`, then appends it
    pub fn add_command_step(&mut self, mut step: CommandStep) {
        self.add_common_plugins(&mut step);
        self.add_step(step);
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Document assembled so far
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for document-level settings
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Copy of the document assembled so far
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.document.clone()
    }
}
