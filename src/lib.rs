//! # Kiteline - Buildkite pipelines written in Rust
//!
//! Kiteline assembles Buildkite pipeline documents from typed Rust
//! builders. Each pipeline definition unit declares a builder, the
//! registry resolves a requested name to it, and the generated document
//! is written as JSON and optionally uploaded through `buildkite-agent`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kiteline::prelude::*;
//!
//! pub struct ReleasePipeline {
//!     base: BasePipeline,
//! }
//!
//! impl FromContext for ReleasePipeline {
//!     fn from_context(context: &BuildContext) -> Self {
//!         Self { base: BasePipeline::new(context) }
//!     }
//! }
//!
//! #[async_trait]
//! impl Pipeline for ReleasePipeline {
//!     async fn build(&mut self) -> Result<Document, PipelineError> {
//!         self.base.add_command_step(command!(":rust: Test", "cargo test"));
//!         Ok(self.base.to_document())
//!     }
//! }
//!
//! pub fn source() -> PipelineSource {
//!     pipeline_source!(ReleasePipeline)
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed step model**: command, wait, trigger, block, input and group steps
//! - **Shared configuration**: common `env` and plugins loaded once per run
//! - **Dynamic pipelines**: one step per value of a runtime parameter list
//! - **Self-registration**: definition units declare their own exports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod macros;

pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use infrastructure::{
    AgentMetadataSource, BuildkiteAgent, EnvParameterSource, ParameterSource, Settings,
    StaticParameterSource, init_logging,
};
pub use pipeline::{
    BasePipeline, BuildContext, CommandStep, ConfigStore, Document, DynamicPipeline, FromContext,
    Pipeline, PipelineConfig, PipelineError, PipelineRegistry, PipelineSource, SharedRegistry,
    SourceKind, Step,
};

/// Version of the kiteline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
