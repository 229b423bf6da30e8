//! Prelude module for common imports

// Re-export macros
pub use crate::{block, command, pipeline_source, steps, wait};

pub use async_trait::async_trait;

// Builder contract
pub use crate::pipeline::base::{BasePipeline, FromContext, Pipeline};
pub use crate::pipeline::context::BuildContext;
pub use crate::pipeline::dynamic::DynamicPipeline;
pub use crate::pipeline::errors::PipelineError;
pub use crate::pipeline::registry::PipelineSource;

// Object model
pub use crate::pipeline::document::{Document, Notify};
pub use crate::pipeline::steps::{
    Agents, BlockStep, CommandStep, Dependency, DependsOn, Field, GroupStep, InputStep,
    SelectOption, Step, TriggerStep, WaitStep,
};
