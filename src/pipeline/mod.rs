//! Pipeline domain types and logic
//!
//! The object model ([`Document`], [`Step`] and friends), the builder
//! contract ([`Pipeline`], [`BasePipeline`], [`DynamicPipeline`]), shared
//! configuration and the name-based [`PipelineRegistry`].

pub mod base;
pub mod config;
pub mod context;
pub mod document;
pub mod dynamic;
pub mod errors;
pub mod registry;
pub mod steps;

pub use base::{BasePipeline, FromContext, Pipeline};
pub use config::{ConfigStore, PipelineConfig};
pub use context::BuildContext;
pub use document::{Document, EnvVars, GitHubContext, Notify, SlackTarget};
pub use dynamic::{DynamicPipeline, split_param_value};
pub use errors::{ConfigError, PipelineError};
pub use registry::{
    Export, PipelineConstructor, PipelineRegistry, PipelineSource, SharedRegistry, SourceKind,
    UNKNOWN_PIPELINE_NAME, constructor_of, derive_pipeline_name,
};
pub use steps::{
    Agents, AutomaticRetry, AutomaticRetryRule, BlockStep, BlockedState, BoolOrString,
    CommandStep, CommandType, CommonStepOptions, ConcurrencyMethod, Dependency, DependsOn,
    ExitStatus, Field, GroupStep, InputStep, ManualRetry, ManualRetryRule, Matrix,
    MatrixAdjustment, MatrixConfig, MatrixSetup, MatrixValue, MatrixWith, RetryConfig,
    SelectOption, SignalReason, SoftFail, SoftFailConfig, Step, StringOrList, TriggerBuild,
    TriggerStep, WaitStep,
};
