//! Bundled pipeline definition units
//!
//! Each unit lives in `<name>.pipeline.rs` or `<name>.steps.rs` and exposes
//! a `source()` declaring its exports.

#[path = "deploy.steps.rs"]
pub mod deploy;
#[path = "example.pipeline.rs"]
pub mod example;
#[path = "release.pipeline.rs"]
pub mod release;

use kiteline::pipeline::PipelineSource;

/// Every bundled unit
pub fn catalog() -> Vec<PipelineSource> {
    vec![release::source(), example::source(), deploy::source()]
}
