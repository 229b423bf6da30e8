//! Declarative macros for pipeline definitions
//!
//! `pipeline_source!` is how a definition unit registers itself: it records
//! the unit's own file as the location and declares its exports.

/// Declares the exports of the current pipeline definition unit
///
/// ```ignore
/// pub fn source() -> PipelineSource {
///     pipeline_source!(ReleasePipeline)
/// }
/// ```
///
/// Extra identifiers after the pipeline type are declared as plain value
/// exports. `pipeline_source!(@values a, b)` declares a unit without any
/// pipeline export.
#[macro_export]
macro_rules! pipeline_source {
    (@values $($value:ident),* $(,)?) => {
        $crate::pipeline::PipelineSource::new(file!())
            $(.export_value(stringify!($value)))*
    };
    ($pipeline:ty $(, $value:ident)* $(,)?) => {
        $crate::pipeline::PipelineSource::new(file!())
            .export_pipeline::<$pipeline>(stringify!($pipeline))
            $(.export_value(stringify!($value)))*
    };
}

/// Creates a command step
#[macro_export]
macro_rules! command {
    ($cmd:expr) => {
        $crate::pipeline::CommandStep::new($cmd)
    };
    ($label:expr, $cmd:expr) => {
        $crate::pipeline::CommandStep::new($cmd).with_label($label)
    };
}

/// Creates a wait step
#[macro_export]
macro_rules! wait {
    () => {
        $crate::pipeline::WaitStep::new()
    };
}

/// Creates a block step
#[macro_export]
macro_rules! block {
    ($label:expr) => {
        $crate::pipeline::BlockStep::new($label)
    };
}

/// Creates a list of steps from anything convertible into a step
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {
        vec![$($crate::pipeline::Step::from($step)),*]
    };
}
