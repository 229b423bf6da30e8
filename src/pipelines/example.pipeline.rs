//! Minimal example pipeline

use kiteline::prelude::*;

/// Two echo steps, the second fanned out
pub struct ExamplePipeline {
    base: BasePipeline,
}

impl FromContext for ExamplePipeline {
    fn from_context(context: &BuildContext) -> Self {
        Self {
            base: BasePipeline::new(context),
        }
    }
}

#[async_trait]
impl Pipeline for ExamplePipeline {
    async fn build(&mut self) -> Result<Document, PipelineError> {
        self.base
            .add_command_step(command!(":wave: Hello", "echo 'Hello from kiteline'"));
        self.base.add_command_step(
            command!(":zap: Parallel", "echo \"job $BUILDKITE_PARALLEL_JOB\"").with_parallelism(5),
        );
        Ok(self.base.to_document())
    }
}

/// Exports of this unit
pub fn source() -> PipelineSource {
    pipeline_source!(ExamplePipeline)
}
