//! Deploy steps expanded from the `services` parameter

use kiteline::prelude::*;

/// Parameter listing the services to deploy
pub const SERVICES_KEY: &str = "services";

/// One deploy step per service, then a gate
pub struct DeploySteps {
    pipeline: DynamicPipeline,
}

impl FromContext for DeploySteps {
    fn from_context(context: &BuildContext) -> Self {
        Self {
            pipeline: DynamicPipeline::new(context),
        }
    }
}

#[async_trait]
impl Pipeline for DeploySteps {
    async fn build(&mut self) -> Result<Document, PipelineError> {
        self.pipeline.load_input_params([SERVICES_KEY]).await;
        self.pipeline.add_dynamic_step(
            |service| {
                CommandStep::new(format!("./scripts/deploy.sh {service}"))
                    .with_label(format!(":rocket: Deploy {service}"))
                    .with_env("SERVICE", service)
            },
            SERVICES_KEY,
        )?;
        self.pipeline.add_step(wait!());
        self.pipeline
            .add_step(block!(":white_check_mark: Confirm deployment"));
        Ok(self.pipeline.to_document())
    }
}

/// Exports of this unit
pub fn source() -> PipelineSource {
    pipeline_source!(DeploySteps, SERVICES_KEY)
}
