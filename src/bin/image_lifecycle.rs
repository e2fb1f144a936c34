use anyhow::Context as _;
use aws_chores::config::ImageLifecycleConfig;
use aws_chores::image_client::Ec2ImageClient;
use aws_chores::image_lifecycle::run_lifecycle;
use aws_chores::{invocation, logging};
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    lambda_runtime::run(service_fn(lifecycle_handler)).await
}

async fn lifecycle_handler(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config =
        ImageLifecycleConfig::from_env().context("loading image lifecycle configuration")?;

    let report = run_lifecycle(&config, Utc::now().date_naive(), Ec2ImageClient::for_region)
        .await
        .context("running image lifecycle")?;

    let failures = report.failures();
    let message = if failures == 0 {
        tracing::info!(instances = report.instances.len(), "image lifecycle finished");
        "Image lifecycle finished".to_string()
    } else {
        tracing::warn!(
            instances = report.instances.len(),
            failures,
            "image lifecycle finished with failures"
        );
        format!("Image lifecycle finished with {} failed phase(s)", failures)
    };
    Ok(invocation::success(&message, &report)?)
}
