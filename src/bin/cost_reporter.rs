use anyhow::Context as _;
use aws_chores::config::CostReportConfig;
use aws_chores::cost_explorer_client::CostExplorerCostClient;
use aws_chores::cost_reporter::run_report;
use aws_chores::webhook::WebhookNotifier;
use aws_chores::{invocation, logging};
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    lambda_runtime::run(service_fn(report_handler)).await
}

async fn report_handler(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = CostReportConfig::from_env().context("loading cost report configuration")?;
    let source = CostExplorerCostClient::new();
    let notifier = WebhookNotifier::new(config.webhook_url.clone());

    let outcome = run_report(&config, &source, &notifier, Utc::now())
        .await
        .context("building cost report")?;

    let message = if outcome.delivered {
        "AWS cost report sent"
    } else {
        "AWS cost report built but not delivered"
    };
    Ok(invocation::success(message, &outcome)?)
}
