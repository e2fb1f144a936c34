use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::config::CostReportConfig;
use crate::cost::{CostSummary, Forecast};
use crate::cost_explorer_client::CostSource;
use crate::error::Result;
use crate::report::{build_message, MonthlyForecast};
use crate::time_range::{date_label, month_bounds, TimeRange};
use crate::webhook::Notify;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostReportOutcome {
    pub period_start: String,
    pub period_end: String,
    pub total: f64,
    pub currency: String,
    pub forecast: f64,
    pub forecast_currency: String,
    pub delivered: bool,
}

/// Cost of the `window_days` days before `today`. Errors are fatal to the report.
pub async fn fetch_recent_cost<C>(
    source: &C,
    today: NaiveDate,
    window_days: u32,
) -> Result<CostSummary>
where
    C: CostSource + ?Sized,
{
    let range = TimeRange::trailing_days(today, window_days)?;
    let summary = source.recent_cost(&range).await?;
    tracing::info!(
        start = %range.start_label(),
        end = %range.end_label(),
        days = summary.days.len(),
        total = summary.total,
        currency = %summary.currency,
        "fetched recent cost"
    );
    Ok(summary)
}

/// Forecast for the rest of the month. Falls back to zero when the billing API
/// cannot produce one, e.g. for accounts without enough history.
pub async fn fetch_forecast<C>(source: &C, today: NaiveDate) -> Result<MonthlyForecast>
where
    C: CostSource + ?Sized,
{
    let (month_start, month_end) = month_bounds(today)?;
    let range = TimeRange::rest_of_month(today)?;
    let forecast = match source.forecast(&range).await {
        Ok(forecast) => forecast,
        Err(error) => {
            tracing::warn!(%error, "cost forecast unavailable, reporting zero");
            Forecast::default()
        }
    };
    Ok(MonthlyForecast {
        forecast,
        month_start,
        month_end,
    })
}

pub async fn publish_report<N>(
    notifier: &N,
    summary: &CostSummary,
    forecast: &MonthlyForecast,
    footer: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    N: Notify + ?Sized,
{
    let message = build_message(summary, forecast, footer, now)?;
    notifier.notify(&message).await
}

pub async fn run_report<C, N>(
    config: &CostReportConfig,
    source: &C,
    notifier: &N,
    now: DateTime<Utc>,
) -> Result<CostReportOutcome>
where
    C: CostSource + ?Sized,
    N: Notify + ?Sized,
{
    let today = now.date_naive();
    let summary = fetch_recent_cost(source, today, config.window_days).await?;
    let forecast = fetch_forecast(source, today).await?;

    let delivered = match publish_report(notifier, &summary, &forecast, &config.footer, now).await {
        Ok(()) => {
            tracing::info!("cost report delivered");
            true
        }
        Err(error) => {
            tracing::warn!(%error, "cost report delivery failed");
            false
        }
    };

    Ok(CostReportOutcome {
        period_start: summary.period.start_label(),
        period_end: date_label(summary.period.last_day()?),
        total: summary.total,
        currency: summary.currency,
        forecast: forecast.forecast.amount,
        forecast_currency: forecast.forecast.currency,
        delivered,
    })
}
