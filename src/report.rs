use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::cost::{CostSummary, Forecast};
use crate::error::Result;
use crate::time_range::date_label;

const REPORT_TITLE: &str = "💰 AWS Cost Report";
const REPORT_COLOR: u32 = 15844367;
const SEPARATOR: &str = "**━━━━━━━━━━━━━━━━━━**";

#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookMessage {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// Forecast figure together with the month it covers.
#[derive(Debug, PartialEq)]
pub struct MonthlyForecast {
    pub forecast: Forecast,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
}

pub fn daily_breakdown(summary: &CostSummary) -> Result<String> {
    let mut lines = Vec::with_capacity(summary.days.len());
    for day in &summary.days {
        lines.push(format!(
            "🗓 `{}` → **${:.2}** {}",
            day.date,
            day.amount_f64()?,
            day.currency
        ));
    }
    Ok(lines.join("\n\n"))
}

pub fn build_message(
    summary: &CostSummary,
    forecast: &MonthlyForecast,
    footer: &str,
    now: DateTime<Utc>,
) -> Result<WebhookMessage> {
    let breakdown = daily_breakdown(summary)?;
    let description = format!(
        "**Billing Period:** `{} → {}`",
        summary.period.start_label(),
        date_label(summary.period.last_day()?)
    );
    let breakdown_value = format!(
        "{}\n\n**Total:** ${:.2} {}\n\n{}",
        breakdown, summary.total, summary.currency, SEPARATOR
    );
    let forecast_value = format!(
        "Estimated: **${:.2}** {}\n\n📆 Billing Period: `{} → {}`\n\n{}",
        forecast.forecast.amount,
        forecast.forecast.currency,
        date_label(forecast.month_start),
        date_label(forecast.month_end),
        SEPARATOR
    );

    Ok(WebhookMessage {
        embeds: vec![Embed {
            title: REPORT_TITLE.to_string(),
            description,
            color: REPORT_COLOR,
            fields: vec![
                EmbedField {
                    name: "🎗️ **Daily Breakdown**".to_string(),
                    value: breakdown_value,
                    inline: false,
                },
                EmbedField {
                    name: "📈 **Forecasted Cost (This Month)**".to_string(),
                    value: forecast_value,
                    inline: false,
                },
            ],
            footer: EmbedFooter {
                text: footer.to_string(),
            },
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }],
    })
}
