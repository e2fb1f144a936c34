use async_trait::async_trait;
use rusoto_ce::{
    CostExplorer, CostExplorerClient, DateInterval, GetCostAndUsageRequest,
    GetCostForecastRequest, ResultByTime,
};
use rusoto_core::Region;

use crate::cost::{CostSummary, DailyCost, Forecast};
use crate::error::{ChoreError, Result};
use crate::time_range::TimeRange;

const COST_METRIC: &str = "UnblendedCost";
const FORECAST_METRIC: &str = "UNBLENDED_COST";

#[async_trait]
pub trait CostSource {
    async fn recent_cost(&self, time_range: &TimeRange) -> Result<CostSummary>;
    async fn forecast(&self, time_range: &TimeRange) -> Result<Forecast>;
}

pub struct CostExplorerCostClient {
    client: CostExplorerClient,
}

#[async_trait]
impl CostSource for CostExplorerCostClient {
    async fn recent_cost(&self, time_range: &TimeRange) -> Result<CostSummary> {
        let response = self
            .client
            .get_cost_and_usage(GetCostAndUsageRequest {
                time_period: date_interval(time_range),
                granularity: "DAILY".to_string(),
                metrics: vec![COST_METRIC.to_string()],
                ..Default::default()
            })
            .await?;
        let days = self.daily_costs(response.results_by_time)?;
        CostSummary::aggregate(days, *time_range)
    }

    async fn forecast(&self, time_range: &TimeRange) -> Result<Forecast> {
        let response = self
            .client
            .get_cost_forecast(GetCostForecastRequest {
                time_period: date_interval(time_range),
                granularity: "MONTHLY".to_string(),
                metric: FORECAST_METRIC.to_string(),
                ..Default::default()
            })
            .await?;
        let total = response.total.ok_or(ChoreError::NoneValue("forecast total"))?;
        let amount = total
            .amount
            .ok_or(ChoreError::NoneValue("forecast amount"))?;
        Ok(Forecast {
            amount: amount
                .trim()
                .parse::<f64>()
                .map_err(|_| ChoreError::InvalidAmount(amount.clone()))?,
            currency: total.unit.ok_or(ChoreError::NoneValue("forecast unit"))?,
        })
    }
}

impl CostExplorerCostClient {
    /// Cost Explorer is only served from us-east-1.
    pub fn new() -> Self {
        Self::new_with_client(CostExplorerClient::new(Region::UsEast1))
    }

    fn new_with_client(client: CostExplorerClient) -> Self {
        CostExplorerCostClient { client }
    }

    fn daily_costs(&self, results: Option<Vec<ResultByTime>>) -> Result<Vec<DailyCost>> {
        let results = results.unwrap_or_default();
        let mut days = Vec::with_capacity(results.len());
        for result in results {
            let date = result
                .time_period
                .ok_or(ChoreError::NoneValue("result time period"))?
                .start;
            let metric = result
                .total
                .and_then(|mut total| total.remove(COST_METRIC));
            let (amount, unit) = metric.map_or((None, None), |metric| (metric.amount, metric.unit));
            days.push(DailyCost::parse(date, amount.as_deref(), unit.as_deref())?);
        }
        Ok(days)
    }
}

impl Default for CostExplorerCostClient {
    fn default() -> Self {
        Self::new()
    }
}

fn date_interval(time_range: &TimeRange) -> DateInterval {
    DateInterval {
        start: time_range.start_label(),
        end: time_range.end_label(),
    }
}

#[cfg(test)]
mod tests {
    use crate::cost::Forecast;
    use crate::cost_explorer_client::{CostExplorerCostClient, CostSource};
    use crate::error::ChoreError;
    use crate::time_range::TimeRange;
    use chrono::NaiveDate;
    use rusoto_ce::{CostExplorerClient, DateInterval, MetricValue, ResultByTime};
    use rusoto_core::Region;
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader, ReadMockResponse,
    };
    use std::collections::HashMap;

    fn mock_client(status: u16, dir: &str, file: &str) -> CostExplorerCostClient {
        let mock = CostExplorerClient::new_with(
            MockRequestDispatcher::with_status(status)
                .with_body(&*MockResponseReader::read_response(dir, file)),
            MockCredentialsProvider,
            Region::UsEast1,
        );
        CostExplorerCostClient::new_with_client(mock)
    }

    fn week() -> TimeRange {
        TimeRange::trailing_days(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), 7).unwrap()
    }

    #[tokio::test]
    async fn test_recent_cost() {
        let client = mock_client(200, "test_resources/valid", "get_cost_and_usage.json");
        let summary = client.recent_cost(&week()).await.unwrap();

        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0].date, "2024-06-03");
        assert_eq!(summary.days[6].date, "2024-06-09");
        assert_eq!(summary.total, 21.5);
        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.period, week());
    }

    #[tokio::test]
    async fn test_recent_cost_error() {
        let client = mock_client(400, "test_resources/error", "get_cost_and_usage.json");
        let result = client.recent_cost(&week()).await;

        assert!(matches!(result, Err(ChoreError::GetCostAndUsage(_))));
    }

    fn month_from_june_10th() -> TimeRange {
        TimeRange::rest_of_month(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_forecast() {
        let client = mock_client(200, "test_resources/valid", "get_cost_forecast.json");
        let range = month_from_june_10th();
        let forecast = client.forecast(&range).await.unwrap();

        assert_eq!(
            forecast,
            Forecast {
                amount: 123.5,
                currency: "USD".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_forecast_error() {
        let client = mock_client(400, "test_resources/error", "get_cost_forecast.json");
        let range = month_from_june_10th();
        let result = client.forecast(&range).await;

        assert!(matches!(result, Err(ChoreError::GetCostForecast(_))));
    }

    #[tokio::test]
    async fn test_daily_costs_when_metric_missing() {
        let client = CostExplorerCostClient::new();
        let mut total = HashMap::new();
        total.insert(
            "UnblendedCost".to_string(),
            MetricValue {
                amount: Some("2.5".to_string()),
                unit: Some("USD".to_string()),
            },
        );
        let days = client
            .daily_costs(Some(vec![
                ResultByTime {
                    time_period: Some(DateInterval {
                        start: "2024-06-03".to_string(),
                        end: "2024-06-04".to_string(),
                    }),
                    total: None,
                    ..Default::default()
                },
                ResultByTime {
                    time_period: Some(DateInterval {
                        start: "2024-06-04".to_string(),
                        end: "2024-06-05".to_string(),
                    }),
                    total: Some(total),
                    ..Default::default()
                },
            ]))
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].amount_f64().unwrap(), 0.0);
        assert_eq!(days[0].currency, "USD");
        assert_eq!(days[1].amount_f64().unwrap(), 2.5);
    }

    #[tokio::test]
    async fn test_daily_costs_without_time_period() {
        let client = CostExplorerCostClient::new();
        let result = client.daily_costs(Some(vec![ResultByTime::default()]));

        assert!(matches!(result, Err(ChoreError::NoneValue(_))));
    }
}
