use std::collections::BTreeSet;
use std::ops::Add;

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::error::{ChoreError, Result};
use crate::time_range::TimeRange;

pub const DEFAULT_CURRENCY: &str = "USD";

/// One day of unblended cost as reported by the billing API.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCost {
    pub date: String,
    pub amount: BigDecimal,
    pub currency: String,
}

impl DailyCost {
    /// Missing amounts count as zero and a missing unit as `USD`.
    pub fn parse(date: String, amount: Option<&str>, currency: Option<&str>) -> Result<Self> {
        let amount = match amount {
            Some(raw) => raw
                .trim()
                .parse::<BigDecimal>()
                .map_err(|_| ChoreError::InvalidAmount(raw.to_string()))?,
            None => BigDecimal::from(0),
        };
        Ok(DailyCost {
            date,
            amount,
            currency: currency.unwrap_or(DEFAULT_CURRENCY).to_string(),
        })
    }

    pub fn amount_f64(&self) -> Result<f64> {
        self.amount.to_f64().ok_or(ChoreError::ToPrimitive)
    }
}

#[derive(Debug, PartialEq)]
pub struct CostSummary {
    pub total: f64,
    pub currency: String,
    pub days: Vec<DailyCost>,
    pub period: TimeRange,
}

impl CostSummary {
    /// Sums the daily amounts exactly and reports the currency of the last day.
    pub fn aggregate(days: Vec<DailyCost>, period: TimeRange) -> Result<Self> {
        let total = days
            .iter()
            .fold(BigDecimal::from(0), |total, day| total.add(&day.amount));
        let currency = days
            .last()
            .map_or(DEFAULT_CURRENCY.to_string(), |day| day.currency.clone());

        let currencies: BTreeSet<&str> = days.iter().map(|day| day.currency.as_str()).collect();
        if currencies.len() > 1 {
            tracing::warn!(
                currencies = ?currencies,
                reported = %currency,
                "cost window spans more than one currency"
            );
        }

        Ok(CostSummary {
            total: total.to_f64().ok_or(ChoreError::ToPrimitive)?,
            currency,
            days,
            period,
        })
    }
}

#[derive(Debug, PartialEq)]
pub struct Forecast {
    pub amount: f64,
    pub currency: String,
}

impl Default for Forecast {
    fn default() -> Self {
        Self {
            amount: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
