use chrono::{Datelike, Days, NaiveDate};

use crate::error::{ChoreError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open date window `[start, end)`, the shape Cost Explorer expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    /// The `days` full days before `today`, excluding `today` itself.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Result<Self> {
        Ok(TimeRange {
            start: days_before(today, days)?,
            end: today,
        })
    }

    /// From `today` up to and including the last day of its month.
    pub fn rest_of_month(today: NaiveDate) -> Result<Self> {
        let (_, last) = month_bounds(today)?;
        let end = last
            .succ_opt()
            .ok_or_else(|| ChoreError::InvalidDate(format!("day after {}", last)))?;
        Ok(TimeRange { start: today, end })
    }

    /// Last day that is inside the window.
    pub fn last_day(&self) -> Result<NaiveDate> {
        self.end
            .pred_opt()
            .ok_or_else(|| ChoreError::InvalidDate(format!("day before {}", self.end)))
    }

    pub fn start_label(&self) -> String {
        date_label(self.start)
    }

    pub fn end_label(&self) -> String {
        date_label(self.end)
    }
}

pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn days_before(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| ChoreError::InvalidDate(format!("{} minus {} days", date, days)))
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let first = date
        .with_day(1)
        .ok_or(ChoreError::NoneValue("first day of month"))?;
    let last = NaiveDate::from_ymd_opt(
        date.year(),
        date.month(),
        last_day_of_month(date.year(), date.month())?,
    )
    .ok_or(ChoreError::NoneValue("last day of month"))?;
    Ok((first, last))
}

fn last_day_of_month(year: i32, month: u32) -> Result<u32> {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1))
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .ok_or(ChoreError::NoneValue("last day of month"))
}
