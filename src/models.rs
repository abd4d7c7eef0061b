use crate::charts::ChartSeries;
use crate::errors::DashboardError;
use crate::table::FlatTable;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Inclusive calendar date range. Construction rejects `start > end`, so a
/// `DateRange` value is always safe to hand to the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidRange(
                "End date must fall after start date.".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DashboardError> {
        Self::new(parse_date("start", start)?, parse_date("end", end)?)
    }

    pub fn trailing_week(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(DEFAULT_RANGE_DAYS),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Cache key: the formatted date pair.
    pub fn key(&self) -> (String, String) {
        (self.start_str(), self.end_str())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_str(), self.end_str())
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        DashboardError::InvalidRange(format!(
            "invalid {field} date '{value}', expected YYYY-MM-DD"
        ))
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

impl DataQuery {
    /// Resolves the requested range, filling absent bounds from the trailing week.
    pub fn range(&self, today: NaiveDate) -> Result<DateRange, DashboardError> {
        let fallback = DateRange::trailing_week(today);
        let start = match self.start.as_deref().filter(|value| !value.trim().is_empty()) {
            Some(value) => parse_date("start", value)?,
            None => fallback.start(),
        };
        let end = match self.end.as_deref().filter(|value| !value.trim().is_empty()) {
            Some(value) => parse_date("end", value)?,
            None => fallback.end(),
        };
        DateRange::new(start, end)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardTables {
    pub sleep: FlatTable,
    pub workout: FlatTable,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub start: String,
    pub end: String,
    pub cached: bool,
    pub sleep: FlatTable,
    pub workout: FlatTable,
    pub charts: Vec<ChartSeries>,
}
