use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// One sample of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub value: f64,
    pub timestamp: Timestamp,
}

/// A single time series matched by a query.
///
/// `labels` never holds `__name__`; that label is lifted into `name`.
/// A `BTreeMap` keeps label iteration sorted so display is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub values: Vec<Point>,
}

impl Metric {
    pub fn last_point(&self) -> Option<&Point> {
        self.values.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub step: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// The window of `seconds` length ending now.
    pub fn last(seconds: u64) -> Self {
        let end = Utc::now().timestamp();
        Self {
            start: end.saturating_sub(i64::try_from(seconds).unwrap_or(i64::MAX)),
            end,
        }
    }

    /// Window length in seconds, zero when `end` precedes `start`.
    pub fn interval(&self) -> u64 {
        self.end.saturating_sub(self.start).max(0) as u64
    }
}
