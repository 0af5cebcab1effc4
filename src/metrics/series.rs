//! Fixed-length daily series over a trailing window.
//!
//! Buckets are UTC calendar days ending with the day containing `now`. Each
//! metric pre-indexes its rows by day in one pass, so building a series is
//! O(rows + window) rather than a scan per bucket.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// How bucket labels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketLabel {
    /// `Oct 3`
    MonthDay,
    /// `Mon`
    Weekday,
}

impl BucketLabel {
    fn render(self, day: NaiveDate) -> String {
        match self {
            Self::MonthDay => day.format("%b %-d").to_string(),
            Self::Weekday => day.format("%a").to_string(),
        }
    }
}

/// One calendar day with a value per metric, in metric order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub label: String,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub metrics: Vec<String>,
    pub buckets: Vec<Bucket>,
}

impl TimeSeries {
    /// Values of one metric across all buckets, oldest first.
    pub fn column(&self, metric: &str) -> Option<Vec<u64>> {
        let i = self.metrics.iter().position(|m| m == metric)?;
        Some(self.buckets.iter().map(|b| b.values[i]).collect())
    }
}

/// Accumulates metrics for one trailing window, then lays them out as buckets.
#[derive(Debug)]
pub struct SeriesBuilder {
    first_day: NaiveDate,
    window_days: u32,
    label: BucketLabel,
    metrics: Vec<(String, HashMap<NaiveDate, u64>)>,
}

impl SeriesBuilder {
    pub fn new(now: DateTime<Utc>, window_days: u32, label: BucketLabel) -> Self {
        let today = now.date_naive();
        let back = i64::from(window_days.saturating_sub(1));
        Self {
            first_day: today - Duration::days(back),
            window_days,
            label,
            metrics: Vec::new(),
        }
    }

    /// Add a metric counting one per timestamp.
    pub fn count<I>(self, name: &str, timestamps: I) -> Self
    where
        I: IntoIterator<Item = Option<DateTime<Utc>>>,
    {
        self.sum(name, timestamps.into_iter().map(|ts| (ts, 1)))
    }

    /// Add a metric summing `weight` per timestamp.
    pub fn sum<I>(mut self, name: &str, weighted: I) -> Self
    where
        I: IntoIterator<Item = (Option<DateTime<Utc>>, u64)>,
    {
        let last_day = self.first_day + Duration::days(i64::from(self.window_days) - 1);
        let mut by_day: HashMap<NaiveDate, u64> = HashMap::new();
        for (ts, weight) in weighted {
            let Some(day) = ts.map(|t| t.date_naive()) else {
                continue;
            };
            if day < self.first_day || day > last_day {
                continue;
            }
            *by_day.entry(day).or_insert(0) += weight;
        }
        self.metrics.push((name.to_string(), by_day));
        self
    }

    pub fn build(self) -> TimeSeries {
        let buckets = (0..self.window_days)
            .map(|offset| {
                let date = self.first_day + Duration::days(i64::from(offset));
                Bucket {
                    date,
                    label: self.label.render(date),
                    values: self
                        .metrics
                        .iter()
                        .map(|(_, by_day)| by_day.get(&date).copied().unwrap_or(0))
                        .collect(),
                }
            })
            .collect();

        TimeSeries {
            metrics: self.metrics.into_iter().map(|(name, _)| name).collect(),
            buckets,
        }
    }
}
