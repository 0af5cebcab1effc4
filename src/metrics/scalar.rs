//! Single-number summaries over row slices.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

pub fn count<T>(rows: &[T]) -> u64 {
    rows.len() as u64
}

pub fn count_where<T>(rows: &[T], pred: impl Fn(&T) -> bool) -> u64 {
    rows.iter().filter(|r| pred(r)).count() as u64
}

pub fn sum_by<T>(rows: &[T], f: impl Fn(&T) -> u64) -> u64 {
    rows.iter().map(f).sum()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `numerator / denominator × 100`, one decimal; 0 when the denominator is 0.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round1(numerator as f64 / denominator as f64 * 100.0)
}

/// `numerator / denominator`, one decimal; 0 when the denominator is 0.
pub fn ratio1(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round1(numerator as f64 / denominator as f64)
}

/// True when `ts` is present and strictly after `now - days`.
pub fn created_within(ts: Option<DateTime<Utc>>, now: DateTime<Utc>, days: i64) -> bool {
    ts.is_some_and(|t| t > now - Duration::days(days))
}

/// Whole US cents. Revenue and cost estimates are summed in cents and only
/// converted to dollars on output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cents(pub i64);

impl Cents {
    pub fn times(self, n: u64) -> Self {
        Cents(self.0.saturating_mul(n as i64))
    }

    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl std::ops::Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.dollars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        let rows: Vec<u64> = Vec::new();
        assert_eq!(count(&rows), 0);
        assert_eq!(count_where(&rows, |_| true), 0);
        assert_eq!(sum_by(&rows, |r| *r), 0);
    }

    #[test]
    fn count_and_sum() {
        let rows = vec![1u64, 2, 3, 4];
        assert_eq!(count(&rows), 4);
        assert_eq!(count_where(&rows, |r| r % 2 == 0), 2);
        assert_eq!(sum_by(&rows, |r| *r), 10);
    }

    #[test]
    fn percentage_of_zero_denominator_is_zero() {
        for x in [0, 1, 17, u64::MAX] {
            assert_eq!(percentage(x, 0), 0.0);
        }
        assert_eq!(ratio1(5, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(5, 15), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(1, 1), 100.0);
        assert_eq!(ratio1(7, 3), 2.3);
    }

    #[test]
    fn created_within_is_strict_and_null_safe() {
        let now = Utc::now();
        assert!(created_within(Some(now - Duration::days(6)), now, 7));
        assert!(!created_within(Some(now - Duration::days(7)), now, 7));
        assert!(!created_within(None, now, 7));
    }

    #[test]
    fn cents_display_and_serialize() {
        let c = Cents(8895);
        assert_eq!(c.to_string(), "$88.95");
        assert_eq!(serde_json::to_value(c).unwrap(), serde_json::json!(88.95));
        assert_eq!((Cents(1299).times(3) + Cents(2499).times(2)), c);
    }

    #[test]
    fn negative_cents_keep_their_sign() {
        assert_eq!(Cents(-50).to_string(), "-$0.50");
        assert_eq!(Cents(-1299).to_string(), "-$12.99");
        assert_eq!(Cents(5).to_string(), "$0.05");
        assert_eq!(Cents(0).to_string(), "$0.00");
    }
}
