//! Metrics derivation: pure functions from fetched rows to dashboard numbers.
//!
//! Nothing here touches the store or fails. Missing timestamps and counts are
//! treated as absent or zero.

pub mod business;
pub mod grouping;
pub mod reports;
pub mod scalar;
pub mod series;

pub use grouping::{GroupCount, GroupedCounts};
pub use scalar::Cents;
pub use series::{Bucket, BucketLabel, SeriesBuilder, TimeSeries};
