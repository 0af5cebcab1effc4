//! Business logic services.

pub mod auth;
pub mod data;
pub mod metrics;
pub mod mutations;
pub mod store;
