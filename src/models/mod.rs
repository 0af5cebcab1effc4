//! Row types and mutation payloads for every entity the dashboard reads or edits.

pub mod activity;
pub mod content;
pub mod feedback;
pub mod profile;
pub mod ticket;
