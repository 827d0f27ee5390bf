//! USASpending public-infrastructure collection pipeline.
//!
//! Searches the spending API per keyword, fetches full award records,
//! geocodes each place of performance through Mapbox, and emits the
//! normalized, fully geocoded projects as a JSON artifact.

pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;
