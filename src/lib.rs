//! Viral post finder library.
//!
//! Runs search queries against a search backend, classifies the returned URLs
//! by platform, enriches status posts with engagement metrics, and reports the
//! deduplicated (optionally filtered) set along with any per-query errors.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod client;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod filter;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod search;
