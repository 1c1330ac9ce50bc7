//! HTTP server for the marquee catalog service.
//!
//! Exposes the router and shared state so integration tests can drive the
//! API in-process.

pub mod api;
pub mod metrics;
pub mod state;
