//! HTTP API: axum router over the catalog gateways.

pub mod app;
