//! Assist Arena Library
//!
//! Two-team arena combat tournament with tunable assist collaboration.
//!
//! # Features
//!
//! - `metrics_endpoint` - Prometheus/JSON metrics over HTTP (enabled by default)

pub mod config;
pub mod game;
pub mod metrics;
pub mod session;
pub mod util;
