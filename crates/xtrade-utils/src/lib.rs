//! Shared utilities for xtrade
//!
//! This crate provides common functionality used across the xtrade workspace:
//! tracing setup and the application-level configuration shared by binaries.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{LogFormat, init_tracing_with};
