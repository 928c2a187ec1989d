//! Shared utilities for folio-rs
//!
//! This crate provides common functionality used across the folio-rs workspace:
//! tracing setup and typed access to environment-variable configuration.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_parse, env_string};
pub use logging::{init_tracing, init_tracing_json};
