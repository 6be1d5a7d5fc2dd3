//! Shared utilities, configuration, and error handling for Designbase
//!
//! This crate provides common functionality used across the Designbase
//! application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Shared state machine errors
//! - Custom axum extractors

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
