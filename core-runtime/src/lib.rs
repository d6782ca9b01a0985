//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the host adapter core:
//! - Logging and tracing infrastructure
//! - Request configuration
//! - The shared runtime error type
//!
//! ## Overview
//!
//! Other crates depend on this one for configuration types and for the
//! logging conventions used throughout the workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{RequestConfig, RequestConfigBuilder, RequestMethod};
pub use error::{Error, Result};
