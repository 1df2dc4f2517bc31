//! Shared plumbing for Pulse services.
//!
//! Provides the unified configuration file, structured logging setup and
//! the common error type used across the workspace.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::CommonError;
