//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry caps, DNS labels)
//! - CLI option types and parsing
//! - The startup validation step for loaded configuration

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{is_plausible_hostname, Config, LogFormat, LogLevel, OutputFormat};
