//! Error handling.
//!
//! This module provides the error taxonomy:
//! - **Initialization errors**: logger, HTTP client, endpoint setup
//! - **Configuration errors**: values rejected by `Config::validate`
//! - **Verification errors**: DNS, transport and schema failures that abort a
//!   single record type's check
//!
//! Policy failures are data, not errors, and never appear here.

mod types;

// Re-export public API
pub use types::{ConfigError, InitializationError, VerificationError};
