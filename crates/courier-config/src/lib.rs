//! Configuration for the Courier MCP adapters.
//!
//! Everything is read from the environment once, at process start:
//! - Process environment variables take precedence
//! - A `.env` file in the working directory fills in anything unset
//! - Empty values are treated as absent
//!
//! Required credentials resolve through [`secrets::require_all`], which
//! reports every missing variable at once so a misconfigured adapter can
//! exit with a single diagnostic.

pub mod env;
pub mod error;
pub mod secrets;

pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{ConfigError, Result};
pub use secrets::{optional, require_all, ResolvedSecret, SecretSource};
