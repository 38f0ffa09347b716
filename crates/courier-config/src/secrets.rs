//! Credential resolution with provenance.
//!
//! Adapters declare which variables they cannot run without. Resolution
//! either yields every value or fails with the full list of what is
//! missing; there is no lazy fallback.

use std::fmt;
use std::path::PathBuf;

use crate::env::Environment;
use crate::error::{ConfigError, Result};

/// A resolved value and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    value: String,
    /// Where the value was found.
    pub source: SecretSource,
}

impl ResolvedSecret {
    /// Create a resolved value.
    pub fn new(value: impl Into<String>, source: SecretSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    /// The raw value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consume and return the raw value.
    pub fn into_value(self) -> String {
        self.value
    }
}

// Never print secret material, even at trace level.
impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a value was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Process environment variable.
    EnvVar(String),
    /// `.env` file at the given path.
    DotEnv(PathBuf),
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::DotEnv(path) => write!(f, ".env file {}", path.display()),
        }
    }
}

/// Resolve every key in `keys`, in order.
///
/// Fails with [`ConfigError::MissingEnv`] listing all absent keys.
pub fn require_all<E>(env: &E, keys: &[&str]) -> Result<Vec<ResolvedSecret>>
where
    E: Environment + ?Sized,
{
    let mut resolved = Vec::with_capacity(keys.len());
    let mut missing = Vec::new();

    for key in keys {
        match env.lookup(key) {
            Some(secret) => {
                tracing::debug!(var = %key, source = %secret.source, "resolved credential");
                resolved.push(secret);
            }
            None => missing.push(key.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(ConfigError::missing(missing))
    }
}

/// Resolve an optional value.
pub fn optional<E>(env: &E, key: &str) -> Option<String>
where
    E: Environment + ?Sized,
{
    env.lookup(key).map(ResolvedSecret::into_value)
}
