//! Environment sources.
//!
//! Adapters never call `std::env::var` directly; they read through an
//! [`Environment`] so tests can supply a plain map instead of mutating the
//! process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::secrets::{ResolvedSecret, SecretSource};

/// A source of configuration variables.
pub trait Environment {
    /// Look up a variable. Unset and empty values both yield `None`.
    fn lookup(&self, key: &str) -> Option<ResolvedSecret>;
}

/// The process environment, optionally layered over a `.env` file.
///
/// Variables already present in the process environment win; the `.env`
/// file only fills gaps. The file is read into memory and never written
/// back into the process environment.
#[derive(Debug, Default)]
pub struct ProcessEnv {
    dotenv_path: Option<PathBuf>,
    dotenv: HashMap<String, String>,
}

impl ProcessEnv {
    /// Process environment only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process environment layered over `<dir>/.env`.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn with_dotenv(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(".env");
        let iter = match dotenvy::from_path_iter(&path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), "no .env file found");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(ConfigError::DotEnv {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let mut dotenv = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::DotEnv {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            dotenv.insert(key, value);
        }

        tracing::debug!(
            path = %path.display(),
            vars = dotenv.len(),
            "loaded .env file"
        );

        Ok(Self {
            dotenv_path: Some(path),
            dotenv,
        })
    }

    /// Process environment layered over `.env` in the current directory.
    pub fn from_current_dir() -> Result<Self> {
        let dir = std::env::current_dir().map_err(|e| ConfigError::DotEnv {
            path: ".env".to_string(),
            reason: format!("cannot determine working directory: {}", e),
        })?;
        Self::with_dotenv(dir)
    }

    /// Path of the `.env` file that was loaded, if any.
    pub fn dotenv_path(&self) -> Option<&Path> {
        self.dotenv_path.as_deref()
    }
}

impl Environment for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<ResolvedSecret> {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                return Some(ResolvedSecret::new(
                    value,
                    SecretSource::EnvVar(key.to_string()),
                ));
            }
        }

        let value = self.dotenv.get(key).filter(|v| !v.is_empty())?;
        let path = self.dotenv_path.clone().unwrap_or_else(|| PathBuf::from(".env"));
        Some(ResolvedSecret::new(value.clone(), SecretSource::DotEnv(path)))
    }
}

/// A fixed set of variables, used in tests and for embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnv {
    fn lookup(&self, key: &str) -> Option<ResolvedSecret> {
        self.vars
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| ResolvedSecret::new(v.clone(), SecretSource::EnvVar(key.to_string())))
    }
}
