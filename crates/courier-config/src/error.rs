//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving adapter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    #[error("{}", missing_message(.vars))]
    MissingEnv { vars: Vec<String> },

    /// A variable is present but its value cannot be used.
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// The `.env` file exists but could not be read or parsed.
    #[error("failed to load .env file '{path}': {reason}")]
    DotEnv { path: String, reason: String },
}

fn missing_message(vars: &[String]) -> String {
    let noun = if vars.len() == 1 {
        "environment variable is"
    } else {
        "environment variables are"
    };
    format!("{} {} required", vars.join(" and "), noun)
}

impl ConfigError {
    /// Create a missing-variables error.
    pub fn missing<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingEnv {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
