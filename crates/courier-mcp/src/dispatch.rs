//! Tool dispatch.
//!
//! The [`Dispatcher`] turns a `(tool name, arguments)` pair into exactly one
//! [`ToolOutcome`]. It resolves the name against the adapter's catalog,
//! hands the call to the adapter, and folds every failure into the outcome
//! so nothing escapes to the transport.
//!
//! Adapters decode arguments into per-tool typed records with
//! [`decode_call`], which expects an adjacently tagged enum:
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! #[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
//! enum EmailCall {
//!     SendEmail(SendEmailArgs),
//!     VerifyEmail(VerifyEmailArgs),
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use crate::catalog::ToolCatalog;
use crate::protocol::{CallToolResult, ListToolsResult, ServerInfo, ToolInfo};

/// Prefix of every failure text block.
pub const ERROR_PREFIX: &str = "Error: ";

/// Why a single invocation failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Name is not in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not fit the tool's record.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Decoder message.
        message: String,
    },

    /// The vendor call failed. The message is surfaced verbatim.
    #[error("{0}")]
    Vendor(String),
}

impl ToolError {
    /// Create a vendor error from anything printable.
    pub fn vendor(err: impl std::fmt::Display) -> Self {
        Self::Vendor(err.to_string())
    }
}

/// The internal result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Handler completed; text for the caller.
    Success(String),
    /// Handler failed.
    Failure(ToolError),
}

impl ToolOutcome {
    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// Text as the caller will see it.
    pub fn text(&self) -> String {
        match self {
            ToolOutcome::Success(text) => text.clone(),
            ToolOutcome::Failure(err) => format!("{}{}", ERROR_PREFIX, err),
        }
    }

    /// Convert to the wire shape.
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            ToolOutcome::Success(text) => CallToolResult::text_block(text),
            failure @ ToolOutcome::Failure(_) => CallToolResult::error_block(failure.text()),
        }
    }
}

impl From<Result<String, ToolError>> for ToolOutcome {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => ToolOutcome::Success(text),
            Err(err) => ToolOutcome::Failure(err),
        }
    }
}

/// An adapter: a fixed catalog plus the handlers behind it.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Name and version reported during initialization.
    fn server_info(&self) -> ServerInfo;

    /// The adapter's catalog. Must return the same catalog on every call.
    fn catalog(&self) -> &ToolCatalog;

    /// Run a tool already known to be in the catalog.
    ///
    /// `arguments` is `{}` when the caller sent none.
    async fn invoke(&self, name: &str, arguments: Value) -> Result<String, ToolError>;
}

/// Decode `(name, arguments)` into an adapter's tagged call enum.
pub fn decode_call<T: DeserializeOwned>(name: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(json!({ "tool": name, "arguments": arguments })).map_err(|e| {
        ToolError::InvalidArguments {
            tool: name.to_string(),
            message: e.to_string(),
        }
    })
}

/// Stateless request → outcome function over an adapter.
pub struct Dispatcher {
    adapter: Arc<dyn ToolAdapter>,
    tools: Vec<ToolInfo>,
}

impl Dispatcher {
    /// Wrap an adapter. The tool list is rendered once, here.
    pub fn new(adapter: Arc<dyn ToolAdapter>) -> Self {
        let tools = adapter
            .catalog()
            .iter()
            .map(|d| ToolInfo {
                name: d.name.to_string(),
                description: d.description.to_string(),
                input_schema: d.input_schema(),
            })
            .collect();
        Self { adapter, tools }
    }

    /// Server info of the wrapped adapter.
    pub fn server_info(&self) -> ServerInfo {
        self.adapter.server_info()
    }

    /// The full catalog, as listed to clients.
    pub fn list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: self.tools.clone(),
        }
    }

    /// Run one invocation.
    pub async fn dispatch(&self, name: &str, arguments: Option<Value>) -> ToolOutcome {
        if !self.adapter.catalog().contains(name) {
            tracing::warn!(tool = %name, "unknown tool requested");
            return ToolOutcome::Failure(ToolError::UnknownTool(name.to_string()));
        }

        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(args) => args,
        };

        let outcome = ToolOutcome::from(self.adapter.invoke(name, arguments).await);
        match &outcome {
            ToolOutcome::Success(_) => tracing::debug!(tool = %name, "tool call succeeded"),
            ToolOutcome::Failure(err) => {
                tracing::warn!(tool = %name, error = %err, "tool call failed")
            }
        }
        outcome
    }
}
