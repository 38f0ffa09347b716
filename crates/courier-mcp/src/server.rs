//! MCP request handling.
//!
//! [`McpServer`] maps one JSON-RPC message to at most one response. It
//! knows nothing about framing; see [`crate::transport`] for the stdio loop.

use serde_json::{Value, json};

use crate::dispatch::Dispatcher;
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse,
};

/// An MCP server exposing one adapter's tools.
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a server around a dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// The dispatcher behind this server.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one raw line. Returns `None` when no reply is due.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable message");
                return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error(e)));
            }
        };

        // Batches and bare scalars are not requests this server accepts.
        let Some(object) = value.as_object() else {
            tracing::warn!("rejecting non-object message");
            return Some(JsonRpcResponse::failure(
                None,
                JsonRpcError::invalid_request("expected a single JSON-RPC object"),
            ));
        };

        // Responses from the client carry a result or error and no method.
        // This server never sends requests, so they are dropped.
        if !object.contains_key("method")
            && (object.contains_key("result") || object.contains_key("error"))
        {
            tracing::debug!("ignoring client response");
            return None;
        }

        let id = value
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value(id).ok());

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request(e),
            )),
        }
    }

    /// Handle one decoded request or notification.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "received notification");
            return None;
        }

        let id = request.id.clone();
        let method = request.method.as_str();
        tracing::trace!(method = %method, id = ?id, "handling request");

        let result = match method {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => serde_json::to_value(self.dispatcher.list_tools())
                .map_err(JsonRpcError::internal),
            "tools/call" => self.call_tool(request.params).await,
            other => {
                tracing::debug!(method = %other, "method not found");
                Err(JsonRpcError::method_not_found(other))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        let server_info = self.dispatcher.server_info();
        tracing::info!(
            server = %server_info.name,
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            requested_protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "client initialized"
        );

        serde_json::to_value(InitializeResult::for_tools(server_info)).map_err(JsonRpcError::internal)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
            .and_then(|p| serde_json::from_value(p).map_err(JsonRpcError::invalid_params))?;

        tracing::info!(tool = %params.name, "tool call");
        let outcome = self
            .dispatcher
            .dispatch(&params.name, params.arguments)
            .await;

        serde_json::to_value(outcome.into_call_result()).map_err(JsonRpcError::internal)
    }
}
