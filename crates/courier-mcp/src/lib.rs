//! MCP (Model Context Protocol) tool server runtime for Courier.
//!
//! This crate turns a fixed tool catalog plus a handler into a long-lived
//! MCP server on stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  transport                                                  │
//! │  - newline-delimited JSON-RPC 2.0 on stdin/stdout           │
//! │  - one task per request, single writer                      │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpServer                                                  │
//! │  - initialize, ping, tools/list, tools/call                 │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                 │
//! │  - catalog lookup, typed decode, error folding              │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ToolAdapter (one per vendor)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_mcp::{Dispatcher, McpServer, serve_stdio};
//!
//! let adapter = Arc::new(MyAdapter::new(vendor_client));
//! let server = Arc::new(McpServer::new(Dispatcher::new(adapter)));
//! serve_stdio(server).await?;
//! ```
//!
//! Tool failures never become JSON-RPC errors. They are returned as a
//! normal `tools/call` result whose single text block starts with
//! `Error: ` and which carries `isError: true`.

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export main types
pub use catalog::{FieldKind, FieldSpec, ToolCatalog, ToolDescriptor};
pub use dispatch::{Dispatcher, ERROR_PREFIX, ToolAdapter, ToolError, ToolOutcome, decode_call};
pub use error::{McpError, Result};
pub use logging::{LogGuard, init_tracing};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, MCP_PROTOCOL_VERSION, RequestId,
    ServerCapabilities, ServerInfo, ToolContent, ToolInfo, ToolsCapability,
};
pub use server::McpServer;
pub use transport::{serve, serve_stdio};
