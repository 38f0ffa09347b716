//! `sendgrid-mcp`: serve the email tools over stdio.

use std::sync::Arc;

use anyhow::{Context, Result};
use courier_config::ProcessEnv;
use courier_mcp::{Dispatcher, McpServer, init_tracing, serve_stdio};
use courier_sendgrid::{EmailAdapter, SendGridClient, SendGridConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing("sendgrid-mcp", "info")?;

    let env = ProcessEnv::from_current_dir()?;
    let config = SendGridConfig::from_env(&env).context("SendGrid is not configured")?;
    tracing::debug!(?config, "loaded configuration");

    let client = SendGridClient::new(&config).context("failed to build SendGrid client")?;
    let adapter = EmailAdapter::new(Arc::new(client), config.default_from.clone());
    let server = Arc::new(McpServer::new(Dispatcher::new(Arc::new(adapter))));

    serve_stdio(server).await?;
    Ok(())
}
