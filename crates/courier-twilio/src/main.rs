//! `twilio-mcp`: serve the messaging tools over stdio.

use std::sync::Arc;

use anyhow::{Context, Result};
use courier_config::ProcessEnv;
use courier_mcp::{Dispatcher, McpServer, init_tracing, serve_stdio};
use courier_twilio::{MessagingAdapter, TwilioClient, TwilioConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing("twilio-mcp", "info")?;

    let env = ProcessEnv::from_current_dir()?;
    let config = TwilioConfig::from_env(&env).context("Twilio is not configured")?;
    tracing::debug!(?config, "loaded configuration");

    let client = TwilioClient::new(&config).context("failed to build Twilio client")?;
    let adapter = MessagingAdapter::new(
        Arc::new(client),
        config.phone_number.clone(),
        config.whatsapp_number.clone(),
    );
    let server = Arc::new(McpServer::new(Dispatcher::new(Arc::new(adapter))));

    serve_stdio(server).await?;
    Ok(())
}
