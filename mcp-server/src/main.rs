//! MedShare MCP Server
//!
//! This MCP server lets an assistant act on the MedShare platform with a
//! user's API key. It exposes tools for:
//! - Working the moderation queue (list, stats, approve, reject)
//! - Browsing and viewing published models
//! - Liking, unliking and downloading models

mod client;
mod server;

use anyhow::Result;
use rmcp::ServiceExt;
use server::MedShareServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MedShare MCP server");

    let server = MedShareServer::from_env()?;

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;

    service.waiting().await?;

    Ok(())
}
