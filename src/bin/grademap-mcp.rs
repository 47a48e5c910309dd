//! grademap MCP server binary.
//!
//! Runs the grade-query engine as an MCP server over stdio, so AI
//! assistants can search courses and professors and pull aggregated grade
//! distributions.
//!
//! # Usage
//!
//! ```bash
//! GRADEMAP_DATASET=data/grademap.json grademap-mcp
//! ```
//!
//! The dataset path comes from `GRADEMAP_DATASET` or from `dataset` in
//! grademap.toml. The server communicates via JSON-RPC over stdio.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use grademap::mcp::GradesServer;
use grademap::GradesEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let dataset = std::env::var_os("GRADEMAP_DATASET").map(PathBuf::from);
    let engine = GradesEngine::bootstrap(dataset.as_deref())?;

    let service = GradesServer::new(Arc::new(engine)).serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
