use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;
pub mod util;

pub use client::{ApiCallResult, ApiRequest, FeedbackApi, HttpFeedbackApi};
pub use error::{RpcError, ToolError};
pub use server::McpServer;
pub use tools::{ToolCall, ToolKind, tool_definitions};

use crate::protocol::to_pretty_json;

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum McpCommands {
    /// Run the Fider MCP server over stdio (default)
    Serve,
    /// Print the tool descriptors served by `tools/list`
    Tools,
}

/// Process-wide settings, fixed at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct McpRuntimeConfig {
    pub base_url: String,
    /// Bearer token; `None` sends no `Authorization` header.
    pub token: Option<String>,
}

impl McpRuntimeConfig {
    pub fn new(base_url: &str, token: Option<String>, no_auth: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: if no_auth {
                None
            } else {
                util::normalize_token(token)
            },
        }
    }
}

pub async fn run(config: McpRuntimeConfig, command: Option<McpCommands>) -> i32 {
    match command.unwrap_or(McpCommands::Serve) {
        McpCommands::Serve => {
            tracing::info!(
                base_url = %config.base_url,
                api_key_configured = config.token.is_some(),
                "Fider MCP server started"
            );
            let server = match McpServer::new(&config) {
                Ok(server) => Arc::new(server),
                Err(err) => {
                    tracing::error!(error = %err, "failed to set up Fider client");
                    return 1;
                }
            };
            match transport::serve_stdio(server).await {
                Ok(()) => {
                    tracing::info!("Fider MCP server stopped");
                    0
                }
                Err(err) => {
                    tracing::error!(error = %err, "MCP transport failed");
                    1
                }
            }
        }
        McpCommands::Tools => {
            println!("{}", to_pretty_json(&json!({ "tools": tool_definitions() })));
            0
        }
    }
}
