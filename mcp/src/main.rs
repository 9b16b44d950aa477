use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fider_mcp_runtime::util::{LEGACY_BASE_URL_ENV, resolve_base_url};
use fider_mcp_runtime::{McpCommands, McpRuntimeConfig, run as run_mcp};

#[derive(Parser)]
#[command(
    name = "fider-mcp",
    version,
    about = "Fider MCP server — feedback posts, comments and tags as tools over stdio"
)]
struct Cli {
    /// Fider base URL (falls back to FIDER_URL)
    #[arg(long, env = "FIDER_BASE_URL")]
    base_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "FIDER_API_KEY", hide_env_values = true)]
    token: Option<String>,

    /// Skip the Authorization header (for use behind an auth-injecting proxy)
    #[arg(long, env = "FIDER_NO_AUTH")]
    no_auth: bool,

    #[command(subcommand)]
    command: Option<McpCommands>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // stdout is the protocol channel; logs go to stderr only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fider_mcp=info,fider_mcp_runtime=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let base_url = resolve_base_url(cli.base_url, std::env::var(LEGACY_BASE_URL_ENV).ok());
    let config = McpRuntimeConfig::new(&base_url, cli.token, cli.no_auth);

    let code = run_mcp(config, cli.command).await;
    std::process::exit(code);
}
