//! sheets-mcp stdio server - main entry point.
//!
//! Serves the Google Sheets tools over newline-delimited JSON-RPC on
//! stdin/stdout. Logs go to stderr.
//!
//! Credentials come from `GOOGLE_SERVICE_ACCOUNT_FILE` (or `--service-account-file`).
//! The server starts without them; tool calls then report a credentials error.

use clap::Parser;
use sheets_mcp::ipc::StdioServer;
use sheets_mcp::observability::init_tracing;
use sheets_mcp::{Config, SheetsToolAdapter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "sheets-mcp", version)]
#[command(about = "Google Sheets MCP server (stdio)")]
struct Args {
    /// Path to a Google service-account JSON key.
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_FILE")]
    service_account_file: Option<PathBuf>,

    /// Sheets API base URL.
    #[arg(long, env = "SHEETS_API_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout for Sheets API calls, in seconds.
    #[arg(long, env = "SHEETS_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, env = "SHEETS_MCP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON logs on stderr.
    #[arg(long)]
    json_logs: bool,

    /// Print the tool catalog and exit.
    #[arg(long)]
    list_tools: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::default();
        if let Some(path) = self.service_account_file {
            config = config.with_service_account_file(path);
        }
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url.trim_end_matches('/'));
        }
        if let Some(secs) = self.timeout_secs {
            config.backend.request_timeout = Duration::from_secs(secs);
        }
        config.observability.log_level = self.log_level;
        config.observability.json_logs = self.json_logs;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let list_tools = args.list_tools;
    let config = args.into_config();

    init_tracing(&config.observability);

    let adapter = Arc::new(SheetsToolAdapter::from_config(&config)?);

    if list_tools {
        println!("{}", adapter.catalog().generate_prompt());
        return Ok(());
    }

    if config.credentials.service_account_file.is_none() {
        tracing::warn!("GOOGLE_SERVICE_ACCOUNT_FILE is not set; tool calls will fail until it is");
    }

    let server = StdioServer::new(adapter, config.server.clone());

    let cancel = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            cancel.cancel();
        }
    });

    server.serve_stdio().await?;
    tracing::info!("sheets-mcp stopped");
    Ok(())
}
