use anyhow::Result;
use clap::Parser;
use media_catalogue::catalogue::Catalogue;
use media_catalogue::config::{API_KEY_ENV, API_URL_ENV, Config};
use media_catalogue::lookup::OmdbClient;
use media_catalogue::mcp_server::CatalogueServer;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{self, EnvFilter};

/// Media catalogue MCP server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Base URL of the lookup API
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// API key for the lookup API
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// JSON config file (default: <config dir>/media-catalogue/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the MCP transport, so logs go to stderr
    let filter = || EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _guard = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "media-catalogue.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
            None
        }
    };

    // Defaults, then config file, then environment and flags
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(args.api_url, args.api_key);

    tracing::info!("Starting media catalogue MCP server");
    tracing::info!("Lookup API: {}", config.api_url);

    let lookup = Arc::new(OmdbClient::new(&config)?);
    let catalogue = Arc::new(Catalogue::new(lookup, &config));
    let server = CatalogueServer::new(catalogue);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
