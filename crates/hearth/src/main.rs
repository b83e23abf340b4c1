//! hearth binary - serves a site directory over HTTP

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth::{Mode, Site, server};

#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(about = "Serve a blog and site directory")]
#[command(version)]
struct Args {
    /// Site root directory (defaults to current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Port to listen on
    #[arg(short = 'P', long, default_value = "8080")]
    port: u16,

    /// Cache rendered output and hide drafts.
    /// Also enabled by HEARTH_ENV=production.
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let mode = Mode::resolve(args.production);

    info!(root = %root.display(), ?mode, "Starting hearth");

    let site = Site::open(&root, mode)
        .with_context(|| format!("Failed to open site at {}", root.display()))?;

    let config = server::ServerConfig {
        host: args.host,
        port: args.port,
    };
    info!("http://{}:{}", config.host, config.port);

    server::run_server(Arc::new(site), config).await?;

    Ok(())
}
