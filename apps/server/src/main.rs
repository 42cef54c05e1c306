use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tessera::domain::config::AppConfig;
use tessera::kernel::config::load_config;
use tessera_logger::Logger;
use tessera_server::Server;
use tracing::warn;

/// Serves every installed subapp over HTTP.
#[derive(Debug, Parser)]
#[command(name = "tessera-server", version, about)]
struct Args {
    /// Server config file; `server.*` in the working directory when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Also write rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logger = Logger::builder().name(env!("CARGO_PKG_NAME"));
    let _log = match &args.log_dir {
        Some(dir) => logger.path(dir).init()?,
        None => logger.init()?,
    };

    let cfg: AppConfig = match &args.config {
        Some(path) => load_config(Some(path)).context("Critical: Configuration is malformed")?,
        None => load_config(Some("server")).unwrap_or_else(|e| {
            warn!("Using default server configuration: {e}");
            AppConfig::default()
        }),
    };

    let mut builder = Server::builder().config(cfg);
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    builder.build()?.run().await
}
