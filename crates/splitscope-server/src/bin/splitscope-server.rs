use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use splitscope_core::DetectionStore;
use splitscope_server::{serve, AppState, Cli, LiveSplitProxy};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = cli.resolve_layout();
    info!(
        "inputs: detections={} log={} screenshots={}",
        config.detections_file.display(),
        config.log_file.display(),
        config.screenshots_dir.display()
    );

    let state = Arc::new(AppState::new(
        DetectionStore::new(config),
        LiveSplitProxy::new(cli.livesplit_url.clone()),
    ));

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), cli.port);
    serve(state, addr).await
}
