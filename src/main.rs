use clap::Parser;
use sprawl::{
    Registry,
    config::Config,
    content::ContentRegistry,
    net::telnet,
    renderer::PlainPresenter,
    storage::FileStorage,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "sprawl", version, about = "Sprawl text world server")]
struct Args {
    /// TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args = Args::parse();
    let cfg = Arc::new(Config::load(args.config.as_deref())?);

    let storage = Arc::new(FileStorage::new(&cfg.data_dir).with_format(cfg.record_format));
    storage.init().await?;

    let content = Arc::new(ContentRegistry::new());
    let report = content.load_all(&cfg.content_dir, &mut rand::rng());
    if content.get_room(cfg.starting_room.as_str()).is_none() {
        tracing::warn!(room = %cfg.starting_room, "starting room does not exist");
    }
    tracing::debug!(%report, "content ready");

    let registry = Arc::new(Registry::new(cfg.clone(), content, storage, Arc::new(PlainPresenter))?);
    registry.spawn_background_tasks();

    let tcp_addr: SocketAddr = cfg.tcp_addr.parse()?;
    tracing::info!(%tcp_addr, "Sprawl server TCP (telnet) starting");
    telnet::serve(tcp_addr, registry).await?;

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!("{e}"))?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(())
}
