use anyhow::Result;
use aria_voice::{create_router, AppState, Config};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "aria-voice", about = "Realtime voice assistant engine")]
struct Args {
    /// Config file path (without extension)
    #[arg(long, default_value = "config/aria-voice")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// WAV file to use as the default capture source
    #[arg(long)]
    input: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config).unwrap_or_else(|e| {
        info!("no usable config file ({e}), using defaults");
        Config::default()
    });
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("live endpoint: {} ({})", cfg.live.url, cfg.live.model);
    if Config::api_key().is_none() {
        info!("ARIA_API_KEY is not set; connect requests will be rejected");
    }

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, args.input);
    let router = create_router(state);

    info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
