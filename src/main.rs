use clap::Parser;
use plausible_proxy::api::{build_routes, common};
use plausible_proxy::config::ProxyConfig;
use plausible_proxy::state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Path to a JSON configuration file
    #[arg(short, long, env = "PLAUSIBLE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Analytics provider base URL (overrides the config file)
    #[arg(long, env = "PLAUSIBLE_BASE_URL")]
    base_url: Option<String>,

    /// Default data-domain for server-side events
    #[arg(long, env = "PLAUSIBLE_DOMAIN")]
    domain: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ProxyConfig::load(path).expect("Failed to load config"),
        None => ProxyConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(domain) = args.domain {
        config.default_domain = Some(domain);
    }

    let state = Arc::new(AppState::new(config).expect("Failed to init state"));
    tracing::info!(
        "Proxying analytics traffic to {}",
        state.config.base_url
    );

    // The event endpoint is embedded on arbitrary origins
    let cors = CorsLayer::permissive();

    let app = build_routes(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(common::request_logger));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
