use anyhow::Context;
use axum::Router;
use clap::Parser;
use dossier::report::llm::ChatClient;
use dossier::{Aggregator, AppState, LlmReportGenerator, Settings, Sources};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dossier-server", about = "Background-check aggregation server")]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = Settings::from_env().context("loading settings")?;

    // One explicitly-owned HTTP client for every outbound call; the
    // connection pool is the transport-level concurrency bound.
    let http = reqwest::Client::builder()
        .user_agent(concat!("dossier-server/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .pool_max_idle_per_host(settings.max_concurrency)
        .build()
        .context("building HTTP client")?;

    let chat = ChatClient::new(
        http.clone(),
        settings.llm_base_url.clone(),
        settings.llm_api_key.clone(),
        settings.llm_model.clone(),
    );
    let sources = Arc::new(Sources::from_settings(&http, &settings, chat.clone()));
    let reporter = Arc::new(LlmReportGenerator::new(chat));
    let aggregator = Aggregator::new(
        Arc::clone(&sources),
        reporter,
        settings.linkedin_provider,
    );

    let state = AppState {
        settings: Arc::new(settings),
        sources,
        aggregator,
    };

    let app = Router::new()
        .nest("/api/v1", dossier::api::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "dossier-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
