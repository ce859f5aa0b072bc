//! Spacer front-end server.

use anyhow::Context;
use spacer::{Settings, SpacerConfig, SpacerEnvironment, router};
use spacer_api::{HttpSpacerApi, PaystackGateway};
use spacer_core::environment::SystemClock;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spacer=info,spacer_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SpacerConfig::from_env().context("Invalid configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        api_url = %config.api_url,
        public_url = %config.public_url,
        currency = %config.currency,
        request_timeout = ?config.request_timeout,
        flow_timeout = ?config.flow_timeout,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let api = HttpSpacerApi::with_client(http.clone(), &config.api_url);
    let payments =
        PaystackGateway::with_client(http, &config.paystack_base_url, &config.paystack_secret_key);

    let env = SpacerEnvironment::new(
        Arc::new(api),
        Arc::new(payments),
        Arc::new(SystemClock),
        Settings::from_config(&config),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(address = %config.bind_addr, "Spacer listening");

    axum::serve(listener, router(env))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(error) => {
                warn!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
