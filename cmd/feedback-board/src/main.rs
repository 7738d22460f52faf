//! # Feedback Board Binary
//!
//! Assembles the adapters selected at compile time, wires the services and
//! serves the HTTP API until interrupted.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::http::{router, AppState};
use api_adapters::Metrics;
use auth_adapters::{Argon2PasswordHasher, JwtTokenCodec};
use configs::{LogFormat, LoggingSettings, Settings};
use services::{IdentityOptions, Services};
use storage_adapters::InMemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.logging);

    let repos = Arc::new(InMemoryStore::new()).repositories();
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let tokens = Arc::new(JwtTokenCodec::new(
        &settings.auth.jwt_secret,
        settings.auth.token_ttl_secs,
    ));
    let services = Services::new(
        repos,
        hasher,
        tokens,
        IdentityOptions {
            first_user_is_admin: settings.auth.first_user_is_admin,
        },
    );

    if settings.seed.demo_data {
        seed(&services).await?;
    }

    let app = router(AppState::new(services, Arc::new(Metrics::new())));
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "feedback board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    Ok(())
}

/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

#[cfg(feature = "demo-seed")]
async fn seed(services: &Services) -> anyhow::Result<()> {
    let summary = services
        .seed_demo_data()
        .await
        .context("seeding demo data")?;
    tracing::info!(?summary, "demo data ready");
    Ok(())
}

#[cfg(not(feature = "demo-seed"))]
async fn seed(_services: &Services) -> anyhow::Result<()> {
    tracing::warn!("seed.demo_data is set but this build has no demo-seed feature");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}
