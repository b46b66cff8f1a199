use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smart_hub_service::{
    api::{self, AppState},
    config::Config,
    db::{self, MemoryStore, PgStore, Store},
    sunset::SunriseSunsetClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!(
        timezone = %config.site.timezone,
        latitude = config.site.latitude,
        longitude = config.site.longitude,
        "Site configured"
    );

    // Pick the store: PostgreSQL when configured, memory otherwise
    let store = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Database ready");
            Store::Postgres(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
            Store::Memory(MemoryStore::new())
        }
    };

    let sunset = SunriseSunsetClient::new(&config.site)?;
    let state = AppState::new(store, sunset, config.site.timezone);
    let app = api::router(state).layer(api::cors_layer(&config.cors_allowed_origins)?);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
