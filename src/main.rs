use std::{net::SocketAddr, sync::Arc};

use ai_studio_server::{
    auth::JwtService,
    config::Config,
    create_app,
    database::Database,
    handlers::AppState,
    services::{providers::Providers, PgCreationStore, PgIdentityStore},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_studio_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let database = Database::new(&config.database_url).await?;
    tracing::info!("Connected to database");

    database.migrate().await?;
    tracing::info!("Migrations completed");

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let providers = Providers::from_config(&config)?;
    let jwt = JwtService::from_config(&config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState::new(
        config,
        jwt,
        Arc::new(PgIdentityStore::new(database.clone())),
        Arc::new(PgCreationStore::new(database)),
        providers,
    );

    let app = create_app(state, Some(metrics_handle));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "AI studio server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
