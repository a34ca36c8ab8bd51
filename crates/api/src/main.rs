use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::app::build_router;
use api::config::AppConfig;
use api::gql::build_schema;
use api::services::seed::seed_demo_data;
use api::state::AppState;
use infra::Repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let repos = match &config.database_url {
        Some(url) => {
            let pool = infra::db::connect(url).await?;
            infra::db::migrate(&pool).await?;
            tracing::info!("Connected to Postgres");
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-process store, data is lost on restart");
            Repositories::in_memory()
        }
    };
    let state = AppState::new(repos, &config.auth);

    if config.seed_demo_data {
        seed_demo_data(&state).await?;
    }

    // Build GraphQL schema from the gql module
    let schema = build_schema(state.clone());

    let app = build_router(state, schema);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
