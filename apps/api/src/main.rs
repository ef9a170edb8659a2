mod auth;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::memory_store::InMemoryTemplateStore;
use crate::templates::pg_store::PgTemplateStore;
use crate::templates::service::TemplateCatalog;
use crate::templates::store::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Template Catalog API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let catalog = TemplateCatalog::new(store);

    if config.seed_on_startup {
        let report = catalog
            .seed_default_templates()
            .await
            .context("Failed to seed default templates")?;
        info!(
            "Seeded default templates (created: {:?}, skipped: {:?})",
            report.created, report.skipped
        );
    }

    let state = AppState {
        catalog,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins to the dashboard host
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the catalog backend from `TEMPLATE_STORE`.
async fn build_store(config: &Config) -> Result<Arc<dyn TemplateStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgTemplateStore::new(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory template store; data is lost on restart");
            Ok(Arc::new(InMemoryTemplateStore::new()))
        }
    }
}
