pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::extract::Request;
use axum::ServiceExt;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::item_store::PgItemStore;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let media = services::media::from_settings(&settings).await?;
    let store = Arc::new(PgItemStore::new(db_pool));
    let state = AppState::new(settings, store, media);

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        prefix = %state.settings().api().prefix,
        "Item Store API listening"
    );

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await?;

    tracing::info!("Item Store API stopped");
    Ok(())
}
