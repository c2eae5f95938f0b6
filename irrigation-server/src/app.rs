use std::sync::Arc;

use axum::Router;
use irrigation_api::LimitSettings;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{Relay, SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::{LimitRepository, SensorSampleRepository};
use crate::services::{
    RelayHandle, RelayService, SampleWriter, SqliteSampleStore, WebSocketState, websocket_router,
};

pub fn create_router(storage: Arc<Storage>, relay: RelayHandle, settings: &Relay) -> Router {
    let sensor_state = SensorState {
        sensor_sample_repository: Arc::new(SensorSampleRepository::new(storage.clone())),
    };

    let limit_state = LimitState {
        limit_repository: Arc::new(LimitRepository::new(storage.clone())),
        default_limit_id: settings.limit_id,
    };

    Router::new()
        .merge(websocket_router(WebSocketState { relay }))
        .merge(sensor_router(sensor_state))
        .merge(limit_router(limit_state))
        .merge(openapi_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Reads the configured limit row so the relay starts with persisted limits.
pub async fn load_limits(
    storage: Arc<Storage>,
    settings: &Relay,
) -> anyhow::Result<Option<LimitSettings>> {
    let limit = LimitRepository::new(storage)
        .find_by_id(settings.limit_id)
        .await?;

    Ok(limit.map(|limit| limit.settings()))
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(Storage::new(&settings.database, SchemaManager::default()).await?);

    let limits = load_limits(storage.clone(), &settings.relay).await?;
    if limits.is_none() {
        tracing::info!(
            "No stored limit {}, starting with zero limits",
            settings.relay.limit_id
        );
    }

    let (writer, _monitor) =
        SampleWriter::with_monitor(Arc::new(SqliteSampleStore::new(storage.clone())));
    let relay = RelayService::new(&settings.relay, writer, limits).start();

    Ok(create_router(storage, relay, &settings.relay))
}
