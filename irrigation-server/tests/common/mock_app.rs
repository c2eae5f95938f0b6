#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use irrigation_server::app::{create_router, load_limits};
use irrigation_server::configs::{Relay, Storage};
use irrigation_server::services::{
    FailureMonitor, RelayHandle, RelayService, SampleWriter, SqliteSampleStore,
};
use irrigation_server::tests::setup_test_storage;
use serde_json::Value;
use tower::ServiceExt;

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub relay: RelayHandle,
    pub failures: FailureMonitor,
    pub settings: Relay,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        Self::with_relay_settings(Relay::default()).await
    }

    pub async fn with_relay_settings(settings: Relay) -> Self {
        let storage = setup_test_storage().await;
        Self::with_storage(storage, settings).await
    }

    /// Starts a relay over an existing store, seeding limits the way startup does.
    pub async fn with_storage(storage: Arc<Storage>, settings: Relay) -> Self {
        let limits = load_limits(storage.clone(), &settings).await.unwrap();
        let (writer, failures) =
            SampleWriter::with_monitor(Arc::new(SqliteSampleStore::new(storage.clone())));
        let relay = RelayService::new(&settings, writer, limits).start();
        let router = create_router(storage.clone(), relay.clone(), &settings);

        Self {
            storage,
            relay,
            failures,
            settings,
            router,
        }
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }

    /// Polls the store until the fire-and-forget writes have landed.
    pub async fn wait_for_samples(&self, expected: i64) {
        for _ in 0..200 {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensor_data")
                .fetch_one(self.storage.get_pool())
                .await
                .unwrap();
            if count >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {expected} stored samples");
    }

    pub async fn wait_for_limit(&self, id: i64) {
        for _ in 0..200 {
            let found: Option<i64> = sqlx::query_scalar("SELECT id FROM limits WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await
                .unwrap();
            if found.is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected limit {id} to be stored");
    }
}
