#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use eventstream_api::config::ServerConfig;
use eventstream_api::router::build_app_router;
use eventstream_api::state::AppState;
use eventstream_core::lookup::InMemoryEntityLookup;
use eventstream_core::settings::InMemorySettingsStore;
use eventstream_events::{DeliveryConfig, EventBus, EventStreamPlugin};

/// Handles to the in-memory collaborators behind a test app.
pub struct TestApp {
    pub router: Router,
    pub settings: Arc<InMemorySettingsStore>,
    pub lookup: Arc<InMemoryEntityLookup>,
    pub plugin: Arc<EventStreamPlugin>,
    pub event_bus: Arc<EventBus>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Start consuming the bus. The returned token stops the consumer.
    pub fn start_stream(&self) -> CancellationToken {
        let cancel = CancellationToken::new();
        tokio::spawn(
            Arc::clone(&self.plugin).run(self.event_bus.subscribe(), cancel.clone()),
        );
        cancel
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        delivery: DeliveryConfig::default(),
    }
}

/// Build the full application router over in-memory stores, with the same
/// middleware stack as the binary.
pub fn build_test_app(settings: InMemorySettingsStore, lookup: InMemoryEntityLookup) -> TestApp {
    let config = test_config();
    let settings = Arc::new(settings);
    let lookup = Arc::new(lookup);

    let plugin = Arc::new(
        EventStreamPlugin::from_config(settings.clone(), lookup.clone(), &config.delivery)
            .expect("HTTP client"),
    );
    let event_bus = Arc::new(EventBus::new(config.delivery.bus_capacity));

    let state = AppState {
        settings: settings.clone(),
        plugin: Arc::clone(&plugin),
        event_bus: Arc::clone(&event_bus),
        config: Arc::new(config),
    };

    TestApp {
        router: build_app_router(state),
        settings,
        lookup,
        plugin,
        event_bus,
    }
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
