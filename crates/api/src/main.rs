use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventstream_api::config::ServerConfig;
use eventstream_api::router::build_app_router;
use eventstream_api::state::AppState;
use eventstream_db::PgStore;
use eventstream_events::{EventBus, EventStreamPlugin};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "eventstream_api=debug,eventstream_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = config.port,
        connect_timeout_secs = config.delivery.connect_timeout.as_secs(),
        log_failures = config.delivery.log_failures,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = eventstream_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    eventstream_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    let store = Arc::new(PgStore::new(pool));

    // --- Event stream ---
    let plugin = Arc::new(
        EventStreamPlugin::from_config(store.clone(), store.clone(), &config.delivery)
            .expect("Failed to build event stream HTTP client"),
    );
    let event_bus = Arc::new(EventBus::new(config.delivery.bus_capacity));

    let stream_cancel = CancellationToken::new();
    let stream_handle = tokio::spawn(
        Arc::clone(&plugin).run(event_bus.subscribe(), stream_cancel.clone()),
    );
    tracing::info!(
        subscriptions = plugin.subscriptions().len(),
        "Event stream started"
    );

    // --- App state ---
    let state = AppState {
        settings: store,
        plugin,
        event_bus: Arc::clone(&event_bus),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    stream_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), stream_handle).await;
    tracing::info!("Event stream stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
