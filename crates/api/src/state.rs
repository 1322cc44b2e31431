use std::sync::Arc;

use eventstream_core::settings::SettingsStore;
use eventstream_events::{EventBus, EventStreamPlugin};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Per-company settings (endpoint, signing key).
    pub settings: Arc<dyn SettingsStore>,
    /// Event stream plugin, used for install/uninstall.
    pub plugin: Arc<EventStreamPlugin>,
    /// Host event bus; ingress publishes here and the plugin consumes it.
    pub event_bus: Arc<EventBus>,
    pub config: Arc<ServerConfig>,
}
