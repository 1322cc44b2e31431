//! Company-scoped routes mounted at `/companies/{company_id}`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{event_stream, host_events};
use crate::state::AppState;

/// ```text
/// GET    /event-stream           -> get_settings
/// PUT    /event-stream           -> update_settings
/// DELETE /event-stream           -> uninstall
/// POST   /event-stream/install   -> install
/// POST   /host-events            -> publish
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/event-stream",
            get(event_stream::get_settings)
                .put(event_stream::update_settings)
                .delete(event_stream::uninstall),
        )
        .route("/event-stream/install", post(event_stream::install))
        .route("/host-events", post(host_events::publish))
}
