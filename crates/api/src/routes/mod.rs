pub mod companies;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /companies/{company_id}/event-stream            get, update, uninstall
/// /companies/{company_id}/event-stream/install    install (POST)
/// /companies/{company_id}/host-events             publish host event (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/companies/{company_id}", companies::router())
}
