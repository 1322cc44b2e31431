//! Handlers for per-company event stream administration.
//!
//! Only the endpoint is editable here. Key material is written to the
//! settings store by the host and is never echoed back.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use eventstream_core::settings::{
    self, SETTING_ENDPOINT, SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY,
};
use eventstream_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Event stream settings as shown to administrators.
#[derive(Debug, Serialize)]
pub struct EventStreamSettings {
    /// Configured endpoint; empty when streaming is disabled.
    pub endpoint: String,
    /// Whether a signing key is stored.
    pub signing_enabled: bool,
}

/// Request body for `PUT /companies/{company_id}/event-stream`.
#[derive(Debug, Deserialize)]
pub struct UpdateEventStream {
    pub endpoint: String,
}

pub(crate) fn require_company(company_id: DbId) -> AppResult<DbId> {
    if company_id <= 0 {
        return Err(AppError::BadRequest("company_id must be positive".into()));
    }
    Ok(company_id)
}

async fn load(state: &AppState, company_id: DbId) -> AppResult<EventStreamSettings> {
    let endpoint = state
        .settings
        .get_setting(company_id, SETTING_ENDPOINT)
        .await?
        .unwrap_or_default();

    let mut signing_enabled = false;
    for key in [SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY] {
        let value = state.settings.get_setting(company_id, key).await?;
        if value.is_some_and(|v| !v.trim().is_empty()) {
            signing_enabled = true;
            break;
        }
    }

    Ok(EventStreamSettings {
        endpoint,
        signing_enabled,
    })
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// GET /api/v1/companies/{company_id}/event-stream
pub async fn get_settings(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let company_id = require_company(company_id)?;
    let data = load(&state, company_id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/companies/{company_id}/event-stream
///
/// An empty endpoint disables streaming for the company.
pub async fn update_settings(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
    Json(input): Json<UpdateEventStream>,
) -> AppResult<impl IntoResponse> {
    let company_id = require_company(company_id)?;
    let endpoint = input.endpoint.trim();
    settings::validate_endpoint(endpoint)?;

    state
        .settings
        .set_setting(company_id, SETTING_ENDPOINT, endpoint)
        .await?;

    tracing::info!(
        company_id,
        enabled = !endpoint.is_empty(),
        "Event stream endpoint updated",
    );

    let data = load(&state, company_id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/companies/{company_id}/event-stream/install
pub async fn install(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let company_id = require_company(company_id)?;
    state.plugin.install(company_id).await?;
    let data = load(&state, company_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// DELETE /api/v1/companies/{company_id}/event-stream
pub async fn uninstall(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let company_id = require_company(company_id)?;
    state.plugin.uninstall(company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
