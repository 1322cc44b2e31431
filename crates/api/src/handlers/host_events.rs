//! Host event ingress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use eventstream_core::types::DbId;
use eventstream_events::{HostEvent, TenantEvent};
use serde::Serialize;

use super::event_stream::require_company;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Accepted {
    pub event: &'static str,
    /// Number of bus subscribers that received the event.
    pub receivers: usize,
}

/// POST /api/v1/companies/{company_id}/host-events
///
/// Publishes the event onto the host bus and returns immediately; delivery
/// happens in the background and its outcome is never reported here.
pub async fn publish(
    State(state): State<AppState>,
    Path(company_id): Path<DbId>,
    Json(event): Json<HostEvent>,
) -> AppResult<impl IntoResponse> {
    let company_id = require_company(company_id)?;
    let name = event.name();
    let receivers = state
        .event_bus
        .publish(TenantEvent::new(company_id, event));

    tracing::debug!(company_id, event = name, receivers, "Host event published");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: Accepted {
                event: name,
                receivers,
            },
        }),
    ))
}
