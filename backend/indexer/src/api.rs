//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;
use crate::standings::{self, Standings};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub contract_id: String,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FunderEventsResponse {
    pub address: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct StandingsResponse {
    pub contract_id: String,
    #[serde(flatten)]
    pub standings: Standings,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        error!("API request failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, IndexerError>;

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> ApiResult<AllEventsResponse> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /funders/:address/events`
///
/// Every indexed event whose actor is `address`: contributions for a funder,
/// deployment and withdrawals for the owner.
pub async fn get_funder_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> ApiResult<FunderEventsResponse> {
    let events = db::get_events_for_actor(&state.pool, &address).await?;
    Ok(Json(FunderEventsResponse {
        address,
        count: events.len(),
        events,
    }))
}

/// `GET /funders`
///
/// Funders of the open cycle with their totals, rebuilt from the event log.
pub async fn get_standings(State(state): State<Arc<ApiState>>) -> ApiResult<StandingsResponse> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(StandingsResponse {
        contract_id: state.contract_id.clone(),
        standings: standings::compute(&events)?,
    }))
}
