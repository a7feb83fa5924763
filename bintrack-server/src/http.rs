//! REST surface: router, handlers, and the error-to-status mapping.
//!
//! Every response body is a JSON envelope with a `success` flag; error
//! bodies carry a single human-readable message and never internal
//! details.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use bintrack_core::geo::DEFAULT_RADIUS_KM;
use bintrack_core::model::{Bin, BinId, BinStatus, NewBin};
use bintrack_core::ports::StoreError;
use bintrack_core::service::{BinService, ServiceError};

#[derive(Clone)]
/// Shared state handed to every handler.
pub struct AppState {
    service: Arc<BinService>,
}

/// Build the application router around a bin service.
///
/// The literal `/bins/nearby` route coexists with the `/bins/{id}`
/// capture; the router matches literals first, so "nearby" is never
/// treated as an id.
pub fn router(service: Arc<BinService>) -> Router {
    let state = AppState { service };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/bins", post(create_bin).get(list_bins))
        .route("/bins/nearby", get(nearby_bins))
        .route("/bins/{id}", get(get_bin).delete(delete_bin))
        .route("/bins/{id}/status", patch(update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
/// Envelope for a single bin.
struct BinEnvelope {
    success: bool,
    data: Bin,
}

#[derive(Serialize)]
/// Envelope for a plain bin listing.
struct ListEnvelope {
    success: bool,
    count: usize,
    data: Vec<Bin>,
}

#[derive(Serialize)]
/// Envelope for the nearby search, echoing the applied radius.
struct NearbyEnvelope {
    success: bool,
    count: usize,
    radius: String,
    data: Vec<Bin>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Debug)]
/// Handler error carrying the status code it maps to.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Query(_) | ServiceError::Store(StoreError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.message, "request rejected");
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

async fn create_bin(
    State(state): State<AppState>,
    Json(new_bin): Json<NewBin>,
) -> Result<impl IntoResponse, ApiError> {
    let bin = state.service.add_bin(new_bin).await?;
    info!(bin_id = %bin.id, "bin registered");
    Ok((
        StatusCode::CREATED,
        Json(BinEnvelope {
            success: true,
            data: bin,
        }),
    ))
}

async fn list_bins(State(state): State<AppState>) -> Result<Json<ListEnvelope>, ApiError> {
    let bins = state.service.bins().await?;
    Ok(Json(ListEnvelope {
        success: true,
        count: bins.len(),
        data: bins,
    }))
}

async fn get_bin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BinEnvelope>, ApiError> {
    let bin = state.service.bin(&BinId(id)).await?;
    Ok(Json(BinEnvelope {
        success: true,
        data: bin,
    }))
}

#[derive(Deserialize)]
struct StatusBody {
    status: BinStatus,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<BinEnvelope>, ApiError> {
    let bin = state.service.set_status(&BinId(id), body.status).await?;
    info!(bin_id = %bin.id, status = %bin.status, "bin status updated");
    Ok(Json(BinEnvelope {
        success: true,
        data: bin,
    }))
}

async fn delete_bin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BinEnvelope>, ApiError> {
    let bin = state.service.remove_bin(&BinId(id)).await?;
    info!(bin_id = %bin.id, "bin removed");
    Ok(Json(BinEnvelope {
        success: true,
        data: bin,
    }))
}

#[derive(Deserialize)]
/// Raw nearby query parameters; parsed by hand so missing and malformed
/// values both produce the JSON error envelope instead of a framework
/// rejection.
struct NearbyParams {
    lat: Option<String>,
    lng: Option<String>,
    radius: Option<String>,
}

async fn nearby_bins(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyEnvelope>, ApiError> {
    let latitude = parse_required(params.lat.as_deref(), "lat")?;
    let longitude = parse_required(params.lng.as_deref(), "lng")?;
    let radius_km = match params.radius.as_deref() {
        None => DEFAULT_RADIUS_KM,
        Some(raw) => raw
            .parse()
            .map_err(|_parse| ApiError::bad_request("radius must be a number"))?,
    };

    let bins = state.service.nearby(latitude, longitude, radius_km).await?;
    Ok(Json(NearbyEnvelope {
        success: true,
        count: bins.len(),
        radius: format!("{radius_km} km"),
        data: bins,
    }))
}

fn parse_required(raw: Option<&str>, name: &str) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| {
        ApiError::bad_request(format!("{name} query parameter is required"))
    })?;
    raw.parse()
        .map_err(|_parse| ApiError::bad_request(format!("{name} must be a number")))
}
