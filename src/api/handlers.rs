use axum::{extract::State, Json};
use utoipa::OpenApi;

use super::{
    dto::{ControlDto, ErrorBody, ReadingRequest, SensorReadingDto, SettingsDto, SettingsRequest},
    errors::AppError,
    AppState,
};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Replace the settings record.
///
/// `user_light` may be `"sunset"`, in which case today's local sunset for the
/// configured site is looked up and stored instead. `light_time_off` is
/// always recomputed.
#[utoipa::path(
    put,
    path = "/settings",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Stored settings", body = SettingsDto),
        (status = 400, description = "Invalid start time or duration", body = ErrorBody),
        (status = 502, description = "Sunset lookup failed", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "settings"
)]
pub async fn put_settings(
    State(state): State<AppState>,
    Json(body): Json<SettingsRequest>,
) -> Result<Json<SettingsDto>, AppError> {
    let stored = state.control.update_settings(body.into()).await?;
    Ok(Json(stored.into()))
}

/// List stored settings records (zero or one).
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Stored settings", body = Vec<SettingsDto>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SettingsDto>>, AppError> {
    let rows = state.control.list_settings().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Record a sensor reading. Any `datetime` in the body is replaced by the
/// server's receive time.
#[utoipa::path(
    post,
    path = "/reading",
    request_body = ReadingRequest,
    responses(
        (status = 200, description = "Stored reading", body = SensorReadingDto),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn post_reading(
    State(state): State<AppState>,
    Json(body): Json<ReadingRequest>,
) -> Result<Json<SensorReadingDto>, AppError> {
    let reading = state.readings.record(body.temperature, body.presence).await?;
    Ok(Json(SensorReadingDto::new(reading, state.timezone)))
}

/// All stored readings, newest first (at most 1000).
#[utoipa::path(
    get,
    path = "/graph",
    responses(
        (status = 200, description = "Readings, newest first", body = Vec<SensorReadingDto>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn get_graph(
    State(state): State<AppState>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let rows = state.readings.history().await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| SensorReadingDto::new(r, state.timezone))
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// Current fan and light commands, polled by the device.
///
/// Both are `false` until settings and at least one reading exist.
#[utoipa::path(
    get,
    path = "/control",
    responses(
        (status = 200, description = "Actuator commands", body = ControlDto),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "control"
)]
pub async fn get_control(State(state): State<AppState>) -> Result<Json<ControlDto>, AppError> {
    let decision = state.control.decide().await?;
    Ok(Json(decision.into()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(put_settings, get_settings, post_reading, get_graph, get_control, health),
    components(schemas(
        SettingsRequest,
        SettingsDto,
        ReadingRequest,
        SensorReadingDto,
        ControlDto,
        ErrorBody
    )),
    tags(
        (name = "settings", description = "Threshold and light schedule"),
        (name = "readings", description = "Sensor reading ingestion and history"),
        (name = "control",  description = "Fan and light decisions"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Smart Hub API",
        version = "0.1.0",
        description = "REST API for the smart hub fan and light controller"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
