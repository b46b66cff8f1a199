pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    control::ControlService, db::Store, sensors::ReadingService, sunset::SunriseSunsetClient,
};
use handlers::ApiDoc;

/// State shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub control: Arc<ControlService<Store, SunriseSunsetClient>>,
    pub readings: Arc<ReadingService<Store>>,
    /// Zone used to render reading timestamps.
    pub timezone: Tz,
}

impl AppState {
    pub fn new(store: Store, sunset: SunriseSunsetClient, timezone: Tz) -> Self {
        Self {
            control: Arc::new(ControlService::new(store.clone(), sunset, timezone)),
            readings: Arc::new(ReadingService::new(store)),
            timezone,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/reading", post(handlers::post_reading))
        .route("/graph", get(handlers::get_graph))
        .route("/control", get(handlers::get_control))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(TraceLayer::new_for_http())
}

/// CORS for the browser dashboard: listed origins only, with credentials.
///
/// Methods and headers are mirrored from the preflight request, since a
/// wildcard cannot be combined with credentials.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
