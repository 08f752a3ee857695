pub mod config;
pub mod convert;
pub mod directions;
pub mod error;
pub mod geocoding;
pub mod gpx_export;
pub mod maps_url;
pub mod models;
pub mod polyline;
pub mod resolver;
pub mod routing;
pub mod short_link;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use shared::{ApiError, ApiKeyStatus, ConvertRequest, KeyStatus, RoutePreview};
use tower_http::trace::TraceLayer;

use crate::config::UpstreamConfig;
use crate::convert::{convert, Conversion};
use crate::directions::{DirectionsExpander, GoogleDirections};
use crate::error::{ConvertError, ResolveError, SynthesisError};
use crate::geocoding::NominatimGeocoder;
use crate::gpx_export::MIME_TYPE;
use crate::resolver::UrlResolver;
use crate::routing::approximate_distance_km;
use crate::short_link::HttpLinkExpander;

pub type HttpResolver = UrlResolver<HttpLinkExpander, NominatimGeocoder, GoogleDirections>;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<HttpResolver>,
}

impl AppState {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            resolver: Arc::new(build_resolver(config)?),
        })
    }
}

/// Wires the HTTP-backed lookups with one shared client.
pub fn build_resolver(config: &UpstreamConfig) -> Result<HttpResolver, reqwest::Error> {
    let client = config.http_client()?;
    Ok(UrlResolver::new(
        HttpLinkExpander::new(client.clone()),
        NominatimGeocoder::new(client.clone(), &config.geocoder_url, &config.user_agent),
        DirectionsExpander::new(
            GoogleDirections::new(client, &config.directions_url),
            config.api_key(),
        ),
    ))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/convert", post(convert_handler))
        .route("/api/preview", post(preview_handler))
        .route("/api/key-status", get(key_status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_conversion(
    state: &AppState,
    req: &ConvertRequest,
) -> Result<Conversion, (StatusCode, Json<ApiError>)> {
    convert(
        &*state.resolver,
        &req.url,
        req.name.as_deref(),
        req.mode.as_deref(),
    )
    .await
    .map_err(convert_error)
}

async fn convert_handler(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let conversion = run_conversion(&state, &req).await?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        conversion.filename
    ))
    .map_err(|err| internal_error(err.to_string()))?;
    let road_following = HeaderValue::from_static(if conversion.road_following() {
        "true"
    } else {
        "false"
    });

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(MIME_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
            (header::HeaderName::from_static("x-road-following"), road_following),
        ],
        conversion.gpx,
    )
        .into_response())
}

async fn preview_handler(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<RoutePreview>, (StatusCode, Json<ApiError>)> {
    let conversion = run_conversion(&state, &req).await?;
    let path = conversion.track.coordinates();

    Ok(Json(RoutePreview {
        name: conversion.track.name.clone(),
        distance_km: approximate_distance_km(&path),
        travel_mode: conversion.track.mode.to_string(),
        road_following: conversion.road_following(),
        skipped_places: conversion.route.skipped_places(),
        gpx_base64: BASE64.encode(&conversion.gpx),
        path,
    }))
}

async fn key_status_handler(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    let status = if state.resolver.has_api_key() {
        ApiKeyStatus {
            status: KeyStatus::Active,
            message: "Google API key is configured".into(),
        }
    } else {
        ApiKeyStatus {
            status: KeyStatus::Missing,
            message: "No Google API key found. Routes will use straight lines between points."
                .into(),
        }
    };
    Json(status)
}

fn convert_error(err: ConvertError) -> (StatusCode, Json<ApiError>) {
    let (status, message) = match &err {
        ConvertError::InvalidInputUrl(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        ConvertError::Resolve(ResolveError::NoCoordinatesFound) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "No route data available - check the link".to_string(),
        ),
        ConvertError::Synthesis(SynthesisError::InsufficientWaypoints { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Found a location but not a route - share a directions link".to_string(),
        ),
        ConvertError::Synthesis(_) => {
            tracing::error!("GPX generation failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };
    (status, Json(ApiError { message }))
}

fn internal_error(message: String) -> (StatusCode, Json<ApiError>) {
    tracing::error!("{message}");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError { message }))
}
