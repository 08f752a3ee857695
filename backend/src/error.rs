use thiserror::Error;

use crate::polyline::PolylineError;

/// Failure of an outbound lookup. Never escapes the resolver: every variant
/// triggers a fallback and is at most reported as a warning.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("provider returned status {0}")]
    Provider(String),
    #[error("provider response has no route")]
    EmptyRoute,
    #[error("invalid polyline in provider response: {0}")]
    Polyline(#[from] PolylineError),
    #[error("invalid coordinate in provider response: {0}")]
    InvalidCoordinate(String),
    #[error("no api key configured")]
    MissingApiKey,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no coordinates found in url")]
    NoCoordinatesFound,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("route needs at least 2 valid waypoints, found {found}")]
    InsufficientWaypoints { found: usize },
    #[error("timestamp out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid url: {0}")]
    InvalidInputUrl(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

impl ConvertError {
    pub fn is_insufficient_waypoints(&self) -> bool {
        matches!(
            self,
            ConvertError::Synthesis(SynthesisError::InsufficientWaypoints { .. })
        )
    }
}
