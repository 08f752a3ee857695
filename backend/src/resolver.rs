//! URL → ordered waypoint list.
//!
//! Extraction runs as a chain of strategies, first match wins:
//! 1. the `maps/dir/` path (coordinates and geocoded place names), refined
//!    through the directions provider when a key is configured,
//! 2. embedded `!2d<lon>!3d<lat>` data markers,
//! 3. the `@lat,lon` viewport centre (single point).
//!
//! Upstream failures never surface as errors here; they only lower fidelity
//! and are reported through [`ResolvedRoute::warnings`].

use crate::directions::{DirectionsExpander, DirectionsProvider, PathSource};
use crate::error::ResolveError;
use crate::geocoding::Geocoder;
use crate::maps_url::{self, Extraction};
use crate::models::{Coordinate, TravelMode, WaypointToken};
use crate::short_link::LinkExpander;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveWarning {
    ShortLinkNotExpanded(String),
    PlaceNotFound(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub points: Vec<Coordinate>,
    pub mode: TravelMode,
    pub source: PathSource,
    pub warnings: Vec<ResolveWarning>,
}

impl ResolvedRoute {
    pub fn skipped_places(&self) -> Vec<String> {
        self.warnings
            .iter()
            .filter_map(|warning| match warning {
                ResolveWarning::PlaceNotFound(name) => Some(name.clone()),
                ResolveWarning::ShortLinkNotExpanded(_) => None,
            })
            .collect()
    }
}

pub struct UrlResolver<L, G, D> {
    links: L,
    geocoder: G,
    directions: DirectionsExpander<D>,
}

impl<L, G, D> UrlResolver<L, G, D>
where
    L: LinkExpander,
    G: Geocoder,
    D: DirectionsProvider,
{
    pub fn new(links: L, geocoder: G, directions: DirectionsExpander<D>) -> Self {
        Self {
            links,
            geocoder,
            directions,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.directions.has_api_key()
    }

    /// Resolves a raw URL. A one-point route is returned as-is; callers needing
    /// a path must check the length.
    pub async fn resolve(&self, raw_url: &str) -> Result<ResolvedRoute, ResolveError> {
        let mut warnings = Vec::new();
        let url = self.expand_short_link(raw_url, &mut warnings).await;
        let mode = maps_url::travel_mode(&url);
        tracing::debug!("detected travel mode: {mode}");

        let sparse = self.resolve_tokens(maps_url::dir_path_tokens(&url), &mut warnings).await;
        if sparse.len() >= 2 {
            let (points, source) = self.refine(sparse, mode).await;
            return Ok(ResolvedRoute {
                points,
                mode,
                source,
                warnings,
            });
        }

        let points = maps_url::embedded_data_points(&url)
            .or_else(|| maps_url::viewport_point(&url))
            .into_points()
            .or_else(|| (!sparse.is_empty()).then_some(sparse))
            .ok_or(ResolveError::NoCoordinatesFound)?;

        tracing::debug!("fallback extraction produced {} point(s)", points.len());
        Ok(ResolvedRoute {
            points,
            mode,
            source: PathSource::StraightLine,
            warnings,
        })
    }

    async fn expand_short_link(&self, url: &str, warnings: &mut Vec<ResolveWarning>) -> String {
        if !maps_url::is_short_link(url) {
            return url.to_string();
        }
        match self.links.expand(url).await {
            Ok(expanded) => {
                tracing::info!("expanded short link to {expanded}");
                expanded
            }
            Err(err) => {
                tracing::warn!("could not expand short link {url}: {err}");
                warnings.push(ResolveWarning::ShortLinkNotExpanded(url.to_string()));
                url.to_string()
            }
        }
    }

    async fn resolve_tokens(
        &self,
        tokens: Vec<WaypointToken>,
        warnings: &mut Vec<ResolveWarning>,
    ) -> Vec<Coordinate> {
        let mut points = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                WaypointToken::Coordinate(coord) => points.push(coord),
                WaypointToken::PlaceName(name) => match self.geocoder.geocode(&name).await {
                    Ok(Some(coord)) => {
                        tracing::debug!("geocoded {name:?} to {},{}", coord.lat, coord.lon);
                        points.push(coord);
                    }
                    Ok(None) => {
                        tracing::warn!("no geocoding match for {name:?}, skipping waypoint");
                        warnings.push(ResolveWarning::PlaceNotFound(name));
                    }
                    Err(err) => {
                        tracing::warn!("geocoding {name:?} failed: {err}, skipping waypoint");
                        warnings.push(ResolveWarning::PlaceNotFound(name));
                    }
                },
            }
        }
        points
    }

    async fn refine(&self, sparse: Vec<Coordinate>, mode: TravelMode) -> (Vec<Coordinate>, PathSource) {
        if !self.directions.has_api_key() {
            tracing::info!("no directions api key, keeping {} straight-line waypoints", sparse.len());
            return (sparse, PathSource::StraightLine);
        }
        let (origin, destination) = (sparse[0], sparse[sparse.len() - 1]);
        let via = &sparse[1..sparse.len() - 1];
        let expansion = self
            .directions
            .expand_detailed(origin, destination, mode, via)
            .await;
        (expansion.points, expansion.source)
    }
}
