//! Road-following expansion of a sparse waypoint list through a
//! Google-compatible directions service.

use std::future::Future;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use crate::config::ApiKey;
use crate::error::UpstreamError;
use crate::models::{Coordinate, TravelMode};
use crate::polyline;

const STATUS_OK: &str = "OK";

#[derive(Debug, Clone, Copy)]
pub struct DirectionsQuery<'a> {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub via: &'a [Coordinate],
    pub mode: TravelMode,
    pub key: &'a ApiKey,
}

/// Raw access to a directions service.
pub trait DirectionsProvider: Send + Sync {
    fn directions(
        &self,
        query: DirectionsQuery<'_>,
    ) -> impl Future<Output = Result<DirectionsResponse, UpstreamError>> + Send;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub polyline: Option<EncodedPolyline>,
    pub end_location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(value: LatLng) -> Self {
        Coordinate {
            lat: value.lat,
            lon: value.lng,
        }
    }
}

#[derive(Clone)]
pub struct GoogleDirections {
    client: Client,
    endpoint: String,
}

impl GoogleDirections {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// `origin`, `destination` and `waypoints` are `lat,lon`; via points are `|`-joined.
    fn request(&self, query: &DirectionsQuery<'_>) -> RequestBuilder {
        let mut params = vec![
            ("origin", lat_lng_param(query.origin)),
            ("destination", lat_lng_param(query.destination)),
            ("mode", query.mode.directions_mode().to_string()),
            ("key", query.key.expose().to_string()),
        ];
        if !query.via.is_empty() {
            let via = query
                .via
                .iter()
                .map(|c| lat_lng_param(*c))
                .collect::<Vec<_>>()
                .join("|");
            params.push(("waypoints", via));
        }
        self.client.get(&self.endpoint).query(&params)
    }
}

impl DirectionsProvider for GoogleDirections {
    async fn directions(
        &self,
        query: DirectionsQuery<'_>,
    ) -> Result<DirectionsResponse, UpstreamError> {
        let response = self.request(&query).send().await?;
        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

fn lat_lng_param(c: Coordinate) -> String {
    format!("{},{}", c.lat, c.lon)
}

/// Where the points of an [`Expansion`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Directions,
    StraightLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub points: Vec<Coordinate>,
    pub source: PathSource,
}

/// Wraps a [`DirectionsProvider`] and never fails: any problem degrades to
/// the straight line through the requested points.
pub struct DirectionsExpander<P> {
    provider: P,
    api_key: Option<ApiKey>,
}

impl<P: DirectionsProvider> DirectionsExpander<P> {
    pub fn new(provider: P, api_key: Option<ApiKey>) -> Self {
        Self { provider, api_key }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn expand(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        via: &[Coordinate],
    ) -> Vec<Coordinate> {
        self.expand_detailed(origin, destination, mode, via)
            .await
            .points
    }

    pub async fn expand_detailed(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        via: &[Coordinate],
    ) -> Expansion {
        match self.road_path(origin, destination, mode, via).await {
            Ok(points) => {
                tracing::info!(
                    "directions returned {} points for {} mode",
                    points.len(),
                    mode.directions_mode()
                );
                Expansion {
                    points,
                    source: PathSource::Directions,
                }
            }
            Err(err) => {
                tracing::warn!("directions unavailable ({err}), using straight lines");
                Expansion {
                    points: straight_line(origin, destination, via),
                    source: PathSource::StraightLine,
                }
            }
        }
    }

    async fn road_path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        via: &[Coordinate],
    ) -> Result<Vec<Coordinate>, UpstreamError> {
        let key = self.api_key.as_ref().ok_or(UpstreamError::MissingApiKey)?;
        let response = self
            .provider
            .directions(DirectionsQuery {
                origin,
                destination,
                via,
                mode,
                key,
            })
            .await?;

        if response.status != STATUS_OK {
            return Err(UpstreamError::Provider(response.status));
        }
        let route = response.routes.first().ok_or(UpstreamError::EmptyRoute)?;
        path_from_route(route)
    }
}

pub fn straight_line(
    origin: Coordinate,
    destination: Coordinate,
    via: &[Coordinate],
) -> Vec<Coordinate> {
    let mut points = Vec::with_capacity(via.len() + 2);
    points.push(origin);
    points.extend_from_slice(via);
    points.push(destination);
    points
}

/// Flattens legs and steps into one path, then collapses adjacent repeats.
pub fn path_from_route(route: &DirectionsRoute) -> Result<Vec<Coordinate>, UpstreamError> {
    let mut points: Vec<Coordinate> = Vec::new();

    for leg in &route.legs {
        push_if_new(&mut points, leg.start_location.into());
        for step in &leg.steps {
            if let Some(polyline) = &step.polyline {
                points.extend(polyline::decode(&polyline.points)?);
            }
            points.push(step.end_location.into());
        }
        push_if_new(&mut points, leg.end_location.into());
    }

    let points = collapse_adjacent_duplicates(points);
    if points.len() < 2 {
        return Err(UpstreamError::EmptyRoute);
    }
    Ok(points)
}

fn push_if_new(points: &mut Vec<Coordinate>, point: Coordinate) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

/// Drops a point only when it equals the one right before it.
pub fn collapse_adjacent_duplicates(mut points: Vec<Coordinate>) -> Vec<Coordinate> {
    points.dedup();
    points
}
