use std::future::Future;

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use crate::error::UpstreamError;
use crate::models::Coordinate;

/// Turns a free-text place name into a single coordinate.
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the provider answered but knows no such place.
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, UpstreamError>> + Send;
}

/// Client for a Nominatim-compatible `/search` endpoint.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }

    fn request(&self, query: &str) -> RequestBuilder {
        self.client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, UpstreamError> {
        let response = self.request(query).send().await?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        places.first().map(parse_place).transpose()
    }
}

fn parse_place(place: &NominatimPlace) -> Result<Coordinate, UpstreamError> {
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| UpstreamError::InvalidCoordinate(value.to_string()))
    };
    Ok(Coordinate {
        lat: parse(&place.lat)?,
        lon: parse(&place.lon)?,
    })
}
