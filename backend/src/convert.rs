use chrono::{DateTime, Utc};

use crate::directions::{DirectionsProvider, PathSource};
use crate::error::ConvertError;
use crate::geocoding::Geocoder;
use crate::gpx_export::{synthesize, Track};
use crate::maps_url::validate_maps_url;
use crate::models::TravelMode;
use crate::resolver::{ResolvedRoute, UrlResolver};
use crate::short_link::LinkExpander;

/// A finished conversion, ready to be handed out as a download.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub track: Track,
    pub gpx: Vec<u8>,
    pub filename: String,
    pub route: ResolvedRoute,
}

impl Conversion {
    pub fn road_following(&self) -> bool {
        self.route.source == PathSource::Directions
    }
}

/// URL string + optional name in, GPX bytes out. `mode` replaces the travel
/// mode found in the link when given.
pub async fn convert<L, G, D>(
    resolver: &UrlResolver<L, G, D>,
    url: &str,
    name: Option<&str>,
    mode: Option<&str>,
) -> Result<Conversion, ConvertError>
where
    L: LinkExpander,
    G: Geocoder,
    D: DirectionsProvider,
{
    validate_maps_url(url)?;
    let name = name.map(sanitize_route_name).filter(|n| !n.trim().is_empty());

    let route = resolver.resolve(url.trim()).await?;
    let mode = mode.map(TravelMode::parse).unwrap_or(route.mode);
    tracing::info!(
        "resolved {} point(s), mode {}, {:?}",
        route.points.len(),
        mode,
        route.source
    );

    let track = synthesize(&route.points, name.as_deref(), mode)?;
    let gpx = track.write_gpx()?;
    let filename = download_filename(&track.name, track.created_at);

    Ok(Conversion {
        track,
        gpx,
        filename,
        route,
    })
}

/// Keeps ASCII letters, digits and `-_. `; anything else becomes `_`.
pub fn sanitize_route_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "-_. ".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn download_filename(name: &str, date: DateTime<Utc>) -> String {
    format!("{}_{}.gpx", sanitize_route_name(name), date.format("%Y%m%d"))
}
