//! Route → time-stamped GPX track.

use chrono::{DateTime, Duration, Utc};
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Metadata, Person, Time, TrackSegment, Waypoint};
use time::OffsetDateTime;

use crate::error::SynthesisError;
use crate::models::{Coordinate, TravelMode};
use crate::routing::{estimated_duration_secs, point_interval_secs, route_distance_m};

pub const CREATOR: &str = "Google Maps to GPX Converter";
pub const MIME_TYPE: &str = "application/gpx+xml";
const LABEL_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub coord: Coordinate,
    pub time: DateTime<Utc>,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub description: String,
    pub mode: TravelMode,
    pub created_at: DateTime<Utc>,
    pub distance_m: f64,
    pub points: Vec<TrackPoint>,
}

pub fn default_route_name(today: DateTime<Utc>) -> String {
    format!("Route {}", today.format("%Y-%m-%d"))
}

/// Builds a track starting now.
pub fn synthesize(
    route: &[Coordinate],
    name: Option<&str>,
    mode: TravelMode,
) -> Result<Track, SynthesisError> {
    synthesize_at(route, name, mode, Utc::now())
}

/// Same as [`synthesize`] with an explicit start time for the first point.
pub fn synthesize_at(
    route: &[Coordinate],
    name: Option<&str>,
    mode: TravelMode,
    base_time: DateTime<Utc>,
) -> Result<Track, SynthesisError> {
    if route.len() < 2 {
        return Err(SynthesisError::InsufficientWaypoints { found: route.len() });
    }

    let valid: Vec<Coordinate> = route
        .iter()
        .enumerate()
        .filter_map(|(idx, coord)| {
            if coord.is_valid() {
                Some(*coord)
            } else {
                tracing::warn!("dropping invalid waypoint #{idx}: {},{}", coord.lat, coord.lon);
                None
            }
        })
        .collect();
    if valid.len() < 2 {
        return Err(SynthesisError::InsufficientWaypoints { found: valid.len() });
    }

    let distance_m = route_distance_m(&valid);
    let total_secs = estimated_duration_secs(distance_m, mode);
    let interval = point_interval_secs(total_secs, valid.len());
    tracing::debug!(
        "{} points over {:.0} m, {:.0} s at {} speed",
        valid.len(),
        distance_m,
        total_secs,
        mode
    );

    let points = valid
        .into_iter()
        .enumerate()
        .map(|(i, coord)| TrackPoint {
            coord,
            time: base_time + seconds(i as f64 * interval),
            label: point_label(),
        })
        .collect();

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_route_name(base_time));

    Ok(Track {
        name,
        description: format!(
            "Converted from Google Maps on {}",
            base_time.format("%Y-%m-%d %H:%M:%S")
        ),
        mode,
        created_at: base_time,
        distance_m,
        points,
    })
}

fn seconds(secs: f64) -> Duration {
    Duration::microseconds((secs * 1_000_000.0).round() as i64)
}

fn point_label() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(LABEL_LEN);
    id
}

fn to_gpx_time(time: DateTime<Utc>) -> Result<Time, SynthesisError> {
    let nanos = i128::from(time.timestamp()) * 1_000_000_000 + i128::from(time.timestamp_subsec_nanos());
    Ok(OffsetDateTime::from_unix_timestamp_nanos(nanos)?.into())
}

impl Track {
    pub fn keywords(&self) -> String {
        ["google maps", self.mode.as_str(), "gpx", "navigation"].join(", ")
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.points.iter().map(|p| p.coord).collect()
    }

    pub fn to_gpx(&self) -> Result<Gpx, SynthesisError> {
        let mut segment = TrackSegment::new();
        for point in &self.points {
            let mut waypoint = Waypoint::new(Point::new(point.coord.lon, point.coord.lat));
            waypoint.elevation = Some(0.0);
            waypoint.time = Some(to_gpx_time(point.time)?);
            waypoint.name = Some(point.label.clone());
            segment.points.push(waypoint);
        }

        let track = gpx::Track {
            name: Some(self.name.clone()),
            type_: Some(self.mode.activity_type()),
            segments: vec![segment],
            ..Default::default()
        };

        Ok(Gpx {
            version: GpxVersion::Gpx11,
            creator: Some(CREATOR.into()),
            metadata: Some(Metadata {
                name: Some(self.name.clone()),
                description: Some(self.description.clone()),
                author: Some(Person {
                    name: Some(CREATOR.into()),
                    ..Default::default()
                }),
                time: Some(to_gpx_time(self.created_at)?),
                keywords: Some(self.keywords()),
                ..Default::default()
            }),
            tracks: vec![track],
            ..Default::default()
        })
    }

    /// GPX 1.1 document as UTF-8 bytes.
    pub fn write_gpx(&self) -> Result<Vec<u8>, SynthesisError> {
        let gpx = self.to_gpx()?;
        let mut buffer = Vec::new();
        gpx::write(&gpx, &mut buffer)?;
        Ok(buffer)
    }
}
