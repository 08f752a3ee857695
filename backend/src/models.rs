use std::fmt;

pub use shared::Coordinate;

/// A single entry of a `maps/dir/` path before any lookup happened.
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointToken {
    Coordinate(Coordinate),
    PlaceName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelMode {
    Driving,
    Cycling,
    Walking,
    Hiking,
    Running,
    Transit,
    /// Only produced by the `!3e4` URL code; moves at the `Unknown` speed.
    Flight,
    Unknown,
}

impl TravelMode {
    /// Maps the digits following a `!3e` marker.
    pub fn from_mode_code(code: &str) -> Self {
        match code {
            "0" => TravelMode::Driving,
            "1" => TravelMode::Cycling,
            "2" => TravelMode::Walking,
            "3" => TravelMode::Transit,
            "4" => TravelMode::Flight,
            _ => TravelMode::Unknown,
        }
    }

    /// Total mapping from free text; anything unrecognised is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "driving" => TravelMode::Driving,
            "cycling" | "bicycling" => TravelMode::Cycling,
            "walking" => TravelMode::Walking,
            "hiking" => TravelMode::Hiking,
            "running" => TravelMode::Running,
            "transit" => TravelMode::Transit,
            "flight" => TravelMode::Flight,
            _ => TravelMode::Unknown,
        }
    }

    /// Assumed average speed in meters per second.
    pub fn speed_mps(self) -> f64 {
        match self {
            TravelMode::Walking => 1.4,
            TravelMode::Hiking => 1.0,
            TravelMode::Running => 3.0,
            TravelMode::Cycling => 4.2,
            TravelMode::Driving => 13.9,
            TravelMode::Transit => 8.3,
            TravelMode::Flight | TravelMode::Unknown => 2.8,
        }
    }

    /// Mode name understood by the directions provider.
    pub fn directions_mode(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Cycling => "bicycling",
            TravelMode::Transit => "transit",
            _ => "walking",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Cycling => "cycling",
            TravelMode::Walking => "walking",
            TravelMode::Hiking => "hiking",
            TravelMode::Running => "running",
            TravelMode::Transit => "transit",
            TravelMode::Flight => "flight",
            TravelMode::Unknown => "unknown",
        }
    }

    /// Capitalized name written as the GPX track `<type>`.
    pub fn activity_type(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
