//! Scanners for the Google Maps URL dialects.
//!
//! Pure string work on the raw URL: no lookups, and no panics on arbitrary
//! input.

use percent_encoding::percent_decode_str;

use crate::error::ConvertError;
use crate::models::{Coordinate, TravelMode, WaypointToken};

const SHORT_LINK_HOSTS: [&str; 2] = ["goo.gl/maps", "maps.app.goo.gl"];
const MAPS_HOSTS: [&str; 5] = [
    "google.com/maps",
    "maps.google.com",
    "www.google.com/maps",
    "goo.gl/maps",
    "maps.app.goo.gl",
];
const DIR_MARKER: &str = "maps/dir/";
const MODE_MARKER: &str = "!3e";
const LON_MARKER: &str = "!2d";
const LAT_MARKER: &str = "!3d";

/// Outcome of one extraction strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(Vec<Coordinate>),
    NotFound,
}

impl Extraction {
    /// Runs `next` only when this strategy found nothing.
    pub fn or_else(self, next: impl FnOnce() -> Extraction) -> Extraction {
        match self {
            Extraction::Found(points) => Extraction::Found(points),
            Extraction::NotFound => next(),
        }
    }

    pub fn into_points(self) -> Option<Vec<Coordinate>> {
        match self {
            Extraction::Found(points) => Some(points),
            Extraction::NotFound => None,
        }
    }
}

pub fn is_short_link(url: &str) -> bool {
    SHORT_LINK_HOSTS.iter().any(|host| url.contains(host))
}

/// Cheap gate applied before any conversion work.
pub fn validate_maps_url(url: &str) -> Result<(), ConvertError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::InvalidInputUrl("URL cannot be empty".into()));
    }
    let lower = trimmed.to_ascii_lowercase();
    if !MAPS_HOSTS.iter().any(|host| lower.contains(host)) {
        return Err(ConvertError::InvalidInputUrl(
            "This doesn't appear to be a Google Maps URL".into(),
        ));
    }
    if !trimmed.contains("/dir/") && !trimmed.contains('@') {
        return Err(ConvertError::InvalidInputUrl(
            "URL doesn't contain directions or map coordinates".into(),
        ));
    }
    Ok(())
}

/// Tokens of the first `maps/dir/` path, in travel order.
///
/// The path ends at the first `@` (viewport marker) or `?` (query string).
pub fn dir_path_tokens(url: &str) -> Vec<WaypointToken> {
    let Some(start) = url.find(DIR_MARKER).map(|i| i + DIR_MARKER.len()) else {
        return Vec::new();
    };
    let rest = &url[start..];
    let end = rest.find(&['@', '?'][..]).unwrap_or(rest.len());

    rest[..end]
        .split('/')
        .filter(|segment| !segment.is_empty())
        .filter_map(classify_segment)
        .collect()
}

fn classify_segment(segment: &str) -> Option<WaypointToken> {
    if let Some(coord) = parse_coordinate_pair(segment) {
        return Some(WaypointToken::Coordinate(coord));
    }
    // Maps encodes spaces in place names as '+'
    let spaced = segment.replace('+', " ");
    let name = percent_decode_str(&spaced).decode_utf8_lossy();
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(WaypointToken::PlaceName(name.to_string()))
    }
}

/// Matches exactly `<decimal>,<decimal>` where both sides need a fraction.
fn parse_coordinate_pair(segment: &str) -> Option<Coordinate> {
    let (lat, lon) = segment.split_once(',')?;
    if decimal_len(lat) != Some(lat.len()) || decimal_len(lon) != Some(lon.len()) {
        return None;
    }
    Some(Coordinate {
        lat: lat.parse().ok()?,
        lon: lon.parse().ok()?,
    })
}

/// Length of the `-?\d+\.\d+` prefix of `s`, if there is one (greedy).
fn decimal_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start || bytes.get(i) != Some(&b'.') {
        return None;
    }
    i += 1;
    let frac_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    (i > frac_start).then_some(i)
}

/// Reads the first `!3e<digits>` marker anywhere in the URL.
pub fn travel_mode(url: &str) -> TravelMode {
    url.match_indices(MODE_MARKER)
        .map(|(i, _)| leading_run(&url[i + MODE_MARKER.len()..], |c| c.is_ascii_digit()))
        .find(|digits| !digits.is_empty())
        .map(TravelMode::from_mode_code)
        .unwrap_or(TravelMode::Unknown)
}

/// Every `!2d<lon>!3d<lat>` pair, in order of appearance.
pub fn embedded_data_points(url: &str) -> Extraction {
    let mut points = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = url[cursor..].find(LON_MARKER) {
        let lon_start = cursor + offset + LON_MARKER.len();
        let lon = leading_run(&url[lon_start..], is_number_char);
        let lat_marker = lon_start + lon.len();
        let matched = !lon.is_empty() && url[lat_marker..].starts_with(LAT_MARKER);
        if !matched {
            cursor = cursor + offset + 1;
            continue;
        }

        let lat_start = lat_marker + LAT_MARKER.len();
        let lat = leading_run(&url[lat_start..], is_number_char);
        if lat.is_empty() {
            cursor = cursor + offset + 1;
            continue;
        }
        cursor = lat_start + lat.len();

        match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => points.push(Coordinate { lat, lon }),
            _ => tracing::debug!("skipping unparsable data marker !2d{lon}!3d{lat}"),
        }
    }

    if points.is_empty() {
        Extraction::NotFound
    } else {
        Extraction::Found(points)
    }
}

/// First `@<lat>,<lon>` viewport centre, as a single-point route.
pub fn viewport_point(url: &str) -> Extraction {
    url.match_indices('@')
        .find_map(|(i, _)| {
            let rest = &url[i + 1..];
            let lat_len = decimal_len(rest)?;
            let after_lat = rest[lat_len..].strip_prefix(',')?;
            let lon_len = decimal_len(after_lat)?;
            Some(Coordinate {
                lat: rest[..lat_len].parse().ok()?,
                lon: after_lat[..lon_len].parse().ok()?,
            })
        })
        .map_or(Extraction::NotFound, |point| Extraction::Found(vec![point]))
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '.'
}

fn leading_run(s: &str, keep: impl Fn(char) -> bool) -> &str {
    let end = s.find(|c: char| !keep(c)).unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> WaypointToken {
        WaypointToken::Coordinate(Coordinate { lat, lon })
    }

    fn place(name: &str) -> WaypointToken {
        WaypointToken::PlaceName(name.to_string())
    }

    #[test]
    fn dir_path_with_two_coordinates() {
        let url = "https://www.google.com/maps/dir/48.8584,2.2945/48.8606,2.3376/@48.85,2.31,14z/data=!4m2!4m1!3e2";
        assert_eq!(
            dir_path_tokens(url),
            vec![coord(48.8584, 2.2945), coord(48.8606, 2.3376)]
        );
    }

    #[test]
    fn dir_path_mixes_places_and_coordinates() {
        let url = "https://www.google.com/maps/dir/Eiffel+Tower,+Paris/48.8606,2.3376/Caf%C3%A9%20de%20Flore/@48.85,2.31,14z";
        assert_eq!(
            dir_path_tokens(url),
            vec![
                place("Eiffel Tower, Paris"),
                coord(48.8606, 2.3376),
                place("Café de Flore"),
            ]
        );
    }

    #[test]
    fn integer_pairs_are_place_names() {
        let url = "https://www.google.com/maps/dir/48,2/-1.5,-3.25/";
        assert_eq!(
            dir_path_tokens(url),
            vec![place("48,2"), coord(-1.5, -3.25)]
        );
    }

    #[test]
    fn empty_and_blank_segments_are_dropped() {
        let url = "https://www.google.com/maps/dir//1.5,2.5//%20%20/+/3.5,4.5";
        assert_eq!(dir_path_tokens(url), vec![coord(1.5, 2.5), coord(3.5, 4.5)]);
    }

    #[test]
    fn dir_path_stops_at_query() {
        let url = "https://www.google.com/maps/dir/1.5,2.5/3.5,4.5?entry=ttu";
        assert_eq!(dir_path_tokens(url), vec![coord(1.5, 2.5), coord(3.5, 4.5)]);
    }

    #[test]
    fn slashes_in_query_string_are_not_waypoints() {
        let url = "https://www.google.com/maps/dir/1.5,2.5/3.5,4.5?entry=ttu/5.5,6.5/@1.0,2.0,12z";
        assert_eq!(dir_path_tokens(url), vec![coord(1.5, 2.5), coord(3.5, 4.5)]);
    }

    #[test]
    fn no_dir_path() {
        assert!(dir_path_tokens("https://www.google.com/maps/@48.85,2.31,14z").is_empty());
        assert!(dir_path_tokens("https://www.google.com/maps/dir/@48.85,2.31,14z").is_empty());
    }

    #[test]
    fn pair_with_trailing_garbage_is_not_a_coordinate() {
        assert_eq!(parse_coordinate_pair("1.5,2.5z"), None);
        assert_eq!(parse_coordinate_pair("+1.5,2.5"), None);
        assert_eq!(parse_coordinate_pair("1.5,2.5,3.5"), None);
        assert_eq!(
            parse_coordinate_pair("-1.5,-2.5"),
            Some(Coordinate { lat: -1.5, lon: -2.5 })
        );
    }

    #[test]
    fn travel_mode_markers() {
        let base = "https://www.google.com/maps/dir/1.5,2.5/3.5,4.5/data=!4m2!4m1";
        assert_eq!(travel_mode(&format!("{base}!3e0")), TravelMode::Driving);
        assert_eq!(travel_mode(&format!("{base}!3e1")), TravelMode::Cycling);
        assert_eq!(travel_mode(&format!("{base}!3e2")), TravelMode::Walking);
        assert_eq!(travel_mode(&format!("{base}!3e3")), TravelMode::Transit);
        assert_eq!(travel_mode(&format!("{base}!3e4")), TravelMode::Flight);
        assert_eq!(travel_mode(&format!("{base}!3e7")), TravelMode::Unknown);
        assert_eq!(travel_mode(base), TravelMode::Unknown);
        assert_eq!(travel_mode(&format!("{base}!3ex!3e1")), TravelMode::Cycling);
    }

    #[test]
    fn embedded_data_is_lon_then_lat() {
        let url = "https://www.google.com/maps/dir/data=!4m8!1m3!1d1!2d2.2945!3d48.8584!1m0!2d2.3376!3d48.8606";
        assert_eq!(
            embedded_data_points(url),
            Extraction::Found(vec![
                Coordinate { lat: 48.8584, lon: 2.2945 },
                Coordinate { lat: 48.8606, lon: 2.3376 },
            ])
        );
    }

    #[test]
    fn embedded_data_skips_unparsable_pairs() {
        let url = "x!2d-!3d1.0!2d1.5!3d2.5!2d!3d9.0";
        assert_eq!(
            embedded_data_points(url),
            Extraction::Found(vec![Coordinate { lat: 2.5, lon: 1.5 }])
        );
        assert_eq!(embedded_data_points("!2d1.0!4d2.0"), Extraction::NotFound);
    }

    #[test]
    fn viewport_marker() {
        assert_eq!(
            viewport_point("https://www.google.com/maps/@48.85,-2.31,14z"),
            Extraction::Found(vec![Coordinate { lat: 48.85, lon: -2.31 }])
        );
        assert_eq!(
            viewport_point("https://www.google.com/maps/place/a@b/@1.5,2.5,3z"),
            Extraction::Found(vec![Coordinate { lat: 1.5, lon: 2.5 }])
        );
        assert_eq!(viewport_point("https://x/@48,2,14z"), Extraction::NotFound);
    }

    #[test]
    fn strategies_short_circuit() {
        let found = Extraction::Found(vec![Coordinate { lat: 1.0, lon: 1.0 }]);
        let chained = found
            .clone()
            .or_else(|| panic!("second strategy must not run"));
        assert_eq!(chained, found);
        assert_eq!(
            Extraction::NotFound.or_else(|| Extraction::NotFound),
            Extraction::NotFound
        );
    }

    #[test]
    fn short_link_detection() {
        assert!(is_short_link("https://maps.app.goo.gl/abc123"));
        assert!(is_short_link("https://goo.gl/maps/abc123"));
        assert!(!is_short_link("https://www.google.com/maps/dir/1.5,2.5/3.5,4.5"));
    }

    #[test]
    fn url_validation() {
        assert!(validate_maps_url("https://www.google.com/maps/dir/a/b").is_ok());
        assert!(validate_maps_url("https://MAPS.google.com/@1.5,2.5,3z").is_ok());
        assert!(validate_maps_url("https://maps.app.goo.gl/dir/x").is_ok());
        for bad in [
            "",
            "   ",
            "https://example.com/maps/dir/a/b",
            "https://www.google.com/maps/place/Paris",
        ] {
            assert!(matches!(
                validate_maps_url(bad),
                Err(ConvertError::InvalidInputUrl(_))
            ));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_scanners_never_panic(url in "\\PC{0,120}") {
                let _ = dir_path_tokens(&url);
                let _ = travel_mode(&url);
                let _ = embedded_data_points(&url);
                let _ = viewport_point(&url);
                let _ = validate_maps_url(&url);
            }

            #[test]
            fn prop_dir_coordinates_round_trip(
                lat in -90.0f64..90.0,
                lon in -180.0f64..180.0,
            ) {
                let url = format!("https://www.google.com/maps/dir/{lat:.6},{lon:.6}/");
                let tokens = dir_path_tokens(&url);
                prop_assert_eq!(tokens.len(), 1);
                match &tokens[0] {
                    WaypointToken::Coordinate(c) => {
                        prop_assert!((c.lat - lat).abs() < 1e-6);
                        prop_assert!((c.lon - lon).abs() < 1e-6);
                    }
                    other => prop_assert!(false, "unexpected token {:?}", other),
                }
            }
        }
    }
}
