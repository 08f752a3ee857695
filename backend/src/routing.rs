use crate::models::{Coordinate, TravelMode};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Spacing used when there is no pair of points to spread time over.
pub const FALLBACK_INTERVAL_SECS: f64 = 10.0;

pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Sum of consecutive great-circle legs. Legs that do not produce a finite
/// distance are left out instead of poisoning the total.
pub fn route_distance_m(path: &[Coordinate]) -> f64 {
    path.windows(2)
        .map(|w| haversine_m(w[0], w[1]))
        .filter(|d| {
            if d.is_finite() {
                true
            } else {
                tracing::warn!("skipping non-finite leg in distance sum");
                false
            }
        })
        .sum()
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    route_distance_m(path) / 1_000.0
}

pub fn estimated_duration_secs(distance_m: f64, mode: TravelMode) -> f64 {
    distance_m / mode.speed_mps()
}

/// Seconds between consecutive points when `total_secs` is spread evenly
/// over `point_count` points.
pub fn point_interval_secs(total_secs: f64, point_count: usize) -> f64 {
    if point_count > 1 {
        total_secs / (point_count - 1) as f64
    } else {
        FALLBACK_INTERVAL_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate { lat: 45.0, lon: 5.0 };
        assert_eq!(haversine_m(point, point), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_at_equator() {
        let dist = haversine_m(
            Coordinate { lat: 0.0, lon: 0.0 },
            Coordinate { lat: 0.0, lon: 1.0 },
        );
        assert!((dist - 111_195.0).abs() < 50.0, "got {dist}");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London, ~343 km
        let dist = haversine_m(
            Coordinate { lat: 48.8566, lon: 2.3522 },
            Coordinate { lat: 51.5074, lon: -0.1278 },
        );
        assert!((dist - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_route_distance_empty_and_single() {
        assert_eq!(route_distance_m(&[]), 0.0);
        assert_eq!(route_distance_m(&[Coordinate { lat: 45.0, lon: 5.0 }]), 0.0);
    }

    #[test]
    fn test_route_distance_skips_non_finite_leg() {
        let path = [
            Coordinate { lat: 0.0, lon: 0.0 },
            Coordinate { lat: 0.0, lon: 1.0 },
            Coordinate { lat: f64::NAN, lon: 1.0 },
        ];
        let expected = haversine_m(path[0], path[1]);
        assert_eq!(route_distance_m(&path), expected);
    }

    #[test]
    fn test_duration_uses_mode_speed() {
        assert!((estimated_duration_secs(1_390.0, TravelMode::Driving) - 100.0).abs() < 1e-9);
        assert!((estimated_duration_secs(280.0, TravelMode::Flight) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_interval() {
        assert_eq!(point_interval_secs(100.0, 2), 100.0);
        assert_eq!(point_interval_secs(100.0, 5), 25.0);
        assert_eq!(point_interval_secs(100.0, 1), FALLBACK_INTERVAL_SECS);
        assert_eq!(point_interval_secs(100.0, 0), FALLBACK_INTERVAL_SECS);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                let dist_ab = haversine_m(a, b);
                let dist_ba = haversine_m(b, a);
                prop_assert!((dist_ab - dist_ba).abs() < 1e-6);
            }

            #[test]
            fn prop_haversine_bounded_by_half_earth_circumference(
                a in valid_coord(),
                b in valid_coord()
            ) {
                let dist = haversine_m(a, b);
                prop_assert!(dist >= 0.0);
                prop_assert!(dist <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
            }

            #[test]
            fn prop_haversine_triangle_inequality(
                a in valid_coord(),
                b in valid_coord(),
                c in valid_coord()
            ) {
                let dist_ac = haversine_m(a, c);
                prop_assert!(dist_ac <= haversine_m(a, b) + haversine_m(b, c) + 1e-3);
            }

            #[test]
            fn prop_route_distance_additive(
                path1 in prop::collection::vec(valid_coord(), 2..5),
                path2 in prop::collection::vec(valid_coord(), 2..5)
            ) {
                let mut combined = path1.clone();
                combined.extend_from_slice(&path2);

                let connection = haversine_m(*path1.last().unwrap(), path2[0]);
                let expected = route_distance_m(&path1) + connection + route_distance_m(&path2);
                prop_assert!((route_distance_m(&combined) - expected).abs() < 1e-3);
            }

            #[test]
            fn prop_intervals_cover_total_duration(
                total in 0.0f64..1e6,
                count in 2usize..500
            ) {
                let interval = point_interval_secs(total, count);
                prop_assert!((interval * (count - 1) as f64 - total).abs() < 1e-6 * total.max(1.0));
            }
        }
    }
}
