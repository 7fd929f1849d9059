//! Geographic and local-frame primitives
//!
//! `GeoPoint` is a single geographic fix with accuracy and timestamp.
//! `LocalPosition` is a point in the scene's Cartesian frame, following the
//! engine convention: x = east, y = up, z = south. Horizontal distance in
//! both frames ignores the vertical axis, so local comparisons mirror the
//! ground-distance semantics of `GeoPoint::distance_to`.

use crate::core::constants::EARTH_RADIUS_M;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Position in the scene's local Cartesian frame (x = east, y = up, z = south).
pub type LocalPosition = Vector3<f32>;

/// Horizontal (ground) distance between two local positions.
/// Ignores the y axis to match `GeoPoint::distance_to`.
pub fn horizontal_distance(a: &LocalPosition, b: &LocalPosition) -> f32 {
    ((b.x - a.x).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// A single geographic fix: coordinate, altitude, horizontal accuracy and the
/// time it was taken. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in metres
    pub altitude: f64,
    /// Horizontal accuracy radius in metres (smaller is better)
    pub horizontal_accuracy: f64,
    /// Timestamp of the fix (milliseconds since epoch)
    pub timestamp_ms: u64,
}

/// A displacement between two geographic points, expressed as signed metre
/// deltas along the cardinal axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    /// Positive is north
    pub north_south: f64,
    /// Positive is east
    pub east_west: f64,
    /// Positive is up
    pub up_down: f64,
}

impl GeoPoint {
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        horizontal_accuracy: f64,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            horizontal_accuracy,
            timestamp_ms,
        }
    }

    /// Great-circle ground distance to another point in metres (haversine).
    /// Altitude is ignored.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing towards another point, in degrees within
    /// (-180, 180]. 0 is north, 90 is east.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

        y.atan2(x).to_degrees()
    }

    /// Destination point after travelling `distance_m` metres along the great
    /// circle at `bearing_deg`. A negative distance moves in the opposite
    /// direction. Altitude, accuracy and timestamp are preserved.
    pub fn coordinate_with_bearing(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint {
            latitude: lat2.to_degrees(),
            longitude: lon2.to_degrees(),
            ..self.clone()
        }
    }

    /// Signed metre deltas from `self` to `other`, measured against the
    /// intermediate point at (`self.latitude`, `other.longitude`).
    /// Inverse of `translated_by` up to floating-point error.
    pub fn translation_to(&self, other: &GeoPoint) -> Translation {
        let inbetween = GeoPoint {
            latitude: self.latitude,
            longitude: other.longitude,
            ..self.clone()
        };

        let distance_latitude = other.distance_to(&inbetween);
        let north_south = if other.latitude > inbetween.latitude {
            distance_latitude
        } else {
            -distance_latitude
        };

        let distance_longitude = self.distance_to(&inbetween);
        let east_west = if self.longitude > inbetween.longitude {
            -distance_longitude
        } else {
            distance_longitude
        };

        Translation {
            north_south,
            east_west,
            up_down: other.altitude - self.altitude,
        }
    }

    /// Applies a translation: move north, then east, along great circles and
    /// add the altitude delta. Accuracy and timestamp are preserved.
    pub fn translated_by(&self, translation: &Translation) -> GeoPoint {
        let latitude_moved = self.coordinate_with_bearing(0.0, translation.north_south);
        let longitude_moved = self.coordinate_with_bearing(90.0, translation.east_west);

        GeoPoint {
            latitude: latitude_moved.latitude,
            longitude: longitude_moved.longitude,
            altitude: self.altitude + translation.up_down,
            ..self.clone()
        }
    }

    /// Approximate great-circle midpoint between `self` and `other`.
    /// Altitude is averaged; accuracy and timestamp come from `self`.
    pub fn approx_midpoint(&self, other: &GeoPoint) -> GeoPoint {
        let bearing = self.bearing_to(other);
        let half = self.distance_to(other) / 2.0;
        let mid = self.coordinate_with_bearing(bearing, half);

        GeoPoint {
            altitude: (self.altitude + other.altitude) / 2.0,
            ..mid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon, 10.0, 5.0, 1_000)
    }

    #[test]
    fn test_distance_is_symmetric_and_zero_at_same_point() {
        let a = point(52.520008, 13.404954);
        let b = point(52.523430, 13.411440);

        assert!(a.distance_to(&a) < 1e-9);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_distance_ignores_altitude() {
        let a = point(48.8584, 2.2945);
        let mut b = point(48.8584, 2.2945);
        b.altitude = 300.0;

        assert!(a.distance_to(&b) < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = point(50.0, 7.0);
        let b = point(51.0, 7.0);

        // One degree of latitude is roughly 111.2 km on a spherical Earth.
        let d = a.distance_to(&b);
        assert!((d - 111_194.9).abs() < 10.0, "distance was {}", d);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = point(50.0, 7.0);

        assert!((origin.bearing_to(&point(51.0, 7.0)) - 0.0).abs() < 1e-6);
        assert!((origin.bearing_to(&point(49.0, 7.0)).abs() - 180.0).abs() < 1e-6);
        assert!((origin.bearing_to(&point(50.0, 8.0)) - 90.0).abs() < 1.0);
        assert!((origin.bearing_to(&point(50.0, 6.0)) + 90.0).abs() < 1.0);
    }

    #[test]
    fn test_translate_translation_round_trip() {
        let a = point(52.520008, 13.404954);
        let b = GeoPoint::new(52.521500, 13.407200, 42.0, 5.0, 2_000);

        let translation = a.translation_to(&b);
        let back = a.translated_by(&translation);

        assert!((back.latitude - b.latitude).abs() < 1e-6);
        assert!((back.longitude - b.longitude).abs() < 1e-6);
        assert!((back.altitude - b.altitude).abs() < 0.01);
    }

    #[test]
    fn test_translation_signs() {
        let a = point(50.0, 7.0);
        let north_east_up = GeoPoint::new(50.001, 7.001, 20.0, 5.0, 1_000);

        let t = a.translation_to(&north_east_up);
        assert!(t.north_south > 0.0);
        assert!(t.east_west > 0.0);
        assert!((t.up_down - 10.0).abs() < 1e-9);

        let south_west = GeoPoint::new(49.999, 6.999, 10.0, 5.0, 1_000);
        let t = a.translation_to(&south_west);
        assert!(t.north_south < 0.0);
        assert!(t.east_west < 0.0);
        assert!(t.up_down.abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_with_bearing_negative_distance() {
        let a = point(50.0, 7.0);
        let north = a.coordinate_with_bearing(0.0, 100.0);
        let back = north.coordinate_with_bearing(0.0, -100.0);

        assert!((back.latitude - a.latitude).abs() < 1e-9);
        assert!((back.longitude - a.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_approx_midpoint() {
        let a = point(50.0, 7.0);
        let b = GeoPoint::new(50.002, 7.0, 30.0, 5.0, 1_000);

        let mid = a.approx_midpoint(&b);
        assert!((mid.latitude - 50.001).abs() < 1e-6);
        assert!((mid.longitude - 7.0).abs() < 1e-6);
        assert!((mid.altitude - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_distance_ignores_y() {
        let a = LocalPosition::new(0.0, 0.0, 0.0);
        let b = LocalPosition::new(3.0, 100.0, 4.0);

        assert!((horizontal_distance(&a, &b) - 5.0).abs() < 1e-6);
    }
}
