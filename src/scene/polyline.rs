//! Polyline tracks for routes and directions
//!
//! A polyline is rendered as one box per vertex pair, each anchored at the
//! great-circle midpoint of its segment and oriented along the segment
//! bearing. The render host consumes the length and yaw; this module only
//! produces the anchored objects.

use crate::core::types::GeoPoint;
use crate::scene::object::TrackedObject;

/// Default tag assigned to untagged polylines.
pub const DEFAULT_POLYLINE_TAG: &str = "";

/// One vertex pair of a polyline, anchored at the segment midpoint.
#[derive(Debug, Clone)]
pub struct PolylineSegment {
    /// The anchored object for this segment. Created confirmed, at the
    /// segment's midpoint.
    pub object: TrackedObject,
    /// Ground length of the segment in metres.
    pub length_m: f64,
    /// Yaw for the segment box: the negated initial bearing from the first
    /// vertex to the second, in degrees.
    pub bearing_deg: f64,
}

/// A route or polyline tracked as a sequence of segment objects at a uniform
/// altitude.
#[derive(Debug, Clone)]
pub struct PolylineTrack {
    pub tag: String,
    pub altitude: f64,
    pub segments: Vec<PolylineSegment>,
    /// Whether the segments are refreshed automatically on every tick.
    pub continually_update: bool,
}

impl PolylineTrack {
    /// Builds segments from `(latitude, longitude)` vertices, all placed at
    /// `altitude`. Fewer than two vertices yields an empty track.
    pub fn new(vertices: &[(f64, f64)], altitude: f64, tag: Option<String>) -> Self {
        let tag = tag.unwrap_or_else(|| DEFAULT_POLYLINE_TAG.to_string());
        let mut segments = Vec::new();

        for pair in vertices.windows(2) {
            let current = GeoPoint::new(pair[0].0, pair[0].1, altitude, 0.0, 0);
            let next = GeoPoint::new(pair[1].0, pair[1].1, altitude, 0.0, 0);

            let midpoint = current.approx_midpoint(&next);
            let length_m = current.distance_to(&next);
            let bearing_deg = -current.bearing_to(&next);

            let tag = if tag.is_empty() {
                None
            } else {
                Some(tag.clone())
            };

            segments.push(PolylineSegment {
                object: TrackedObject::new(Some(midpoint), tag),
                length_m,
                bearing_deg,
            });
        }

        Self {
            tag,
            altitude,
            segments,
            continually_update: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_vertices_yield_n_minus_one_segments() {
        let vertices = [(50.0, 7.0), (50.001, 7.0), (50.001, 7.001), (50.002, 7.001)];
        let track = PolylineTrack::new(&vertices, 98.0, Some("route".to_string()));

        assert_eq!(track.segments.len(), 3);
        for segment in &track.segments {
            assert!(segment.object.location_confirmed());
            assert_eq!(segment.object.tag.as_deref(), Some("route"));
            assert_eq!(segment.object.location.as_ref().unwrap().altitude, 98.0);
        }
    }

    #[test]
    fn test_segment_midpoint_length_and_bearing() {
        // Due north segment of ~111 m.
        let track = PolylineTrack::new(&[(50.0, 7.0), (50.001, 7.0)], 0.0, None);
        let segment = &track.segments[0];

        let mid = segment.object.location.as_ref().unwrap();
        assert!((mid.latitude - 50.0005).abs() < 1e-6);
        assert!((segment.length_m - 111.2).abs() < 1.0);
        assert!(segment.bearing_deg.abs() < 1e-6);

        // Due east segment: bearing ~90, negated for yaw.
        let track = PolylineTrack::new(&[(50.0, 7.0), (50.0, 7.001)], 0.0, None);
        assert!((track.segments[0].bearing_deg + 90.0).abs() < 0.1);
    }

    #[test]
    fn test_too_few_vertices_is_empty() {
        assert!(PolylineTrack::new(&[], 0.0, None).segments.is_empty());
        assert!(PolylineTrack::new(&[(50.0, 7.0)], 0.0, None)
            .segments
            .is_empty());
    }
}
