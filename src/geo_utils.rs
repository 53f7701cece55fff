//! # Geographic Utilities
//!
//! Stateless geometry helpers shared by the editor, the simplifier and the
//! progress tracker.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`project_onto_segment`] | Clamped planar projection of a point onto a segment |
//! | [`interpolate`] | Linear interpolation between two points |
//! | [`polyline_length`] | Total length of a route in meters |
//! | [`cumulative_distances`] | Distance from the route start to every vertex |
//! | [`compute_bounds`] | Bounding box of a route |
//! | [`screen_distance_to_segment`] | Pixel distance from a touch point to a drawn segment |
//!
//! ## Example
//!
//! ```rust
//! use route_tracker::{GeoPoint, geo_utils};
//!
//! let a = GeoPoint::new(0.0, 0.0);
//! let b = GeoPoint::new(0.001, 0.0);
//!
//! // ~111m due north
//! let length = geo_utils::haversine_distance(&a, &b);
//! assert!((length - 111.2).abs() < 0.5);
//!
//! // Halfway along the segment
//! let p = GeoPoint::new(0.0005, 0.0001);
//! let projection = geo_utils::project_onto_segment(&p, &a, &b);
//! assert!((projection.fraction - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Algorithm Notes
//!
//! Segment projection treats latitude/longitude as planar coordinates. At the
//! scale of a hand-drawn running route (segments of tens of meters) the
//! distortion is far below GPS accuracy. Distances returned by the planar
//! functions are in degrees and only meaningful for comparison.
//!
//! All coordinates are WGS84 degrees.

use geo::{Distance, Haversine, Point};

use crate::error::{Result, RouteError};
use crate::{Bounds, GeoPoint, ScreenPoint};

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (spherical Earth,
/// mean radius). Symmetric, and zero for identical points.
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// routes return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Distance from the first point to every point along the polyline.
///
/// The result is parallel to `points`: `table[0] == 0.0` and
/// `table[i] == table[i - 1] + haversine_distance(points[i - 1], points[i])`.
/// It is monotonically non-decreasing, and its last entry equals
/// [`polyline_length`].
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let route = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.001, 0.0),
///     GeoPoint::new(0.002, 0.0),
/// ];
/// let table = geo_utils::cumulative_distances(&route);
/// assert_eq!(table.len(), 3);
/// assert_eq!(table[0], 0.0);
/// assert!((table[2] - geo_utils::polyline_length(&route)).abs() < 1e-9);
/// ```
pub fn cumulative_distances(points: &[GeoPoint]) -> Vec<f64> {
    let mut table = Vec::with_capacity(points.len());
    let mut total = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(&points[i - 1], point);
        }
        table.push(total);
    }

    table
}

// =============================================================================
// Segment Projection
// =============================================================================

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Planar distance from the point to its projection (same units as the input).
    pub distance: f64,
    /// Position of the projection along the segment, clamped to `[0, 1]`.
    pub fraction: f64,
}

/// Perpendicular projection in the plane, clamped to the segment.
///
/// A degenerate segment (`a == b`) projects everything onto `a`.
fn planar_projection(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> SegmentProjection {
    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx * dx + dy * dy;

    let fraction = if length_sq > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let cx = ax + fraction * dx;
    let cy = ay + fraction * dy;
    let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

    SegmentProjection { distance, fraction }
}

/// Project `p` onto the segment `a`-`b`, treating lat/lng as planar coordinates.
///
/// The returned fraction is always in `[0, 1]`: the nearest point lies on the
/// segment itself, never on its infinite extension. The distance is in degrees.
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(0.0, 0.001);
///
/// // Beyond the end of the segment: clamped to b
/// let past_end = GeoPoint::new(0.0, 0.005);
/// let projection = geo_utils::project_onto_segment(&past_end, &a, &b);
/// assert_eq!(projection.fraction, 1.0);
/// ```
#[inline]
pub fn project_onto_segment(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> SegmentProjection {
    planar_projection(
        p.longitude, p.latitude,
        a.longitude, a.latitude,
        b.longitude, b.latitude,
    )
}

/// Linearly interpolate latitude and longitude independently.
///
/// `fraction` of 0.0 yields `a`, 1.0 yields `b`.
#[inline]
pub fn interpolate(a: &GeoPoint, b: &GeoPoint, fraction: f64) -> GeoPoint {
    GeoPoint::new(
        a.latitude + fraction * (b.latitude - a.latitude),
        a.longitude + fraction * (b.longitude - a.longitude),
    )
}

/// Pixel distance from a screen point to a screen-space segment.
///
/// Used by brush erase so that a stroke crossing the middle of a long segment
/// still hits it.
#[inline]
pub fn screen_distance_to_segment(p: &ScreenPoint, a: &ScreenPoint, b: &ScreenPoint) -> f64 {
    planar_projection(p.x, p.y, a.x, a.y, b.x, b.y).distance
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a route.
///
/// Returns `None` for an empty route.
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let route = vec![
///     GeoPoint::new(51.5000, -0.1300),
///     GeoPoint::new(51.5100, -0.1200),
/// ];
/// let bounds = geo_utils::compute_bounds(&route).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

// =============================================================================
// Flat Buffers
// =============================================================================

/// Decode a flat `[lat1, lng1, lat2, lng2, ...]` buffer.
///
/// Fails on an odd-length buffer or on any invalid coordinate.
pub fn points_from_flat(coords: &[f64]) -> Result<Vec<GeoPoint>> {
    if coords.len() % 2 != 0 {
        return Err(RouteError::OddCoordinateBuffer { len: coords.len() });
    }

    coords
        .chunks_exact(2)
        .enumerate()
        .map(|(index, chunk)| {
            let point = GeoPoint::new(chunk[0], chunk[1]);
            if point.is_valid() {
                Ok(point)
            } else {
                Err(RouteError::InvalidPoint { index })
            }
        })
        .collect()
}

/// Encode points as a flat `[lat1, lng1, lat2, lng2, ...]` buffer.
pub fn points_to_flat(points: &[GeoPoint]) -> Vec<f64> {
    points
        .iter()
        .flat_map(|p| [p.latitude, p.longitude])
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GeoPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GeoPoint::new(47.3769, 8.5417);
        let b = GeoPoint::new(47.3780, 8.5440);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // 0.001 degrees of latitude is ~111m
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.001, 0.0);
        assert!(approx_eq(haversine_distance(&a, &b), 111.2, 0.5));
    }

    #[test]
    fn test_polyline_length_degenerate() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GeoPoint::new(51.5, -0.1)]), 0.0);
    }

    #[test]
    fn test_cumulative_distances_monotonic() {
        let route = vec![
            GeoPoint::new(51.5074, -0.1278),
            GeoPoint::new(51.5080, -0.1290),
            GeoPoint::new(51.5080, -0.1290),
            GeoPoint::new(51.5090, -0.1300),
        ];
        let table = cumulative_distances(&route);
        assert_eq!(table.len(), route.len());
        assert_eq!(table[0], 0.0);
        assert!(table.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(table[1], table[2]);
        assert!(approx_eq(table[3], polyline_length(&route), 1e-9));
    }

    #[test]
    fn test_cumulative_distances_empty() {
        assert!(cumulative_distances(&[]).is_empty());
    }

    #[test]
    fn test_project_onto_segment_midpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.002);
        let p = GeoPoint::new(0.0005, 0.001);
        let projection = project_onto_segment(&p, &a, &b);
        assert!(approx_eq(projection.fraction, 0.5, 1e-12));
        assert!(approx_eq(projection.distance, 0.0005, 1e-12));
    }

    #[test]
    fn test_project_onto_segment_clamped() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.001);

        let before = project_onto_segment(&GeoPoint::new(0.0, -0.01), &a, &b);
        assert_eq!(before.fraction, 0.0);
        assert!(approx_eq(before.distance, 0.01, 1e-12));

        let after = project_onto_segment(&GeoPoint::new(0.003, 0.004), &a, &b);
        assert_eq!(after.fraction, 1.0);
    }

    #[test]
    fn test_project_onto_segment_fraction_always_in_range() {
        let a = GeoPoint::new(10.0, 10.0);
        let b = GeoPoint::new(10.3, 9.8);
        for i in -20..20 {
            for j in -20..20 {
                let p = GeoPoint::new(10.0 + i as f64 * 0.05, 10.0 + j as f64 * 0.05);
                let projection = project_onto_segment(&p, &a, &b);
                assert!((0.0..=1.0).contains(&projection.fraction));
            }
        }
    }

    #[test]
    fn test_project_onto_degenerate_segment() {
        let a = GeoPoint::new(1.0, 1.0);
        let p = GeoPoint::new(1.0, 1.003);
        let projection = project_onto_segment(&p, &a, &a);
        assert_eq!(projection.fraction, 0.0);
        assert!(approx_eq(projection.distance, 0.003, 1e-12));
    }

    #[test]
    fn test_interpolate() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(12.0, 16.0);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        let mid = interpolate(&a, &b, 0.5);
        assert!(approx_eq(mid.latitude, 11.0, 1e-12));
        assert!(approx_eq(mid.longitude, 18.0, 1e-12));
    }

    #[test]
    fn test_screen_distance_to_segment() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(100.0, 0.0);
        assert!(approx_eq(
            screen_distance_to_segment(&ScreenPoint::new(50.0, 10.0), &a, &b),
            10.0,
            1e-12
        ));
        // Past the end measures to the endpoint, not the infinite line
        assert!(approx_eq(
            screen_distance_to_segment(&ScreenPoint::new(103.0, 4.0), &a, &b),
            5.0,
            1e-12
        ));
    }

    #[test]
    fn test_compute_bounds() {
        let route = vec![
            GeoPoint::new(51.50, -0.13),
            GeoPoint::new(51.51, -0.12),
            GeoPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&route).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
        assert!(compute_bounds(&[]).is_none());
    }

    #[test]
    fn test_points_from_flat() {
        let points = points_from_flat(&[51.5, -0.1, 51.6, -0.2]).unwrap();
        assert_eq!(points, vec![GeoPoint::new(51.5, -0.1), GeoPoint::new(51.6, -0.2)]);
        assert_eq!(points_to_flat(&points), vec![51.5, -0.1, 51.6, -0.2]);
    }

    #[test]
    fn test_points_from_flat_errors() {
        assert!(matches!(
            points_from_flat(&[1.0, 2.0, 3.0]),
            Err(RouteError::OddCoordinateBuffer { len: 3 })
        ));
        assert!(matches!(
            points_from_flat(&[1.0, 2.0, 95.0, 0.0]),
            Err(RouteError::InvalidPoint { index: 1 })
        ));
    }
}
