//! Douglas-Peucker polyline simplification with a geodesic distance metric.
//!
//! Freehand drawing produces a dense point stream; this reduces it to the
//! points that actually shape the route. The perpendicular offset of an
//! interior point is measured in meters: the point is projected onto the
//! chord in lat/lng space, and the haversine distance to that anchor is used
//! as the deviation.

use crate::geo_utils::{haversine_distance, interpolate, project_onto_segment};
use crate::GeoPoint;

/// Simplify a route, keeping points that deviate more than `tolerance_m`
/// meters from the simplified shape.
///
/// The output is a subsequence of the input: points are only dropped, never
/// moved or reordered, and the first and last points are always kept. Inputs
/// with fewer than 3 points are returned unchanged.
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, simplify::simplify};
///
/// // A straight line with a redundant middle point
/// let points = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0005, 0.0),
///     GeoPoint::new(0.001, 0.0),
/// ];
/// let simplified = simplify(&points, 1.0);
/// assert_eq!(simplified, vec![points[0], points[2]]);
/// ```
pub fn simplify(points: &[GeoPoint], tolerance_m: f64) -> Vec<GeoPoint> {
    simplify_indices(points, tolerance_m)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Simplify a route and return the indices of the kept points, ascending.
pub fn simplify_indices(points: &[GeoPoint], tolerance_m: f64) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark_kept(points, 0, points.len() - 1, tolerance_m, &mut keep);

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}

/// Geodesic offset of `point` from the chord `start`-`end`, in meters.
fn chord_offset(point: &GeoPoint, start: &GeoPoint, end: &GeoPoint) -> f64 {
    let projection = project_onto_segment(point, start, end);
    let anchor = interpolate(start, end, projection.fraction);
    haversine_distance(point, &anchor)
}

fn mark_kept(points: &[GeoPoint], start: usize, end: usize, tolerance_m: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let first = &points[start];
    let last = &points[end];

    // Strict comparison: on equal offsets the lowest index wins
    let mut max_offset = 0.0;
    let mut max_index = start;
    for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
        let offset = chord_offset(point, first, last);
        if offset > max_offset {
            max_offset = offset;
            max_index = i;
        }
    }

    if max_offset > tolerance_m {
        keep[max_index] = true;
        mark_kept(points, start, max_index, tolerance_m, keep);
        mark_kept(points, max_index, end, tolerance_m, keep);
    }
}
