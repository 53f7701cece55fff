//! # Progress Tracker
//!
//! Follows a runner along a fixed route. Each GPS sample is projected onto the
//! nearest route segment to find how far along the route the runner is, and
//! the distance actually run is accumulated through a glitch filter.
//!
//! ## Algorithm
//!
//! 1. At construction, build the cumulative distance table for the route
//! 2. Per sample, add the delta from the previous sample to the distance run
//!    if it lies in `(0, glitch_threshold_m)`; larger jumps are GPS glitches
//! 3. Scan every segment, projecting the sample onto it in planar lat/lng
//!    space, and keep the nearest (first one wins on ties)
//! 4. Covered distance = table\[i\] + fraction * segment length
//! 5. Progress = covered / route length
//!
//! The scan is linear in route length. Hand-drawn routes have tens to a few
//! hundred points, so no spatial index is used.
//!
//! ## Ordering
//!
//! Samples must be delivered in time order. Out-of-order samples are not
//! corrected and skew the glitch filter.

use log::{debug, info};

use crate::config::TrackerConfig;
use crate::geo_utils::{
    cumulative_distances, haversine_distance, interpolate, project_onto_segment,
};
use crate::{GeoPoint, Route};

/// Progress values reported for each sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ProgressSnapshot {
    /// Distance actually run in meters. Never decreases within a run.
    pub distance_run: f64,
    /// Covered distance along the route divided by route length, in `[0, 1]`.
    pub route_progress: f64,
}

/// A position fix, optionally timed in seconds since an arbitrary epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub point: GeoPoint,
    pub elapsed_s: Option<f64>,
}

impl PositionSample {
    pub fn new(point: GeoPoint) -> Self {
        Self { point, elapsed_s: None }
    }

    pub fn timed(point: GeoPoint, elapsed_s: f64) -> Self {
        Self { point, elapsed_s: Some(elapsed_s) }
    }
}

impl From<GeoPoint> for PositionSample {
    fn from(point: GeoPoint) -> Self {
        Self::new(point)
    }
}

/// Where a position lands on the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteProjection {
    /// Index of the nearest segment (`points[i]` to `points[i + 1]`).
    pub segment_index: usize,
    /// Position along that segment, in `[0, 1]`.
    pub fraction: f64,
    /// Distance along the route from its start to the projected point, in meters.
    pub covered_m: f64,
    /// The projected point on the route.
    pub point: GeoPoint,
    /// Distance from the position to the projected point, in meters.
    pub off_route_m: f64,
}

/// The route split at the runner's projected position, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSplit {
    /// Route points up to the nearest segment start, then the projected point.
    pub completed: Vec<GeoPoint>,
    /// The projected point, then the remaining route points.
    pub remaining: Vec<GeoPoint>,
}

/// Everything derived from one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    /// The sample as received, before snapping onto the route.
    pub sample: PositionSample,
    pub snapshot: ProgressSnapshot,
    /// `None` when the route has fewer than 2 points.
    pub projection: Option<RouteProjection>,
    /// `None` when the route has fewer than 2 points.
    pub split: Option<PathSplit>,
    /// Average pace so far in seconds per kilometre, when samples are timed.
    pub pace_s_per_km: Option<f64>,
    /// Whether the run has reached the completion threshold (latched).
    pub completed: bool,
}

/// Final figures for a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RunSummary {
    pub distance_run_m: f64,
    pub route_progress: f64,
    pub route_length_m: f64,
    pub elapsed_s: Option<f64>,
    pub average_pace_s_per_km: Option<f64>,
    pub completed: bool,
    /// Samples received.
    pub sample_count: u32,
    /// Samples whose delta was discarded as a GPS jump.
    pub glitch_count: u32,
}

/// Tracks one run along a fixed route.
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, ProgressTracker, Route, TrackerConfig};
///
/// // ~111m due north
/// let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)]);
/// let mut tracker = ProgressTracker::new(route, TrackerConfig::default());
///
/// tracker.update(GeoPoint::new(0.0, 0.0));
/// let snapshot = tracker.update(GeoPoint::new(0.0005, 0.0));
///
/// assert!((snapshot.route_progress - 0.5).abs() < 1e-6);
/// assert!((snapshot.distance_run - 55.6).abs() < 0.5);
///
/// let summary = tracker.finish();
/// assert_eq!(summary.sample_count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    route: Route,
    cumulative: Vec<f64>,
    config: TrackerConfig,

    last_sample: Option<GeoPoint>,
    distance_run: f64,
    last_progress: f64,
    completed: bool,

    first_elapsed_s: Option<f64>,
    last_elapsed_s: Option<f64>,

    sample_count: u32,
    glitch_count: u32,
}

impl ProgressTracker {
    /// Start a run on `route`.
    ///
    /// A route with fewer than 2 points is accepted; every update then
    /// reports zero progress and zero distance.
    pub fn new(route: Route, config: TrackerConfig) -> Self {
        let cumulative = cumulative_distances(route.points());
        info!(
            "[ProgressTracker] Run started: {} points, {:.0}m",
            route.len(),
            route.total_meters()
        );

        Self {
            route,
            cumulative,
            config,
            last_sample: None,
            distance_run: 0.0,
            last_progress: 0.0,
            completed: false,
            first_elapsed_s: None,
            last_elapsed_s: None,
            sample_count: 0,
            glitch_count: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Distance from the route start to each route point.
    pub fn cumulative_distances(&self) -> &[f64] {
        &self.cumulative
    }

    /// The latest snapshot without consuming a sample.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            distance_run: self.distance_run,
            route_progress: self.last_progress,
        }
    }

    /// Feed one position and get the progress snapshot.
    pub fn update(&mut self, point: GeoPoint) -> ProgressSnapshot {
        self.track(PositionSample::new(point)).snapshot
    }

    /// Feed one sample and get the full update: snapshot, projection, path
    /// split, pace and completion.
    pub fn track(&mut self, sample: PositionSample) -> TrackUpdate {
        self.sample_count = self.sample_count.saturating_add(1);

        if self.route.is_degenerate() {
            return TrackUpdate {
                sample,
                snapshot: ProgressSnapshot::default(),
                projection: None,
                split: None,
                pace_s_per_km: None,
                completed: false,
            };
        }

        self.accumulate(&sample.point);
        if let Some(elapsed) = sample.elapsed_s {
            self.first_elapsed_s.get_or_insert(elapsed);
            self.last_elapsed_s = Some(elapsed);
        }

        let projection = self.project(&sample.point);
        let split = projection.as_ref().map(|p| self.split(p));
        if let Some(ref p) = projection {
            self.last_progress = self.progress_for(p.covered_m);
        }

        if !self.completed && self.last_progress >= self.config.completion_threshold {
            self.completed = true;
            info!(
                "[ProgressTracker] Route completed after {:.0}m run",
                self.distance_run
            );
        }

        TrackUpdate {
            sample,
            snapshot: self.snapshot(),
            projection,
            split,
            pace_s_per_km: self.average_pace(),
            completed: self.completed,
        }
    }

    /// Add the delta from the previous sample, unless it is zero or a jump.
    fn accumulate(&mut self, point: &GeoPoint) {
        if let Some(last) = self.last_sample {
            let delta = haversine_distance(&last, point);
            if delta > 0.0 && delta < self.config.glitch_threshold_m {
                self.distance_run += delta;
            } else if delta >= self.config.glitch_threshold_m {
                self.glitch_count = self.glitch_count.saturating_add(1);
                debug!("[ProgressTracker] Discarded {:.0}m GPS jump", delta);
            }
        }
        // A jump still becomes the reference for the next delta
        self.last_sample = Some(*point);
    }

    fn progress_for(&self, covered_m: f64) -> f64 {
        let total = self.route.total_meters();
        if total > 0.0 {
            (covered_m / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Project a position onto the nearest route segment.
    ///
    /// Pure: does not touch the run state. Returns `None` for routes with
    /// fewer than 2 points.
    pub fn project(&self, position: &GeoPoint) -> Option<RouteProjection> {
        let points = self.route.points();
        if points.len() < 2 {
            return None;
        }

        let mut best_index = 0;
        let mut best = project_onto_segment(position, &points[0], &points[1]);
        for i in 1..points.len() - 1 {
            let candidate = project_onto_segment(position, &points[i], &points[i + 1]);
            // Strict comparison: first segment wins on ties
            if candidate.distance < best.distance {
                best = candidate;
                best_index = i;
            }
        }

        let segment_length = self.cumulative[best_index + 1] - self.cumulative[best_index];
        let covered_m = self.cumulative[best_index] + best.fraction * segment_length;
        let point = interpolate(&points[best_index], &points[best_index + 1], best.fraction);

        debug!(
            "[ProgressTracker] Nearest segment {} at {:.2}, {:.0}m along",
            best_index, best.fraction, covered_m
        );

        Some(RouteProjection {
            segment_index: best_index,
            fraction: best.fraction,
            covered_m,
            point,
            off_route_m: haversine_distance(position, &point),
        })
    }

    /// Split the route at a projection into completed and remaining paths.
    pub fn split(&self, projection: &RouteProjection) -> PathSplit {
        let points = self.route.points();
        let index = projection.segment_index.min(points.len().saturating_sub(1));

        let mut completed = Vec::with_capacity(index + 2);
        completed.extend_from_slice(&points[..=index]);
        completed.push(projection.point);

        let mut remaining = Vec::with_capacity(points.len() - index);
        remaining.push(projection.point);
        remaining.extend_from_slice(&points[index + 1..]);

        PathSplit { completed, remaining }
    }

    fn elapsed_s(&self) -> Option<f64> {
        match (self.first_elapsed_s, self.last_elapsed_s) {
            (Some(first), Some(last)) => Some((last - first).max(0.0)),
            _ => None,
        }
    }

    fn average_pace(&self) -> Option<f64> {
        let elapsed = self.elapsed_s()?;
        if self.distance_run <= 0.0 || elapsed <= 0.0 {
            return None;
        }
        Some(elapsed / (self.distance_run / 1000.0))
    }

    /// End the run.
    ///
    /// Consumes the tracker, so no further snapshots can be produced.
    pub fn finish(self) -> RunSummary {
        let summary = RunSummary {
            distance_run_m: self.distance_run,
            route_progress: self.last_progress,
            route_length_m: self.route.total_meters(),
            elapsed_s: self.elapsed_s(),
            average_pace_s_per_km: self.average_pace(),
            completed: self.completed,
            sample_count: self.sample_count,
            glitch_count: self.glitch_count,
        };
        info!(
            "[ProgressTracker] Run finished: {:.0}m run, {:.0}% of route, {} glitches",
            summary.distance_run_m,
            summary.route_progress * 100.0,
            summary.glitch_count
        );
        summary
    }
}
