//! # Route Tracker
//!
//! Route geometry and run-progress engine for a draw-your-own-route running app.
//!
//! This library provides:
//! - Freehand route editing with throttled drawing, brush erase and undo
//! - Douglas-Peucker simplification with a geodesic metric
//! - Live progress tracking: nearest-segment projection, distance run with a
//!   GPS glitch filter, completed/remaining path split, pace and completion
//!
//! Rendering, map tiles and GPS hardware stay in the host app. The core
//! consumes points and emits data.
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_tracker::{GeoPoint, ProgressTracker, RouteEditor, ScreenPoint, TrackerConfig};
//!
//! // Draw a route (screen positions come from the map view)
//! let mut editor = RouteEditor::new();
//! editor.begin_stroke();
//! editor.draw(GeoPoint::new(51.5000, -0.1200), ScreenPoint::new(100.0, 400.0));
//! editor.draw(GeoPoint::new(51.5010, -0.1200), ScreenPoint::new(100.0, 300.0));
//! editor.end_stroke();
//! println!("Route: {:.0}m", editor.total_meters());
//!
//! // Run it
//! let mut tracker = ProgressTracker::new(editor.route(), TrackerConfig::default());
//! let snapshot = tracker.update(GeoPoint::new(51.5005, -0.1200));
//! println!("{:.0}% done, {:.0}m run", snapshot.route_progress * 100.0, snapshot.distance_run);
//! ```

// Unified error handling
pub mod error;
pub use error::{Result, RouteError};

// Tuning parameters
pub mod config;
pub use config::{EditorConfig, TrackerConfig};

// Geographic utilities (distance, projection, interpolation)
pub mod geo_utils;

// Douglas-Peucker simplification
pub mod simplify;
pub use simplify::{simplify, simplify_indices};

// Screen-space projection for erase hit-testing
pub mod projector;
pub use projector::{MercatorViewport, ScreenProjector};

// Freehand route editing
pub mod editor;
pub use editor::{EditEvent, RouteEditor};

// Live run progress
pub mod tracker;
pub use tracker::{
    PathSplit, PositionSample, ProgressSnapshot, ProgressTracker, RouteProjection, RunSummary,
    TrackUpdate,
};

// Position source / render sink seams
pub mod session;
pub use session::{PositionSource, RenderSink, RunSession, VecPositionSource};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteTrackerRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use route_tracker::GeoPoint;
/// let point = GeoPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A pixel position in the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean pixel distance.
    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        geo_utils::compute_bounds(points)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// An immutable route handed to a run.
///
/// Points are in path order; point `i` connects to point `i + 1`. A route
/// with fewer than 2 points has zero length and is degenerate for progress
/// tracking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    points: Vec<GeoPoint>,
    total_meters: f64,
}

impl Route {
    /// Build a route, computing its length once.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        let total_meters = geo_utils::polyline_length(&points);
        Self { points, total_meters }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Total length in meters.
    pub fn total_meters(&self) -> f64 {
        self.total_meters
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than 2 points: nothing to track progress along.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    /// A copy of this route simplified to `tolerance_m`.
    pub fn simplified(&self, tolerance_m: f64) -> Route {
        Route::new(simplify(&self.points, tolerance_m))
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}

impl From<Vec<GeoPoint>> for Route {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{debug, info};
    use std::sync::{Arc, Mutex, MutexGuard};

    /// Callback interface mapping a point to its current screen position.
    /// Implement this in Kotlin/Swift on top of the map view's projection.
    #[uniffi::export(callback_interface)]
    pub trait ScreenProjectorCallback: Send + Sync {
        fn project(&self, point: GeoPoint) -> ScreenPoint;
    }

    /// Counts and indices cross the boundary as u32, saturating at `u32::MAX`.
    fn saturating_u32(value: usize) -> u32 {
        u32::try_from(value).unwrap_or(u32::MAX)
    }

    /// Flattened tracker output for mobile.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiTrackUpdate {
        /// The runner's reported position, unsnapped.
        pub position: GeoPoint,
        pub distance_run: f64,
        pub route_progress: f64,
        pub segment_index: Option<u32>,
        pub projected_point: Option<GeoPoint>,
        pub off_route_m: Option<f64>,
        pub completed_path: Vec<GeoPoint>,
        pub remaining_path: Vec<GeoPoint>,
        pub pace_s_per_km: Option<f64>,
        pub completed: bool,
    }

    impl From<TrackUpdate> for FfiTrackUpdate {
        fn from(update: TrackUpdate) -> Self {
            let (completed_path, remaining_path) = update
                .split
                .map(|s| (s.completed, s.remaining))
                .unwrap_or_default();

            Self {
                position: update.sample.point,
                distance_run: update.snapshot.distance_run,
                route_progress: update.snapshot.route_progress,
                segment_index: update.projection.map(|p| saturating_u32(p.segment_index)),
                projected_point: update.projection.map(|p| p.point),
                off_route_m: update.projection.map(|p| p.off_route_m),
                completed_path,
                remaining_path,
                pace_s_per_km: update.pace_s_per_km,
                completed: update.completed,
            }
        }
    }

    // ========================================================================
    // Route Editor
    // ========================================================================

    /// Route editor shared with the mobile UI thread.
    #[derive(uniffi::Object)]
    pub struct FfiRouteEditor {
        inner: Mutex<RouteEditor>,
    }

    impl FfiRouteEditor {
        fn editor(&self) -> MutexGuard<'_, RouteEditor> {
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[uniffi::export]
    impl FfiRouteEditor {
        #[uniffi::constructor]
        pub fn new(config: EditorConfig) -> Arc<Self> {
            init_logging();
            info!("[RouteTrackerRust] Editor created: {:?}", config);
            Arc::new(Self {
                inner: Mutex::new(RouteEditor::with_config(config)),
            })
        }

        pub fn begin_stroke(&self) {
            self.editor().begin_stroke();
        }

        pub fn draw(&self, point: GeoPoint, screen: ScreenPoint) -> bool {
            self.editor().draw(point, screen)
        }

        pub fn end_stroke(&self) -> u32 {
            saturating_u32(self.editor().end_stroke())
        }

        pub fn erase(&self, target: ScreenPoint, projector: Box<dyn ScreenProjectorCallback>) -> u32 {
            let project = |p: &GeoPoint| ScreenProjectorCallback::project(projector.as_ref(), *p);
            saturating_u32(self.editor().erase(target, &project))
        }

        pub fn undo(&self) -> bool {
            let mut editor = self.editor();
            let undone = editor.undo_last().is_some();
            editor.recalc_distance();
            undone
        }

        pub fn reset(&self) {
            self.editor().reset();
        }

        pub fn points(&self) -> Vec<GeoPoint> {
            self.editor().points().to_vec()
        }

        pub fn total_meters(&self) -> f64 {
            self.editor().total_meters()
        }

        pub fn bounds(&self) -> Option<Bounds> {
            Bounds::from_points(self.editor().points())
        }
    }

    // ========================================================================
    // Progress Tracker
    // ========================================================================

    /// A run in progress. After `finish` every update returns `None`.
    #[derive(uniffi::Object)]
    pub struct FfiProgressTracker {
        inner: Mutex<Option<ProgressTracker>>,
    }

    impl FfiProgressTracker {
        fn tracker(&self) -> MutexGuard<'_, Option<ProgressTracker>> {
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[uniffi::export]
    impl FfiProgressTracker {
        #[uniffi::constructor]
        pub fn new(route: Vec<GeoPoint>, config: TrackerConfig) -> Arc<Self> {
            init_logging();
            Arc::new(Self {
                inner: Mutex::new(Some(ProgressTracker::new(Route::new(route), config))),
            })
        }

        pub fn update(&self, point: GeoPoint, elapsed_s: Option<f64>) -> Option<FfiTrackUpdate> {
            let mut guard = self.tracker();
            let tracker = guard.as_mut()?;
            let sample = PositionSample { point, elapsed_s };
            Some(tracker.track(sample).into())
        }

        pub fn snapshot(&self) -> Option<ProgressSnapshot> {
            self.tracker().as_ref().map(|t| t.snapshot())
        }

        pub fn finish(&self) -> Option<RunSummary> {
            let tracker = self.tracker().take()?;
            Some(tracker.finish())
        }
    }

    // ========================================================================
    // Free functions
    // ========================================================================

    /// Simplify a route with Douglas-Peucker at the given tolerance in meters.
    #[uniffi::export]
    pub fn simplify_route(points: Vec<GeoPoint>, tolerance_m: f64) -> Vec<GeoPoint> {
        init_logging();
        let simplified = simplify(&points, tolerance_m);
        debug!(
            "[RouteTrackerRust] simplify_route: {} -> {} points",
            points.len(),
            simplified.len()
        );
        simplified
    }

    /// Route length in meters.
    #[uniffi::export]
    pub fn route_length(points: Vec<GeoPoint>) -> f64 {
        geo_utils::polyline_length(&points)
    }

    /// Decode a flat [lat1, lng1, lat2, lng2, ...] buffer.
    #[uniffi::export]
    pub fn route_from_flat(coords: Vec<f64>) -> std::result::Result<Vec<GeoPoint>, RouteError> {
        geo_utils::points_from_flat(&coords)
    }

    #[uniffi::export]
    pub fn default_editor_config() -> EditorConfig {
        EditorConfig::default()
    }

    #[uniffi::export]
    pub fn default_tracker_config() -> TrackerConfig {
        TrackerConfig::default()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn north_route() -> Vec<GeoPoint> {
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)]
        }

        #[test]
        fn test_tracker_rejects_updates_after_finish() {
            let tracker = FfiProgressTracker::new(north_route(), TrackerConfig::default());
            let update = tracker.update(GeoPoint::new(0.0005, 0.0003), Some(0.0)).unwrap();
            assert_eq!(update.position, GeoPoint::new(0.0005, 0.0003));
            assert_eq!(update.segment_index, Some(0));

            let summary = tracker.finish().unwrap();
            assert_eq!(summary.sample_count, 1);

            assert!(tracker.update(GeoPoint::new(0.001, 0.0), Some(10.0)).is_none());
            assert!(tracker.snapshot().is_none());
            assert!(tracker.finish().is_none());
        }

        #[test]
        fn test_saturating_u32() {
            assert_eq!(saturating_u32(7), 7);
            assert_eq!(saturating_u32(u32::MAX as usize), u32::MAX);
            #[cfg(target_pointer_width = "64")]
            assert_eq!(saturating_u32(u32::MAX as usize + 1), u32::MAX);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_route_degenerate() {
        assert!(Route::new(vec![]).is_degenerate());
        let single = Route::new(vec![GeoPoint::new(1.0, 1.0)]);
        assert!(single.is_degenerate());
        assert_eq!(single.total_meters(), 0.0);
        assert!(!Route::new(vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0, 1.0)]).is_degenerate());
    }

    #[test]
    fn test_route_bounds_center() {
        let route = Route::from(vec![GeoPoint::new(51.50, -0.10), GeoPoint::new(51.52, -0.12)]);
        let center = route.bounds().unwrap().center();
        assert!(approx_eq(center.latitude, 51.51, 1e-9));
        assert!(approx_eq(center.longitude, -0.11, 1e-9));
    }

    #[test]
    fn test_end_to_end_midpoint_progress() {
        // ~111m due north
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)]);
        assert!(approx_eq(route.total_meters(), 111.2, 0.5));

        let mut tracker = ProgressTracker::new(route, TrackerConfig::default());
        let update = tracker.track(GeoPoint::new(0.0005, 0.0).into());
        assert!(approx_eq(update.snapshot.route_progress, 0.5, 1e-9));
        assert_eq!(update.projection.unwrap().segment_index, 0);
    }

    #[test]
    fn test_end_to_end_erase_single_point() {
        let viewport = MercatorViewport::new(GeoPoint::new(47.37, 8.54), 16.0, 400.0, 800.0);
        let mut editor = RouteEditor::new();
        editor.append(GeoPoint::new(47.37, 8.54));
        editor.recalc_distance();

        let touch = ScreenPoint::new(205.0, 398.0);
        assert_eq!(editor.erase(touch, &viewport), 1);
        assert!(editor.is_empty());
        assert_eq!(editor.total_meters(), 0.0);
    }

    #[test]
    fn test_end_to_end_draw_erase_run() {
        // Draw a 3-sided loop on a zoom-17 map through its real projection
        let viewport = MercatorViewport::new(GeoPoint::new(51.5, -0.12), 17.0, 400.0, 800.0);
        let mut editor = RouteEditor::new();
        let strokes: [&[(f64, f64)]; 2] = [
            &[(100.0, 600.0), (100.0, 500.0), (100.0, 400.0), (100.0, 300.0), (100.0, 200.0)],
            &[(150.0, 200.0), (200.0, 200.0), (300.0, 200.0), (300.0, 400.0), (300.0, 600.0)],
        ];
        for stroke in strokes {
            editor.apply(EditEvent::BeginStroke, &viewport);
            for &(x, y) in stroke {
                let screen = ScreenPoint::new(x, y);
                let point = viewport.unproject(&screen);
                editor.apply(EditEvent::Draw { point, screen }, &viewport);
            }
            editor.apply(EditEvent::EndStroke, &viewport);
        }

        // Straight runs collapse to their corners
        assert_eq!(editor.len(), 4);
        let drawn_length = editor.total_meters();
        assert!(drawn_length > 0.0);

        // Erasing the middle of the last side removes both of its endpoints
        assert!(editor.apply(EditEvent::Erase { target: ScreenPoint::new(305.0, 400.0) }, &viewport));
        assert_eq!(editor.len(), 2);
        assert!(editor.total_meters() < drawn_length);

        // Run the remaining top-left corner
        let route = editor.route();
        let end = route.points()[1];
        let mut tracker = ProgressTracker::new(route, TrackerConfig::default());
        let snapshot = tracker.update(end);
        assert!(approx_eq(snapshot.route_progress, 1.0, 1e-9));
        assert!(tracker.finish().completed);
    }
}
