//! # Route Editor
//!
//! The mutable side of the crate: an ordered list of route points edited by
//! freehand draw and brush-erase gestures.
//!
//! UI events are delivered as explicit method calls, or as [`EditEvent`]s fed
//! through [`RouteEditor::apply`]; the editor never subscribes to anything.
//!
//! ## Stroke lifecycle
//!
//! 1. [`begin_stroke`](RouteEditor::begin_stroke) marks where the stroke starts
//! 2. [`draw`](RouteEditor::draw) appends points, throttled in screen space
//! 3. [`end_stroke`](RouteEditor::end_stroke) simplifies only the points drawn
//!    in that stroke, so earlier strokes are not re-simplified
//!
//! ## Brush erase
//!
//! [`erase_near`](RouteEditor::erase_near) removes every point within the
//! brush radius, and both endpoints of every segment passing within the
//! radius. The segment rule matters: a long straight segment has no vertex
//! near its midpoint, so a vertex-only rule could never cut it.

use log::{debug, info};

use crate::config::EditorConfig;
use crate::geo_utils::{polyline_length, screen_distance_to_segment};
use crate::projector::ScreenProjector;
use crate::simplify::simplify;
use crate::{GeoPoint, Route, ScreenPoint};

/// A UI gesture, applied synchronously with [`RouteEditor::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditEvent {
    BeginStroke,
    /// A drawn point and where it was touched on screen.
    Draw { point: GeoPoint, screen: ScreenPoint },
    EndStroke,
    /// A brush touch at a screen position, using the configured radius.
    Erase { target: ScreenPoint },
    Undo,
    Reset,
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    /// Index of the first point appended by this stroke.
    start_index: usize,
    /// Screen position of the last point accepted in this stroke.
    last_screen: Option<ScreenPoint>,
}

/// Mutable route being drawn by the user.
#[derive(Debug, Clone, Default)]
pub struct RouteEditor {
    points: Vec<GeoPoint>,
    total_meters: f64,
    config: EditorConfig,
    stroke: Option<Stroke>,
}

impl RouteEditor {
    /// Create an empty editor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty editor with custom configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Cached route length in meters, as of the last [`recalc_distance`](Self::recalc_distance).
    pub fn total_meters(&self) -> f64 {
        self.total_meters
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    // ========================================================================
    // Primitive edits
    // ========================================================================

    /// Append a point to the end of the route.
    ///
    /// Does not update [`total_meters`](Self::total_meters), so several appends
    /// can be batched before one [`recalc_distance`](Self::recalc_distance).
    pub fn append(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    /// Recompute the cached route length.
    pub fn recalc_distance(&mut self) {
        self.total_meters = polyline_length(&self.points);
    }

    /// Remove the last point, if any.
    ///
    /// The caller recomputes the distance afterwards.
    pub fn undo_last(&mut self) -> Option<GeoPoint> {
        self.points.pop()
    }

    /// Remove every point.
    pub fn reset(&mut self) {
        self.points.clear();
        self.total_meters = 0.0;
        self.stroke = None;
    }

    /// Brush-erase around a screen position.
    ///
    /// Removes every point within `radius_px` of `target`, and both endpoints
    /// of every segment passing within `radius_px`. The remaining points keep
    /// their order and the distance is recomputed. Returns the number of
    /// points removed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use route_tracker::{GeoPoint, RouteEditor, ScreenPoint};
    ///
    /// let mut editor = RouteEditor::new();
    /// editor.append(GeoPoint::new(0.0, 0.0));
    /// editor.append(GeoPoint::new(0.0, 0.01));
    /// editor.recalc_distance();
    ///
    /// // 1 px per 0.0001 deg: the endpoints are 100px apart
    /// let projector = |p: &GeoPoint| ScreenPoint::new(p.longitude * 10_000.0, p.latitude * 10_000.0);
    ///
    /// // Touch the middle of the segment, far from both vertices
    /// let removed = editor.erase_near(ScreenPoint::new(50.0, 5.0), &projector, 18.0);
    /// assert_eq!(removed, 2);
    /// assert!(editor.is_empty());
    /// assert_eq!(editor.total_meters(), 0.0);
    /// ```
    pub fn erase_near<P>(&mut self, target: ScreenPoint, projector: &P, radius_px: f64) -> usize
    where
        P: ScreenProjector + ?Sized,
    {
        if self.points.is_empty() {
            return 0;
        }

        let screen: Vec<ScreenPoint> = self.points.iter().map(|p| projector.project(p)).collect();
        let mut remove = vec![false; screen.len()];

        if screen.len() == 1 {
            remove[0] = screen[0].distance_to(&target) <= radius_px;
        } else {
            for (i, s) in screen.iter().enumerate() {
                if s.distance_to(&target) <= radius_px {
                    remove[i] = true;
                }
            }
            for i in 0..screen.len() - 1 {
                if screen_distance_to_segment(&target, &screen[i], &screen[i + 1]) <= radius_px {
                    remove[i] = true;
                    remove[i + 1] = true;
                }
            }
        }

        // Keep the active stroke anchored to its own first point
        if let Some(stroke) = self.stroke.as_mut() {
            let start = stroke.start_index.min(remove.len());
            let shifted = remove[..start].iter().filter(|&&r| r).count();
            stroke.start_index -= shifted;
        }

        let before = self.points.len();
        let mut flags = remove.iter();
        self.points.retain(|_| !flags.next().copied().unwrap_or(false));
        let removed = before - self.points.len();

        if removed > 0 {
            self.recalc_distance();
            debug!(
                "[RouteEditor] Erased {} of {} points at ({:.1}, {:.1}), {:.0}m remain",
                removed, before, target.x, target.y, self.total_meters
            );
        }

        removed
    }

    /// Brush-erase using the configured radius.
    pub fn erase<P>(&mut self, target: ScreenPoint, projector: &P) -> usize
    where
        P: ScreenProjector + ?Sized,
    {
        let radius = self.config.erase_radius_px;
        self.erase_near(target, projector, radius)
    }

    // ========================================================================
    // Strokes
    // ========================================================================

    /// Start a new freehand stroke at the end of the route.
    pub fn begin_stroke(&mut self) {
        self.stroke = Some(Stroke {
            start_index: self.points.len(),
            last_screen: None,
        });
    }

    /// Add a drawn point to the current stroke.
    ///
    /// Points closer than `draw_throttle_px` on screen to the previously
    /// accepted point of the stroke are dropped. Starts a stroke implicitly if
    /// none is in progress. Returns whether the point was appended.
    pub fn draw(&mut self, point: GeoPoint, screen: ScreenPoint) -> bool {
        if self.stroke.is_none() {
            self.begin_stroke();
        }
        let throttle = self.config.draw_throttle_px;

        let Some(stroke) = self.stroke.as_mut() else {
            return false;
        };
        if let Some(last) = stroke.last_screen {
            if last.distance_to(&screen) < throttle {
                return false;
            }
        }
        stroke.last_screen = Some(screen);

        self.append(point);
        self.recalc_distance();
        true
    }

    /// Finish the current stroke and simplify the points it added.
    ///
    /// The last point before the stroke is included as a fixed anchor, so the
    /// join with earlier strokes is preserved. Returns the number of points
    /// dropped by simplification.
    pub fn end_stroke(&mut self) -> usize {
        let Some(stroke) = self.stroke.take() else {
            return 0;
        };

        // Erase or undo during the stroke may have shrunk the route
        let from = stroke.start_index.min(self.points.len()).saturating_sub(1);
        let drawn = &self.points[from..];
        let simplified = simplify(drawn, self.config.simplify_tolerance_m);
        let dropped = drawn.len() - simplified.len();

        if dropped > 0 {
            info!(
                "[RouteEditor] Stroke simplified from {} to {} points",
                drawn.len(),
                simplified.len()
            );
            self.points.truncate(from);
            self.points.extend(simplified);
        }
        self.recalc_distance();

        dropped
    }

    // ========================================================================
    // Events and hand-off
    // ========================================================================

    /// Apply one UI event. Distance is always up to date afterwards.
    ///
    /// Returns whether the route points changed.
    pub fn apply<P>(&mut self, event: EditEvent, projector: &P) -> bool
    where
        P: ScreenProjector + ?Sized,
    {
        match event {
            EditEvent::BeginStroke => {
                self.begin_stroke();
                false
            }
            EditEvent::Draw { point, screen } => self.draw(point, screen),
            EditEvent::EndStroke => self.end_stroke() > 0,
            EditEvent::Erase { target } => self.erase(target, projector) > 0,
            EditEvent::Undo => {
                let undone = self.undo_last().is_some();
                self.recalc_distance();
                undone
            }
            EditEvent::Reset => {
                let changed = !self.points.is_empty();
                self.reset();
                changed
            }
        }
    }

    /// Snapshot the current points as an immutable [`Route`] for a run.
    pub fn route(&self) -> Route {
        Route::new(self.points.clone())
    }
}
