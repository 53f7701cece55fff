//! Run sessions: a position source driving a tracker into a render sink.
//!
//! GPS hardware and map drawing live outside the crate. A [`PositionSource`]
//! is handed in explicitly (no process-wide location manager), and every
//! [`TrackUpdate`] is pushed to a [`RenderSink`] that owns whatever drawable
//! objects the host uses. Everything runs synchronously on the caller's
//! thread.

use std::collections::VecDeque;

use log::info;

use crate::config::TrackerConfig;
use crate::tracker::{PositionSample, ProgressTracker, RunSummary, TrackUpdate};
use crate::Route;

/// Supplies position samples in time order.
pub trait PositionSource {
    /// The next sample, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> Option<PositionSample>;
}

/// Receives tracker output for rendering.
pub trait RenderSink {
    fn on_update(&mut self, update: &TrackUpdate);

    /// Called once when the run ends. The sink releases its drawables here.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Collects every update, e.g. for replay or tests.
impl RenderSink for Vec<TrackUpdate> {
    fn on_update(&mut self, update: &TrackUpdate) {
        self.push(update.clone());
    }
}

/// A recorded list of samples.
#[derive(Debug, Clone, Default)]
pub struct VecPositionSource {
    samples: VecDeque<PositionSample>,
}

impl VecPositionSource {
    pub fn new(samples: Vec<PositionSample>) -> Self {
        Self { samples: samples.into() }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl From<Vec<PositionSample>> for VecPositionSource {
    fn from(samples: Vec<PositionSample>) -> Self {
        Self::new(samples)
    }
}

impl PositionSource for VecPositionSource {
    fn next_sample(&mut self) -> Option<PositionSample> {
        self.samples.pop_front()
    }
}

/// One run: a tracker fed from a position source.
///
/// # Example
///
/// ```rust
/// use route_tracker::{
///     GeoPoint, PositionSample, Route, RunSession, TrackUpdate, TrackerConfig, VecPositionSource,
/// };
///
/// let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)]);
/// let source = VecPositionSource::new(
///     (0..=10)
///         .map(|i| PositionSample::timed(GeoPoint::new(i as f64 * 0.0001, 0.0), i as f64 * 4.0))
///         .collect(),
/// );
///
/// let mut updates: Vec<TrackUpdate> = Vec::new();
/// let summary = RunSession::new(route, TrackerConfig::default(), source).run(&mut updates);
///
/// assert_eq!(updates.len(), 11);
/// assert!(summary.completed);
/// assert!((summary.distance_run_m - 111.2).abs() < 0.5);
/// ```
pub struct RunSession<S: PositionSource> {
    tracker: ProgressTracker,
    source: S,
    stop_on_completion: bool,
}

impl<S: PositionSource> RunSession<S> {
    pub fn new(route: Route, config: TrackerConfig, source: S) -> Self {
        Self {
            tracker: ProgressTracker::new(route, config),
            source,
            stop_on_completion: false,
        }
    }

    /// End the run as soon as the route is completed instead of draining
    /// the source.
    pub fn stop_on_completion(mut self, stop: bool) -> Self {
        self.stop_on_completion = stop;
        self
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Pull and process one sample. `None` when the source is exhausted.
    pub fn step(&mut self) -> Option<TrackUpdate> {
        let sample = self.source.next_sample()?;
        Some(self.tracker.track(sample))
    }

    /// Drive the run to the end, pushing every update to `sink`.
    pub fn run<K: RenderSink + ?Sized>(mut self, sink: &mut K) -> RunSummary {
        while let Some(update) = self.step() {
            sink.on_update(&update);
            if self.stop_on_completion && update.completed {
                info!("[RunSession] Stopping at route completion");
                break;
            }
        }

        let summary = self.tracker.finish();
        sink.on_finish(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;

    fn route() -> Route {
        Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)])
    }

    fn walk(steps: usize) -> VecPositionSource {
        (0..=steps)
            .map(|i| PositionSample::new(GeoPoint::new(i as f64 * 0.0001, 0.0)))
            .collect::<Vec<_>>()
            .into()
    }

    #[derive(Default)]
    struct CountingSink {
        updates: usize,
        finished: Option<RunSummary>,
    }

    impl RenderSink for CountingSink {
        fn on_update(&mut self, _update: &TrackUpdate) {
            self.updates += 1;
        }

        fn on_finish(&mut self, summary: &RunSummary) {
            self.finished = Some(*summary);
        }
    }

    #[test]
    fn test_drains_source() {
        let mut sink = CountingSink::default();
        let summary = RunSession::new(route(), TrackerConfig::default(), walk(15)).run(&mut sink);
        assert_eq!(sink.updates, 16);
        assert_eq!(sink.finished, Some(summary));
        assert_eq!(summary.sample_count, 16);
    }

    #[test]
    fn test_stop_on_completion() {
        let mut updates: Vec<TrackUpdate> = Vec::new();
        let summary = RunSession::new(route(), TrackerConfig::default(), walk(15))
            .stop_on_completion(true)
            .run(&mut updates);
        // 0.98 of the route is reached at the 10th step
        assert_eq!(updates.len(), 11);
        assert!(summary.completed);
        assert!(updates.last().is_some_and(|u| u.completed));
    }

    #[test]
    fn test_step_by_step() {
        let mut session = RunSession::new(route(), TrackerConfig::default(), walk(2));
        assert!(session.step().is_some());
        assert!(session.step().is_some());
        let third = session.step().unwrap();
        assert!((third.snapshot.route_progress - 0.2).abs() < 1e-9);
        assert!(session.step().is_none());
        assert_eq!(session.tracker().snapshot(), third.snapshot);
    }

    #[test]
    fn test_sink_sees_unsnapped_position() {
        let runner = GeoPoint::new(0.0005, 0.0003);
        let source = VecPositionSource::new(vec![PositionSample::timed(runner, 12.0)]);
        let mut updates: Vec<TrackUpdate> = Vec::new();
        RunSession::new(route(), TrackerConfig::default(), source).run(&mut updates);

        let update = &updates[0];
        assert_eq!(update.sample.point, runner);
        assert_eq!(update.sample.elapsed_s, Some(12.0));
        let snapped = update.projection.map(|p| p.point).unwrap();
        assert!((snapped.latitude - 0.0005).abs() < 1e-12);
        assert_eq!(snapped.longitude, 0.0);
    }

    #[test]
    fn test_degenerate_route_still_reports_position() {
        let runner = GeoPoint::new(0.0002, 0.0001);
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0)]);
        let mut updates: Vec<TrackUpdate> = Vec::new();
        RunSession::new(route, TrackerConfig::default(), VecPositionSource::new(vec![runner.into()]))
            .run(&mut updates);

        assert_eq!(updates[0].sample.point, runner);
        assert!(updates[0].projection.is_none());
    }

    #[test]
    fn test_empty_source() {
        let mut updates: Vec<TrackUpdate> = Vec::new();
        let summary =
            RunSession::new(route(), TrackerConfig::default(), VecPositionSource::default()).run(&mut updates);
        assert!(updates.is_empty());
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.route_progress, 0.0);
    }
}
