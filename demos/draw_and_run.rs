//! Draw a route on a simulated map, erase part of it, then replay a run.
//!
//! Run with: cargo run --example draw_and_run

use route_tracker::{
    EditEvent, GeoPoint, MercatorViewport, PositionSample, RenderSink, RouteEditor, RunSession,
    RunSummary, ScreenPoint, TrackUpdate, TrackerConfig, VecPositionSource,
};

/// Prints every fifth update, like a map overlay refreshing.
struct ConsoleSink {
    updates: usize,
}

impl RenderSink for ConsoleSink {
    fn on_update(&mut self, update: &TrackUpdate) {
        self.updates += 1;
        if self.updates % 5 != 1 {
            return;
        }
        let remaining = update.split.as_ref().map_or(0, |s| s.remaining.len());
        println!(
            "  {:>5.0}m run | {:>5.1}% | {} route points ahead{}",
            update.snapshot.distance_run,
            update.snapshot.route_progress * 100.0,
            remaining,
            update
                .pace_s_per_km
                .map(|p| format!(" | {}:{:02} /km", (p / 60.0) as u32, (p % 60.0) as u32))
                .unwrap_or_default()
        );
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        println!("\nRun finished after {} samples:", summary.sample_count);
        println!("  distance run:   {:.0}m", summary.distance_run_m);
        println!("  route covered:  {:.1}%", summary.route_progress * 100.0);
        println!("  completed:      {}", summary.completed);
        println!("  GPS jumps:      {}", summary.glitch_count);
    }
}

fn main() {
    // Hyde Park, 400x800 phone screen at zoom 16
    let viewport = MercatorViewport::new(GeoPoint::new(51.5073, -0.1657), 16.0, 400.0, 800.0);
    let mut editor = RouteEditor::new();

    println!("Drawing route ({:.2} m/px)\n", viewport.meters_per_pixel());

    // A wobbly finger drag: up the left side, across the top
    editor.apply(EditEvent::BeginStroke, &viewport);
    for i in 0..=60 {
        let t = i as f64;
        let screen = if i <= 30 {
            ScreenPoint::new(80.0 + (t * 0.7).sin() * 2.0, 700.0 - t * 18.0)
        } else {
            ScreenPoint::new(80.0 + (t - 30.0) * 8.0, 160.0 + (t * 0.9).cos() * 2.0)
        };
        let point = viewport.unproject(&screen);
        editor.apply(EditEvent::Draw { point, screen }, &viewport);
    }
    let drawn = editor.len();
    editor.apply(EditEvent::EndStroke, &viewport);
    println!(
        "  stroke: {} points drawn, {} after simplification, {:.0}m",
        drawn,
        editor.len(),
        editor.total_meters()
    );

    // Oops: erase the tail of the top edge
    editor.apply(EditEvent::Erase { target: ScreenPoint::new(315.0, 160.0) }, &viewport);
    println!(
        "  erase:  {} points left, {:.0}m\n",
        editor.len(),
        editor.total_meters()
    );

    // Replay a run along the route at ~3 m/s with a GPS jump halfway
    let route = editor.route();
    let points = route.points().to_vec();
    let mut samples = Vec::new();
    let mut elapsed = 0.0;
    for pair in points.windows(2) {
        for step in 0..10 {
            let f = step as f64 / 10.0;
            let point = GeoPoint::new(
                pair[0].latitude + f * (pair[1].latitude - pair[0].latitude),
                pair[0].longitude + f * (pair[1].longitude - pair[0].longitude),
            );
            samples.push(PositionSample::timed(point, elapsed));
            elapsed += 5.0;
        }
    }
    if let Some(last) = points.last() {
        samples.push(PositionSample::timed(*last, elapsed));
    }
    if samples.len() > 4 {
        let mid = samples.len() / 2;
        let p = samples[mid].point;
        samples[mid].point = GeoPoint::new(p.latitude + 0.003, p.longitude);
    }

    println!("Running {:.0}m route\n", route.total_meters());
    let mut sink = ConsoleSink { updates: 0 };
    RunSession::new(route, TrackerConfig::default(), VecPositionSource::new(samples)).run(&mut sink);
}
