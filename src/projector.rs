//! Screen-space projection for brush erase.
//!
//! The erase brush radius is defined in pixels so it feels the same at every
//! zoom level. The editor therefore needs to know where each route point
//! currently sits on screen; the host map view supplies that through a
//! [`ScreenProjector`].

use std::f64::consts::PI;

use crate::{GeoPoint, ScreenPoint};

/// Maps a geographic point to its current on-screen pixel location.
pub trait ScreenProjector {
    fn project(&self, point: &GeoPoint) -> ScreenPoint;
}

impl<F> ScreenProjector for F
where
    F: Fn(&GeoPoint) -> ScreenPoint,
{
    fn project(&self, point: &GeoPoint) -> ScreenPoint {
        self(point)
    }
}

/// A Web-Mercator map viewport, as used by slippy-map tile renderers.
///
/// `center` is drawn at the middle of a `width_px` x `height_px` view, at a
/// fractional `zoom` where the world is `tile_size_px * 2^zoom` pixels wide.
///
/// ```rust
/// use route_tracker::{GeoPoint, MercatorViewport, ScreenProjector};
///
/// let viewport = MercatorViewport::new(GeoPoint::new(51.5, -0.12), 16.0, 400.0, 800.0);
/// let center = viewport.project(&GeoPoint::new(51.5, -0.12));
/// assert!((center.x - 200.0).abs() < 1e-6);
/// assert!((center.y - 400.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MercatorViewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub tile_size_px: f64,
}

impl MercatorViewport {
    /// Create a viewport with the standard 256px tiles.
    pub fn new(center: GeoPoint, zoom: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            zoom,
            width_px,
            height_px,
            tile_size_px: 256.0,
        }
    }

    /// Size of the whole world in pixels at this zoom.
    fn world_size(&self) -> f64 {
        self.tile_size_px * 2_f64.powf(self.zoom)
    }

    /// Absolute world pixel coordinates of a point.
    fn world_pixel(&self, point: &GeoPoint) -> (f64, f64) {
        let size = self.world_size();
        let x = (point.longitude + 180.0) / 360.0 * size;
        let lat_rad = point.latitude.to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    /// Inverse projection: the geographic point under a screen pixel.
    pub fn unproject(&self, screen: &ScreenPoint) -> GeoPoint {
        let size = self.world_size();
        let (cx, cy) = self.world_pixel(&self.center);
        let wx = cx + screen.x - self.width_px / 2.0;
        let wy = cy + screen.y - self.height_px / 2.0;

        let longitude = wx / size * 360.0 - 180.0;
        let latitude = ((1.0 - 2.0 * wy / size) * PI).sinh().atan().to_degrees();
        GeoPoint::new(latitude, longitude)
    }

    /// Approximate ground distance covered by one pixel at the viewport center.
    pub fn meters_per_pixel(&self) -> f64 {
        const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
        EARTH_CIRCUMFERENCE_M * self.center.latitude.to_radians().cos() / self.world_size()
    }
}

impl ScreenProjector for MercatorViewport {
    fn project(&self, point: &GeoPoint) -> ScreenPoint {
        let (px, py) = self.world_pixel(point);
        let (cx, cy) = self.world_pixel(&self.center);
        ScreenPoint::new(
            px - cx + self.width_px / 2.0,
            py - cy + self.height_px / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_closure_projector() {
        let projector = |p: &GeoPoint| ScreenPoint::new(p.longitude * 10.0, -p.latitude * 10.0);
        let screen = projector.project(&GeoPoint::new(2.0, 3.0));
        assert_eq!(screen, ScreenPoint::new(30.0, -20.0));
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let viewport = MercatorViewport::new(GeoPoint::new(47.37, 8.54), 15.0, 400.0, 400.0);
        let north = viewport.project(&GeoPoint::new(47.371, 8.54));
        let east = viewport.project(&GeoPoint::new(47.37, 8.541));
        assert!(north.y < 200.0);
        assert!(approx_eq(north.x, 200.0, 1e-6));
        assert!(east.x > 200.0);
        assert!(approx_eq(east.y, 200.0, 1e-6));
    }

    #[test]
    fn test_zoom_doubles_pixel_distance() {
        let center = GeoPoint::new(51.5, -0.12);
        let other = GeoPoint::new(51.501, -0.12);
        let z15 = MercatorViewport::new(center, 15.0, 400.0, 400.0);
        let z16 = MercatorViewport::new(center, 16.0, 400.0, 400.0);
        let d15 = (z15.project(&other).y - 200.0).abs();
        let d16 = (z16.project(&other).y - 200.0).abs();
        assert!(approx_eq(d16, d15 * 2.0, 1e-6));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let viewport = MercatorViewport::new(GeoPoint::new(-33.86, 151.21), 17.0, 360.0, 640.0);
        let point = GeoPoint::new(-33.8612, 151.2093);
        let back = viewport.unproject(&viewport.project(&point));
        assert!(approx_eq(back.latitude, point.latitude, 1e-9));
        assert!(approx_eq(back.longitude, point.longitude, 1e-9));
    }

    #[test]
    fn test_meters_per_pixel() {
        // ~2.39 m/px at zoom 16 on the equator
        let viewport = MercatorViewport::new(GeoPoint::new(0.0, 0.0), 16.0, 400.0, 400.0);
        assert!(approx_eq(viewport.meters_per_pixel(), 2.389, 0.01));
    }
}
