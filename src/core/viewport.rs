use crate::core::{
    constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, TILE_SIZE},
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
            size,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), LatLng::wrap_lng(center.lng));
    }

    /// Sets the zoom level, clamping to the zoom limits
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Size of the whole world in pixels at `zoom`
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Projects a LatLng to world pixel coordinates (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let scale = Self::world_size(zoom.unwrap_or(self.zoom));
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;

        Point::new(x, y)
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let scale = Self::world_size(zoom.unwrap_or(self.zoom));

        let lng = pixel.x / scale * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * pixel.y / scale);
        let lat = n.sinh().atan().to_degrees();

        LatLng::new(lat, lng)
    }

    /// World pixel coordinate of the top-left corner of the view
    pub fn pixel_origin(&self) -> Point {
        let center = self.project(&self.center, None);
        center.subtract(&self.size.multiply(0.5))
    }

    /// Converts a geographical coordinate to container-relative pixels
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container-relative pixels back to a geographical coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.unproject(&pixel.add(&self.pixel_origin()), None)
    }

    /// Pans the view so the content moves by `delta` screen pixels
    pub fn pan(&mut self, delta: Point) {
        let center_px = self.project(&self.center, None);
        let new_center = self.unproject(&center_px.subtract(&delta), None);
        self.set_center(new_center);
    }

    /// Zooms to `zoom`, keeping the geographic point under `focus_point` fixed
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        match focus_point {
            Some(focus) => {
                let focus_lat_lng = self.pixel_to_lat_lng(&focus);
                self.zoom = new_zoom;
                let focus_world = self.project(&focus_lat_lng, None);
                let offset = focus.subtract(&self.size.multiply(0.5));
                let center = self.unproject(&focus_world.subtract(&offset), None);
                self.set_center(center);
            }
            None => self.zoom = new_zoom,
        }
    }

    /// Geographic bounds currently visible
    pub fn bounds(&self) -> LatLngBounds {
        let north_west = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let south_east = self.pixel_to_lat_lng(&self.size);
        LatLngBounds::new(
            LatLng::new(south_east.lat, north_west.lng),
            LatLng::new(north_west.lat, south_east.lng),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_project_origin() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));
        let p = viewport.project(&LatLng::new(0.0, 0.0), Some(0.0));
        assert!(approx(p.x, 128.0));
        assert!(approx(p.y, 128.0));
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let viewport = Viewport::new(LatLng::new(39.8283, -98.5795), 5.0, Point::new(800.0, 600.0));
        let ll = LatLng::new(35.0, -120.0);
        let back = viewport.unproject(&viewport.project(&ll, None), None);
        assert!(approx(back.lat, ll.lat));
        assert!(approx(back.lng, ll.lng));
    }

    #[test]
    fn test_center_maps_to_middle_of_container() {
        let viewport = Viewport::new(LatLng::new(39.8283, -98.5795), 5.0, Point::new(800.0, 600.0));
        let p = viewport.lat_lng_to_pixel(&viewport.center);
        assert!(approx(p.x, 400.0));
        assert!(approx(p.y, 300.0));
    }

    #[test]
    fn test_pan_moves_center_against_drag() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(800.0, 600.0));
        viewport.pan(Point::new(100.0, 0.0));
        assert!(viewport.center.lng < 0.0);
        assert!(approx(viewport.center.lat, 0.0));
    }

    #[test]
    fn test_zoom_keeps_focus_point() {
        let mut viewport = Viewport::new(LatLng::new(20.0, 10.0), 4.0, Point::new(800.0, 600.0));
        let focus = Point::new(600.0, 150.0);
        let before = viewport.pixel_to_lat_lng(&focus);

        viewport.zoom_to(6.0, Some(focus));

        let after = viewport.lat_lng_to_pixel(&before);
        assert_eq!(viewport.zoom, 6.0);
        assert!((after.x - focus.x).abs() < 1e-3);
        assert!((after.y - focus.y).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::new(LatLng::default(), 5.0, Point::new(100.0, 100.0));
        viewport.set_zoom_limits(2.0, 10.0);
        viewport.zoom_to(25.0, None);
        assert_eq!(viewport.zoom, 10.0);
        viewport.set_zoom(0.0);
        assert_eq!(viewport.zoom, 2.0);
    }
}
