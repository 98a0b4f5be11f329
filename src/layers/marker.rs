use crate::{
    core::{constants::MAGNITUDE_RADIUS_SCALE, geo::LatLng, geo::Point},
    data::geojson::EarthquakeFeature,
    style::{color::Color, depth::color_for_depth},
};
use serde::{Deserialize, Serialize};

/// A circle drawn at a fixed pixel radius regardless of zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleMarker {
    pub position: LatLng,
    /// Pixels. Not clamped: zero or negative radii simply draw nothing.
    pub radius: f64,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub weight: f32,
    /// Stroke opacity
    pub opacity: f32,
    pub fill_opacity: f32,
    pub popup: Option<String>,
}

impl CircleMarker {
    pub fn new(position: LatLng, radius: f64) -> Self {
        Self {
            position,
            radius,
            fill_color: Color::rgb(0x33, 0x88, 0xFF),
            stroke_color: Color::rgb(0x33, 0x88, 0xFF),
            weight: 3.0,
            opacity: 1.0,
            fill_opacity: 0.2,
            popup: None,
        }
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup = Some(text.into());
        self
    }

    /// Whether `point` falls inside the circle drawn at `center` (both in
    /// container pixels), counting the stroke
    pub fn hit_test(&self, center: &Point, point: &Point) -> bool {
        if self.radius <= 0.0 {
            return false;
        }
        center.distance_to(point) <= self.radius + f64::from(self.weight) / 2.0
    }
}

/// Marker for one earthquake: radius grows linearly with magnitude, fill
/// color follows the depth bucket, thin black outline
pub fn marker_for(feature: &EarthquakeFeature) -> CircleMarker {
    CircleMarker {
        position: feature.lat_lng(),
        radius: feature.magnitude * MAGNITUDE_RADIUS_SCALE,
        fill_color: color_for_depth(feature.depth_km),
        stroke_color: Color::BLACK,
        weight: 1.0,
        opacity: 1.0,
        fill_opacity: 0.8,
        popup: None,
    }
}
