use crate::{
    core::{
        geo::{LatLng, LatLngBounds},
        map::EARTHQUAKE_LAYER_ID,
    },
    data::geojson::EarthquakeFeature,
    layers::{
        base::{LayerProperties, LayerRole, LayerTrait, LayerType},
        marker::CircleMarker,
    },
};

/// Overlay holding one marker per feed feature
pub struct GeoJsonLayer {
    properties: LayerProperties,
    markers: Vec<CircleMarker>,
}

impl GeoJsonLayer {
    pub fn new(id: String, name: String) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::GeoJson, LayerRole::Overlay),
            markers: Vec::new(),
        }
    }

    pub fn with_markers(mut self, markers: Vec<CircleMarker>) -> Self {
        self.markers = markers;
        self
    }

    pub fn markers(&self) -> &[CircleMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl LayerTrait for GeoJsonLayer {
    crate::impl_layer_trait!(properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        let points: Vec<LatLng> = self.markers.iter().map(|m| m.position).collect();
        LatLngBounds::from_points(&points)
    }
}

/// Builds the earthquake overlay with explicit strategies: `marker_for` turns
/// a feature into a marker and `popup_for` supplies the popup bound to it
pub fn build_overlay<M, P>(features: &[EarthquakeFeature], marker_for: M, popup_for: P) -> GeoJsonLayer
where
    M: Fn(&EarthquakeFeature) -> CircleMarker,
    P: Fn(&EarthquakeFeature) -> String,
{
    let markers = features
        .iter()
        .map(|feature| {
            let mut marker = marker_for(feature);
            marker.popup = Some(popup_for(feature));
            marker
        })
        .collect();

    GeoJsonLayer::new(EARTHQUAKE_LAYER_ID.to_string(), "Earthquakes".to_string()).with_markers(markers)
}
