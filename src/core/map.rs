use crate::{
    core::{
        config::QuakeMapConfig,
        constants::DEFAULT_ZOOM_SNAP,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::geojson::EarthquakeFeature,
    layers::{
        base::LayerTrait,
        manager::LayerManager,
        marker::marker_for,
        overlay::{build_overlay, GeoJsonLayer},
        tile::TileLayer,
    },
    ui::{
        controls::{ControlPosition, LayerControl},
        legend::Legend,
        popup::popup_for,
    },
    Result,
};

pub const STREET_LAYER_ID: &str = "street";
pub const TOPO_LAYER_ID: &str = "topo";
pub const SATELLITE_LAYER_ID: &str = "satellite";
pub const EARTHQUAKE_LAYER_ID: &str = "earthquakes";

/// Which interactions the map widget honors
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub dragging: bool,
    pub scroll_wheel_zoom: bool,
    pub double_click_zoom: bool,
    pub attribution_control: bool,
    pub zoom_control: bool,
    pub zoom_snap: f64,
    pub zoom_delta: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dragging: true,
            scroll_wheel_zoom: true,
            double_click_zoom: true,
            attribution_control: true,
            zoom_control: true,
            zoom_snap: DEFAULT_ZOOM_SNAP,
            zoom_delta: 1.0,
        }
    }
}

/// The map model: view state, layers and the controls drawn over them.
/// Rendering lives in [`crate::ui::widget::MapWidget`].
pub struct Map {
    pub(crate) viewport: Viewport,
    pub(crate) layers: LayerManager,
    pub(crate) layer_control: LayerControl,
    pub(crate) legend: Legend,
    options: MapOptions,
}

impl Map {
    /// Empty map. The size is a placeholder until the widget reports its rect.
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_options(Viewport::new(center, zoom, size), MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        Self {
            viewport,
            layers: LayerManager::new(),
            layer_control: LayerControl::new(ControlPosition::TopRight),
            legend: Legend::depth(),
            options,
        }
    }

    /// Zooms by `delta` levels, snapped, keeping `focus` (container pixels)
    /// fixed on screen
    pub fn zoom_by(&mut self, delta: f64, focus: Option<Point>) {
        let target = snap_zoom(self.viewport.zoom + delta, self.options.zoom_snap);
        self.viewport.zoom_to(target, focus);
    }

    /// Adds a layer and lists it in the layer control
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let (role, id, name) = (layer.role(), layer.id().to_string(), layer.name().to_string());
        self.layers.add_layer(layer)?;
        self.layer_control.add_entry(role, id, name);
        Ok(())
    }

    pub fn set_active_base(&mut self, layer_id: &str) -> Result<()> {
        self.layers.set_active_base(layer_id)
    }

    pub fn set_overlay_visible(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        self.layers.set_overlay_visible(layer_id, visible)
    }

    pub fn set_layer_control(&mut self, control: LayerControl) {
        let mut control = control;
        for layer in self.layers.layers() {
            control.add_entry(layer.role(), layer.id(), layer.name());
        }
        self.layer_control = control;
    }

    pub fn set_legend(&mut self, legend: Legend) {
        self.legend = legend;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn layer_control(&self) -> &LayerControl {
        &self.layer_control
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// The earthquake overlay, when present
    pub fn earthquakes(&self) -> Option<&GeoJsonLayer> {
        self.layers.get::<GeoJsonLayer>(EARTHQUAKE_LAYER_ID)
    }
}

fn snap_zoom(zoom: f64, snap: f64) -> f64 {
    if snap > 0.0 {
        (zoom / snap).round() * snap
    } else {
        zoom
    }
}

/// Assembles the earthquake map: three base layers with "Grey Scale"
/// active, the earthquake overlay, an expanded layer control and the depth
/// legend
pub fn build_map(features: &[EarthquakeFeature], config: &QuakeMapConfig) -> Result<Map> {
    config.validate()?;

    let mut viewport = Viewport::new(config.center, config.zoom, Point::new(800.0, 600.0));
    viewport.set_zoom_limits(config.min_zoom, config.max_zoom);
    viewport.set_zoom(config.zoom);
    let mut map = Map::with_options(viewport, MapOptions::default());

    map.set_layer_control(
        LayerControl::new(ControlPosition::TopRight).with_collapsed(config.layer_control_collapsed),
    );
    map.set_legend(Legend::depth().with_position(config.legend_position));

    map.add_layer(Box::new(TileLayer::street(
        STREET_LAYER_ID.to_string(),
        "Grey Scale".to_string(),
    )))?;
    map.add_layer(Box::new(TileLayer::topographic(
        TOPO_LAYER_ID.to_string(),
        "Outdoors".to_string(),
    )))?;
    map.add_layer(Box::new(TileLayer::satellite(
        SATELLITE_LAYER_ID.to_string(),
        "Satellite".to_string(),
    )))?;

    let overlay = build_overlay(features, marker_for, popup_for);
    log::info!("earthquake overlay built with {} markers", overlay.len());
    map.add_layer(Box::new(overlay))?;

    map.set_active_base(STREET_LAYER_ID)?;
    Ok(map)
}
