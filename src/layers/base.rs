use crate::core::geo::LatLngBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    GeoJson,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::GeoJson => write!(f, "geojson"),
        }
    }
}

/// How the layer control treats a layer: base layers are mutually exclusive,
/// overlays toggle independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    Base,
    Overlay,
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub role: LayerRole,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType, role: LayerRole) -> Self {
        let z_index = match role {
            LayerRole::Base => 0,
            LayerRole::Overlay => 400,
        };
        Self {
            id,
            name,
            layer_type,
            role,
            z_index,
            opacity: 1.0,
            visible: true,
        }
    }
}

/// Common interface of everything the [`LayerManager`](crate::layers::manager::LayerManager) holds
pub trait LayerTrait: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn layer_type(&self) -> LayerType;
    fn role(&self) -> LayerRole;

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);

    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    /// Attribution the provider requires to be displayed while the layer is shown
    fn attribution(&self) -> Option<&str> {
        None
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
