pub mod base;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod overlay;
pub mod tile;

pub use base::{LayerProperties, LayerRole, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use marker::{marker_for, CircleMarker};
pub use overlay::{build_overlay, GeoJsonLayer};
pub use tile::{TileLayer, TileLayerOptions, TilePlacement};
