//! # quakemap
//!
//! Fetches a GeoJSON earthquake feed and renders it on a small Leaflet-style
//! map engine: depth-colored circle markers sized by magnitude, popups, a
//! base-layer switcher and a static depth legend.
//!
//! The depth/color/popup logic lives in [`style`], [`layers::marker`] and
//! [`ui::popup`] and has no rendering dependency, so it can be exercised
//! without a window. The egui widget in [`ui::widget`] is the rendering
//! adapter.

pub mod core;
pub mod data;
pub mod layers;
pub mod prelude;
pub mod style;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::QuakeMapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{build_map, Map},
    viewport::Viewport,
};

pub use data::{
    feed::{load as load_feed, FeedError, FeedSource, FeedState, HttpFeedSource, StaticFeedSource},
    geojson::{parse_feed, EarthquakeFeature},
};

#[cfg(feature = "tokio-runtime")]
pub use data::feed::FeedLoader;

pub use layers::{
    base::LayerTrait,
    marker::{marker_for, CircleMarker},
    overlay::{build_overlay, GeoJsonLayer},
    tile::TileLayer,
};

pub use style::{
    color::Color,
    depth::{color_for_depth, ColorBucket, DEPTH_BUCKETS},
};

pub use ui::{
    controls::{ControlPosition, LayerControl},
    legend::{Legend, LegendRow},
    popup::{popup_for, popup_for_in},
};

#[cfg(feature = "egui")]
pub use ui::widget::MapWidget;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feed unavailable: {0}")]
    Feed(#[from] FeedError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
