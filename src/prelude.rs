//! Prelude module for common quakemap types and traits
//!
//! Re-exports the most commonly used items for `use quakemap::prelude::*;`

pub use crate::core::{
    config::QuakeMapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{build_map, Map as CoreMap},
    viewport::Viewport,
};

pub use crate::data::{
    feed::{load as load_feed, FeedError, FeedSource, FeedState, HttpFeedSource, StaticFeedSource},
    geojson::{parse_feed, EarthquakeFeature},
};

#[cfg(feature = "tokio-runtime")]
pub use crate::data::feed::FeedLoader;

pub use crate::layers::{
    base::{LayerRole, LayerTrait, LayerType},
    manager::LayerManager,
    marker::{marker_for, CircleMarker},
    overlay::{build_overlay, GeoJsonLayer},
    tile::{TileLayer, TileLayerOptions},
};

pub use crate::style::{
    color::Color,
    depth::{color_for_depth, ColorBucket, DEPTH_BUCKETS},
};

pub use crate::tiles::cache::TileCache;

#[cfg(feature = "tokio-runtime")]
pub use crate::tiles::loader::{TileLoader, TileLoaderConfig};

pub use crate::ui::{
    controls::{ControlPosition, LayerControl, LayerEntry},
    legend::{Legend, LegendRow},
    popup::{popup_for, popup_for_in, Popup},
};

#[cfg(feature = "egui")]
pub use crate::ui::widget::MapWidget;

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
