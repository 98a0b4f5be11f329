//! Engine-wide defaults for the earthquake map.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// USGS feed of significant earthquakes in the past day.
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/significant_day.geojson";

/// Initial view center (geographic center of the contiguous US).
pub const DEFAULT_CENTER: (f64, f64) = (39.8283, -98.5795);

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 5.0;

pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Snap zoom levels to these quanta (1 → integer zooms).
pub const DEFAULT_ZOOM_SNAP: f64 = 1.0;

/// Marker radius in pixels per unit of magnitude.
pub const MAGNITUDE_RADIUS_SCALE: f64 = 3.0;

/// User agent sent with feed and tile requests. OSM tile policy requires one.
pub const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// Number of decoded tiles kept around for redraws.
pub const TILE_CACHE_CAPACITY: usize = 512;
