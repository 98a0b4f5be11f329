pub mod feed;
pub mod geojson;

pub use feed::{FeedError, FeedSource, FeedState, HttpFeedSource, StaticFeedSource};
#[cfg(feature = "tokio-runtime")]
pub use feed::FeedLoader;
pub use geojson::{parse_feed, EarthquakeFeature, FeatureCollection, FeatureId, GeoJsonFeature};
