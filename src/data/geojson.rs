use crate::{core::geo::LatLng, data::feed::FeedError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// GeoJSON geometry as it appears in the earthquake feeds. Only points carry
/// meaning here; other geometry types are kept so they can be reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Vec<f64>,
    },
    #[serde(other)]
    Unsupported,
}

/// `properties` object of a feed feature. Everything is optional on the wire;
/// [`EarthquakeFeature::from_geojson`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuakeProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Feature identifier; GeoJSON allows either a string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Text(id) => f.write_str(id),
            FeatureId::Number(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: QuakeProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMetadata {
    pub title: Option<String>,
    pub generated: Option<i64>,
    pub count: Option<usize>,
}

/// Root object of a feed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Option<FeedMetadata>,
    pub features: Vec<GeoJsonFeature>,
}

/// One earthquake from the feed, validated and flattened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeFeature {
    pub id: Option<String>,
    pub magnitude: f64,
    /// Hypocenter depth; negative values (above sea level) do occur
    pub depth_km: f64,
    pub place: String,
    /// Origin time in milliseconds since the Unix epoch
    pub time_millis: i64,
    /// `[longitude, latitude, depth]` exactly as in the feed
    pub coordinates: [f64; 3],
    /// USGS event page
    pub url: Option<String>,
}

impl EarthquakeFeature {
    pub fn new(
        magnitude: f64,
        longitude: f64,
        latitude: f64,
        depth_km: f64,
        place: impl Into<String>,
        time_millis: i64,
    ) -> Self {
        Self {
            id: None,
            magnitude,
            depth_km,
            place: place.into(),
            time_millis,
            coordinates: [longitude, latitude, depth_km],
            url: None,
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.coordinates[1], self.coordinates[0])
    }

    /// Validates one wire feature. `index` is only used for error messages.
    pub fn from_geojson(index: usize, feature: &GeoJsonFeature) -> Result<Self, FeedError> {
        let malformed = |reason: &str| FeedError::Malformed {
            index,
            reason: reason.to_string(),
        };

        let coordinates = match &feature.geometry {
            Some(GeoJsonGeometry::Point { coordinates }) => coordinates,
            Some(GeoJsonGeometry::Unsupported) => return Err(malformed("geometry is not a Point")),
            None => return Err(malformed("missing geometry")),
        };
        let [lng, lat, depth] = match coordinates.as_slice() {
            [lng, lat, depth, ..] => [*lng, *lat, *depth],
            _ => return Err(malformed("point needs [longitude, latitude, depth]")),
        };
        if !LatLng::new(lat, lng).is_valid() {
            return Err(malformed("coordinates out of range"));
        }

        let props = &feature.properties;
        let magnitude = props.mag.ok_or_else(|| malformed("missing properties.mag"))?;
        let place = props
            .place
            .clone()
            .ok_or_else(|| malformed("missing properties.place"))?;
        let time_millis = props.time.ok_or_else(|| malformed("missing properties.time"))?;

        Ok(Self {
            id: feature.id.as_ref().map(ToString::to_string),
            magnitude,
            depth_km: depth,
            place,
            time_millis,
            coordinates: [lng, lat, depth],
            url: props.url.clone(),
        })
    }
}

/// Parses a FeatureCollection body into validated features.
///
/// Any feature that cannot be drawn makes the whole payload malformed.
pub fn parse_feed(body: &str) -> Result<Vec<EarthquakeFeature>, FeedError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    if collection.kind != "FeatureCollection" {
        return Err(FeedError::NotAFeatureCollection(collection.kind));
    }

    if let Some(meta) = &collection.metadata {
        log::info!(
            "feed {:?}: {} features",
            meta.title.as_deref().unwrap_or("untitled"),
            meta.count.unwrap_or(collection.features.len())
        );
    }

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| EarthquakeFeature::from_geojson(index, feature))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
        "type": "FeatureCollection",
        "metadata": {"generated": 1700000000000, "title": "USGS Significant Earthquakes, Past Day", "count": 2},
        "features": [
            {
                "type": "Feature",
                "id": "us7000abcd",
                "properties": {"mag": 6.1, "place": "10km N of X", "time": 1700000000000, "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us7000abcd", "tsunami": 0},
                "geometry": {"type": "Point", "coordinates": [-122.5, 37.8, 12.3]}
            },
            {
                "type": "Feature",
                "id": "nc1234",
                "properties": {"mag": 4.5, "place": "Offshore", "time": 1699999999000},
                "geometry": {"type": "Point", "coordinates": [140.1, -5.2, -1.5]}
            }
        ]
    }
    "#;

    #[test]
    fn test_parse_sample_feed() {
        let features = parse_feed(SAMPLE).unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0];
        assert_eq!(first.id.as_deref(), Some("us7000abcd"));
        assert_eq!(first.magnitude, 6.1);
        assert_eq!(first.depth_km, 12.3);
        assert_eq!(first.place, "10km N of X");
        assert_eq!(first.time_millis, 1_700_000_000_000);
        assert_eq!(first.lat_lng(), LatLng::new(37.8, -122.5));
        assert!(first.url.is_some());

        assert_eq!(features[1].depth_km, -1.5);
    }

    #[test]
    fn test_numeric_feature_id() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": 12345,
                "properties": {"mag": 3.2, "place": "Offshore", "time": 0},
                "geometry": {"type": "Point", "coordinates": [140.0, 35.0, 40.0]}
            }]
        }"#;
        let features = parse_feed(body).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id.as_deref(), Some("12345"));
        assert_eq!(features[0].depth_km, 40.0);
    }

    #[test]
    fn test_empty_collection() {
        let features = parse_feed(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(parse_feed("<html>502</html>"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_wrong_root_type() {
        let result = parse_feed(r#"{"type": "Feature", "features": []}"#);
        assert!(matches!(result, Err(FeedError::NotAFeatureCollection(kind)) if kind == "Feature"));
    }

    #[test]
    fn test_missing_magnitude_is_malformed() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"mag": null, "place": "P", "time": 0},
             "geometry": {"type": "Point", "coordinates": [0, 0, 5]}}
        ]}"#;
        match parse_feed(body) {
            Err(FeedError::Malformed { index, reason }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("mag"));
            }
            other => panic!("expected malformed feed, got {other:?}"),
        }
    }

    #[test]
    fn test_two_dimensional_point_is_malformed() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"mag": 3.0, "place": "P", "time": 0},
             "geometry": {"type": "Point", "coordinates": [10, 20]}}
        ]}"#;
        assert!(matches!(parse_feed(body), Err(FeedError::Malformed { .. })));
    }

    #[test]
    fn test_non_point_geometry_is_malformed() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"mag": 3.0, "place": "P", "time": 0},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]}"#;
        assert!(matches!(parse_feed(body), Err(FeedError::Malformed { .. })));
    }
}
