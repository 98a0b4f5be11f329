//! Application configuration
//!
//! Defaults come from [`crate::core::constants`]. A JSON file can replace
//! any subset of them, and `QUAKEMAP_*` environment variables win over both.

use crate::{
    core::{
        constants::{
            DEFAULT_CENTER, DEFAULT_FEED_URL, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM,
            USER_AGENT,
        },
        geo::LatLng,
    },
    ui::controls::ControlPosition,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

pub const ENV_FEED_URL: &str = "QUAKEMAP_FEED_URL";
pub const ENV_CENTER_LAT: &str = "QUAKEMAP_CENTER_LAT";
pub const ENV_CENTER_LNG: &str = "QUAKEMAP_CENTER_LNG";
pub const ENV_ZOOM: &str = "QUAKEMAP_ZOOM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuakeMapConfig {
    /// GeoJSON FeatureCollection to fetch once at startup
    pub feed_url: String,
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// No timeout unless set; a hung request leaves the map in its loading state
    pub request_timeout_secs: Option<u64>,
    pub layer_control_collapsed: bool,
    pub legend_position: ControlPosition,
    pub user_agent: String,
}

impl Default for QuakeMapConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            request_timeout_secs: None,
            layer_control_collapsed: false,
            legend_position: ControlPosition::BottomRight,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl QuakeMapConfig {
    /// Reads a JSON config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        log::debug!("loaded config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Applies `QUAKEMAP_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = url;
        }
        if let Some(lat) = lookup(ENV_CENTER_LAT) {
            self.center.lat = parse_number(ENV_CENTER_LAT, &lat)?;
        }
        if let Some(lng) = lookup(ENV_CENTER_LNG) {
            self.center.lng = parse_number(ENV_CENTER_LNG, &lng)?;
        }
        if let Some(zoom) = lookup(ENV_ZOOM) {
            self.zoom = parse_number(ENV_ZOOM, &zoom)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            return Err(MapError::Config("feed_url must not be empty".to_string()));
        }
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center ({}, {}) is out of range",
                self.center.lat, self.center.lng
            )));
        }
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite())
            || self.min_zoom > self.max_zoom
        {
            return Err(MapError::Config(format!(
                "invalid zoom limits {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !self.zoom.is_finite() {
            return Err(MapError::Config("zoom must be finite".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| MapError::Config(format!("{key}: expected a number, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = QuakeMapConfig::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.center, LatLng::new(39.8283, -98.5795));
        assert_eq!(config.zoom, 5.0);
        assert!(!config.layer_control_collapsed);
        assert_eq!(config.legend_position, ControlPosition::BottomRight);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: QuakeMapConfig =
            serde_json::from_str(r#"{"feed_url": "http://localhost/feed.json", "zoom": 3}"#)
                .unwrap();
        assert_eq!(config.feed_url, "http://localhost/feed.json");
        assert_eq!(config.zoom, 3.0);
        assert_eq!(config.center, LatLng::new(39.8283, -98.5795));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_FEED_URL, "http://example.test/all_day.geojson"),
            (ENV_CENTER_LAT, "35.5"),
            (ENV_ZOOM, " 4 "),
        ]
        .into_iter()
        .collect();

        let config = QuakeMapConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.feed_url, "http://example.test/all_day.geojson");
        assert_eq!(config.center.lat, 35.5);
        assert_eq!(config.center.lng, -98.5795);
        assert_eq!(config.zoom, 4.0);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let result = QuakeMapConfig::default().with_overrides(|key| {
            (key == ENV_CENTER_LNG).then(|| "west".to_string())
        });
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = QuakeMapConfig::default();
        config.center = LatLng::new(120.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(MapError::InvalidCoordinates(_))
        ));

        let mut config = QuakeMapConfig::default();
        config.min_zoom = 10.0;
        config.max_zoom = 2.0;
        assert!(config.validate().is_err());

        let mut config = QuakeMapConfig::default();
        config.feed_url = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
