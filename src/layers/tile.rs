use crate::{
    core::{
        constants::TILE_SIZE,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerRole, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// Configuration for a tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    /// Substituted for `{s}`, rotated per tile
    pub subdomains: Vec<String>,
    /// Provider attribution, kept verbatim (HTML)
    pub attribution: String,
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: String::new(),
            tile_size: TILE_SIZE,
            min_zoom: 0,
            max_zoom: 19,
        }
    }
}

/// Where one tile lands in the container, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    /// Top-left corner relative to the container
    pub min: Point,
    /// Edge length after scaling to the view zoom
    pub size: f64,
}

/// A base layer backed by a templated tile server
pub struct TileLayer {
    properties: LayerProperties,
    options: TileLayerOptions,
}

impl TileLayer {
    pub fn with_options(id: String, name: String, options: TileLayerOptions) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Tile, LayerRole::Base),
            options,
        }
    }

    /// OpenStreetMap standard tiles
    pub fn street(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            ..TileLayerOptions::default()
        };
        Self::with_options(id, name, options)
    }

    /// OpenTopoMap relief tiles
    pub fn topographic(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)".to_string(),
            max_zoom: 17,
            ..TileLayerOptions::default()
        };
        Self::with_options(id, name, options)
    }

    /// Esri World Imagery
    pub fn satellite(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
            subdomains: Vec::new(),
            attribution: "&copy; <a href=\"http://www.esri.com/\">Esri</a> i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community".to_string(),
            ..TileLayerOptions::default()
        };
        Self::with_options(id, name, options)
    }

    pub fn options(&self) -> &TileLayerOptions {
        &self.options
    }

    /// Expands the URL template for `coord`
    pub fn tile_url(&self, coord: TileCoord) -> String {
        let subdomain = if self.options.subdomains.is_empty() {
            ""
        } else {
            let idx = ((coord.x as usize) + (coord.y as usize)) % self.options.subdomains.len();
            self.options.subdomains[idx].as_str()
        };

        self.options
            .url_template
            .replace("{s}", subdomain)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", "")
    }

    /// Tile zoom used to draw at `view_zoom`; past `max_zoom` tiles are upscaled
    pub fn tile_zoom(&self, view_zoom: f64) -> u8 {
        let zoom = view_zoom.round().max(0.0).min(f64::from(u8::MAX)) as u8;
        zoom.clamp(self.options.min_zoom, self.options.max_zoom)
    }

    /// Tiles covering the viewport and where to draw them. Columns wrap
    /// around the antimeridian; rows outside the world are skipped.
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TilePlacement> {
        let zoom = self.tile_zoom(viewport.zoom);
        let per_axis = TileCoord::tiles_per_axis(zoom) as i64;
        let scale = 2_f64.powf(viewport.zoom - f64::from(zoom));
        let size = f64::from(self.options.tile_size) * scale;
        if !(size.is_finite() && size > 0.0) {
            return Vec::new();
        }

        let origin = viewport.pixel_origin();
        let min_x = (origin.x / size).floor() as i64;
        let max_x = ((origin.x + viewport.size.x) / size).floor() as i64;
        let min_y = ((origin.y / size).floor() as i64).max(0);
        let max_y = (((origin.y + viewport.size.y) / size).floor() as i64).min(per_axis - 1);

        let mut tiles = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let wrapped = x.rem_euclid(per_axis) as u32;
                tiles.push(TilePlacement {
                    coord: TileCoord::new(wrapped, y as u32, zoom),
                    min: Point::new(x as f64 * size - origin.x, y as f64 * size - origin.y),
                    size,
                });
            }
        }
        tiles
    }

    /// Attribution as display text: tags removed, entities decoded
    pub fn attribution_text(&self) -> String {
        html_to_text(&self.options.attribution)
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(properties);

    fn attribution(&self) -> Option<&str> {
        Some(self.options.attribution.as_str()).filter(|a| !a.is_empty())
    }
}

fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&copy;", "©")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
