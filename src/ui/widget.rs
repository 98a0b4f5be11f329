use crate::{
    core::{
        constants::TILE_CACHE_CAPACITY,
        geo::Point,
        map::Map,
    },
    layers::{
        base::{LayerRole, LayerTrait},
        overlay::GeoJsonLayer,
        tile::TileLayer,
    },
    tiles::{
        cache::{TileCache, TileKey},
        loader::{TileLoader, TileLoaderConfig},
    },
    ui::popup::Popup,
};
use egui::{
    Align2, Color32, ColorImage, FontId, Painter, Pos2, Rect, Response, Sense, Stroke,
    TextureHandle, TextureOptions, Ui, Vec2,
};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MapWidgetConfig {
    pub background_color: Color32,
    /// Drawn where a tile has not arrived yet
    pub placeholder_color: Color32,
    pub zoom_button_size: f32,
    /// Poll interval while tiles are downloading
    pub repaint_interval: Duration,
}

impl Default for MapWidgetConfig {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(0xDD, 0xDD, 0xDD),
            placeholder_color: Color32::from_rgb(0xE8, 0xE8, 0xE8),
            zoom_button_size: 30.0,
            repaint_interval: Duration::from_millis(50),
        }
    }
}

/// Interactive egui view of a [`Map`]: tiles of the active base layer,
/// earthquake markers, popups, the layer control and the legend
pub struct MapWidget {
    map: Map,
    loader: Option<TileLoader>,
    textures: TileCache<TextureHandle>,
    open_popup: Option<Popup>,
    config: MapWidgetConfig,
}

impl MapWidget {
    /// Downloads tiles on the ambient tokio runtime. Without one the map
    /// still draws markers over blank tiles.
    pub fn new(map: Map) -> Self {
        let loader = match TileLoader::new(TileLoaderConfig::default()) {
            Ok(loader) => Some(loader),
            Err(e) => {
                log::warn!("tile loading disabled: {e}");
                None
            }
        };
        Self::with_loader(map, loader)
    }

    pub fn with_loader(map: Map, loader: Option<TileLoader>) -> Self {
        Self {
            map,
            loader,
            textures: TileCache::new(TILE_CACHE_CAPACITY),
            open_popup: None,
            config: MapWidgetConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MapWidgetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn open_popup(&self) -> Option<&Popup> {
        self.open_popup.as_ref()
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let (rect, mut response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.map
            .viewport
            .set_size(Point::new(f64::from(rect.width()), f64::from(rect.height())));

        let buttons_clicked = self.zoom_controls(ui, rect);
        if self.handle_input(ui, rect, &response, buttons_clicked) {
            response.mark_changed();
        }

        self.upload_tiles(ui.ctx());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.config.background_color);
        self.paint_tiles(&painter, rect);
        self.paint_markers(&painter, rect);
        self.paint_popup(&painter, rect);
        self.paint_zoom_controls(&painter, rect);
        self.paint_attribution(&painter, rect);

        if self.map.layer_control.show(ui.ctx(), rect, &mut self.map.layers) {
            self.close_hidden_popup();
            response.mark_changed();
        }
        self.map.legend.show(ui.ctx(), rect);

        if self.loader.as_ref().is_some_and(|l| l.pending() > 0) {
            ui.ctx().request_repaint_after(self.config.repaint_interval);
        }

        response
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response, buttons_clicked: bool) -> bool {
        let options = self.map.options().clone();
        let mut changed = false;

        if options.dragging && response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.map
                    .viewport
                    .pan(Point::new(f64::from(delta.x), f64::from(delta.y)));
                changed = true;
            }
        }

        if options.scroll_wheel_zoom && response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let focus = response.hover_pos().map(|pos| to_container(pos, rect));
                let step = if scroll > 0.0 { options.zoom_delta } else { -options.zoom_delta };
                self.map.zoom_by(step, focus);
                changed = true;
            }
        }

        if options.double_click_zoom && response.double_clicked() && !buttons_clicked {
            let focus = response.interact_pointer_pos().map(|pos| to_container(pos, rect));
            self.map.zoom_by(options.zoom_delta, focus);
            changed = true;
        } else if response.clicked() && !buttons_clicked {
            // Clicking empty map closes the open popup
            self.open_popup = response
                .interact_pointer_pos()
                .and_then(|pos| self.marker_popup_at(to_container(pos, rect)));
            changed = true;
        }

        changed
    }

    /// Popup of the topmost marker under `point`
    fn marker_popup_at(&self, point: Point) -> Option<Popup> {
        let overlays: Vec<&GeoJsonLayer> = self.visible_overlays().collect();
        overlays.into_iter().rev().find_map(|layer| {
            layer.markers().iter().rev().find_map(|marker| {
                let center = self.map.viewport.lat_lng_to_pixel(&marker.position);
                if !marker.hit_test(&center, &point) {
                    return None;
                }
                marker
                    .popup
                    .as_ref()
                    .map(|text| Popup::new(marker.position, text.clone()))
            })
        })
    }

    /// Closes the popup once no visible overlay has a marker at its anchor
    fn close_hidden_popup(&mut self) {
        let Some(popup) = &self.open_popup else {
            return;
        };
        let shown = self
            .visible_overlays()
            .any(|layer| layer.markers().iter().any(|m| m.position == popup.position));
        if !shown {
            self.close_popup();
        }
    }

    fn visible_overlays(&self) -> impl Iterator<Item = &GeoJsonLayer> + '_ {
        self.map
            .layers
            .layers_with_role(LayerRole::Overlay)
            .filter(|layer| layer.is_visible())
            .filter_map(|layer| layer.as_any().downcast_ref::<GeoJsonLayer>())
    }

    fn upload_tiles(&mut self, ctx: &egui::Context) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        for (key, bytes) in loader.drain() {
            match decode_tile(&bytes) {
                Some(image) => {
                    let name = format!(
                        "tile_{}_{}_{}_{}",
                        key.layer_id, key.coord.z, key.coord.x, key.coord.y
                    );
                    let texture = ctx.load_texture(name, image, TextureOptions::LINEAR);
                    self.textures.insert(key, texture);
                }
                None => {
                    log::warn!("could not decode tile {:?} of {}", key.coord, key.layer_id);
                    loader.mark_failed(key);
                }
            }
        }
    }

    fn paint_tiles(&mut self, painter: &Painter, rect: Rect) {
        let Some(layer) = self
            .map
            .layers
            .active_base()
            .and_then(|l| l.as_any().downcast_ref::<TileLayer>())
        else {
            return;
        };

        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        let tint = Color32::WHITE.gamma_multiply(layer.opacity());
        for placement in layer.visible_tiles(&self.map.viewport) {
            let tile_rect = Rect::from_min_size(
                rect.min + Vec2::new(placement.min.x as f32, placement.min.y as f32),
                Vec2::splat(placement.size as f32),
            );
            let key = TileKey::new(layer.id(), placement.coord);

            match self.textures.get(&key) {
                Some(texture) => {
                    painter.image(texture.id(), tile_rect, uv, tint);
                }
                None => {
                    painter.rect_filled(tile_rect, 0.0, self.config.placeholder_color);
                    if let Some(loader) = self.loader.as_mut() {
                        let url = layer.tile_url(placement.coord);
                        loader.request(key, url);
                    }
                }
            }
        }
    }

    fn paint_markers(&self, painter: &Painter, rect: Rect) {
        for layer in self.visible_overlays() {
            let layer_opacity = layer.opacity();
            for marker in layer.markers() {
                if marker.radius <= 0.0 {
                    continue;
                }
                let center = to_screen(self.map.viewport.lat_lng_to_pixel(&marker.position), rect);
                let radius = marker.radius as f32;
                if !rect.expand(radius).contains(center) {
                    continue;
                }
                painter.circle(
                    center,
                    radius,
                    marker.fill_color.to_color32(marker.fill_opacity * layer_opacity),
                    Stroke::new(
                        marker.weight,
                        marker.stroke_color.to_color32(marker.opacity * layer_opacity),
                    ),
                );
            }
        }
    }

    fn paint_popup(&self, painter: &Painter, rect: Rect) {
        if let Some(popup) = &self.open_popup {
            let anchor = to_screen(self.map.viewport.lat_lng_to_pixel(&popup.position), rect);
            popup.paint(painter, anchor);
        }
    }

    fn zoom_button_rects(&self, rect: Rect) -> (Rect, Rect) {
        let size = self.config.zoom_button_size;
        let zoom_in = Rect::from_min_size(rect.left_top() + Vec2::new(10.0, 10.0), Vec2::splat(size));
        let zoom_out = Rect::from_min_size(
            rect.left_top() + Vec2::new(10.0, 10.0 + size),
            Vec2::splat(size),
        );
        (zoom_in, zoom_out)
    }

    /// Handles the +/- buttons; true when either was clicked this frame
    fn zoom_controls(&mut self, ui: &Ui, rect: Rect) -> bool {
        if !self.map.options().zoom_control {
            return false;
        }
        let (zoom_in_rect, zoom_out_rect) = self.zoom_button_rects(rect);
        let zoom_in = ui.interact(zoom_in_rect, ui.id().with("zoom_in"), Sense::click());
        let zoom_out = ui.interact(zoom_out_rect, ui.id().with("zoom_out"), Sense::click());
        let delta = self.map.options().zoom_delta;

        if zoom_in.clicked() {
            self.map.zoom_by(delta, None);
        }
        if zoom_out.clicked() {
            self.map.zoom_by(-delta, None);
        }

        let pointer_over = ui
            .input(|i| i.pointer.interact_pos())
            .is_some_and(|pos| zoom_in_rect.contains(pos) || zoom_out_rect.contains(pos));
        zoom_in.clicked() || zoom_out.clicked() || pointer_over
    }

    fn paint_zoom_controls(&self, painter: &Painter, rect: Rect) {
        if !self.map.options().zoom_control {
            return;
        }
        let (zoom_in_rect, zoom_out_rect) = self.zoom_button_rects(rect);
        for (button, label) in [(zoom_in_rect, "+"), (zoom_out_rect, "−")] {
            painter.rect_filled(button, 3.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
            painter.rect_stroke(button, 3.0, Stroke::new(1.0, Color32::from_gray(100)));
            painter.text(
                button.center(),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(16.0),
                Color32::BLACK,
            );
        }
    }

    fn paint_attribution(&self, painter: &Painter, rect: Rect) {
        if !self.map.options().attribution_control {
            return;
        }
        let Some(text) = self
            .map
            .layers
            .active_base()
            .and_then(|l| l.as_any().downcast_ref::<TileLayer>())
            .map(|l| l.attribution_text())
            .filter(|t| !t.is_empty())
        else {
            return;
        };

        let font = FontId::proportional(10.0);
        let size = painter
            .fonts(|f| f.layout_no_wrap(text.clone(), font.clone(), Color32::BLACK))
            .size();
        let strip = Rect::from_min_size(
            rect.left_bottom() - Vec2::new(0.0, size.y + 4.0),
            size + Vec2::new(8.0, 4.0),
        );
        painter.rect_filled(strip, 0.0, Color32::from_rgba_unmultiplied(255, 255, 255, 200));
        painter.text(
            strip.left_center() + Vec2::new(4.0, 0.0),
            Align2::LEFT_CENTER,
            text,
            font,
            Color32::from_gray(60),
        );
    }
}

fn to_container(pos: Pos2, rect: Rect) -> Point {
    Point::new(f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y))
}

fn to_screen(point: Point, rect: Rect) -> Pos2 {
    rect.min + Vec2::new(point.x as f32, point.y as f32)
}

fn decode_tile(bytes: &[u8]) -> Option<ColorImage> {
    let rgba = image::load_from_memory(bytes).ok()?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub trait MapWidgetExt {
    fn quake_map(&mut self, widget: &mut MapWidget) -> Response;
}

impl MapWidgetExt for Ui {
    fn quake_map(&mut self, widget: &mut MapWidget) -> Response {
        widget.show(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::QuakeMapConfig, map::build_map},
        data::geojson::EarthquakeFeature,
    };

    #[test]
    fn test_coordinate_helpers() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(100.0, 100.0));
        let point = to_container(Pos2::new(60.0, 70.0), rect);
        assert_eq!(point, Point::new(50.0, 50.0));
        assert_eq!(to_screen(point, rect), Pos2::new(60.0, 70.0));
    }

    #[test]
    fn test_decode_tile() {
        let mut png = Vec::new();
        let tile = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(tile)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let decoded = decode_tile(&png).unwrap();
        assert_eq!(decoded.size, [4, 2]);
        assert_eq!(decoded.pixels[0], Color32::from_rgb(255, 0, 0));
        assert!(decode_tile(b"not an image").is_none());
    }

    #[test]
    fn test_marker_popup_hit_test() {
        let quake = EarthquakeFeature::new(5.0, -98.5795, 39.8283, 12.0, "Kansas", 0);
        let map = build_map(&[quake], &QuakeMapConfig::default()).unwrap();
        let mut widget = MapWidget::with_loader(map, None);
        widget
            .map_mut()
            .viewport_mut()
            .set_size(Point::new(800.0, 600.0));

        let popup = widget.marker_popup_at(Point::new(405.0, 300.0)).unwrap();
        assert_eq!(popup.title(), "Kansas");
        assert!(widget.marker_popup_at(Point::new(450.0, 300.0)).is_none());

        widget
            .map_mut()
            .set_overlay_visible(crate::core::map::EARTHQUAKE_LAYER_ID, false)
            .unwrap();
        assert!(widget.marker_popup_at(Point::new(405.0, 300.0)).is_none());
    }

    #[test]
    fn test_hiding_overlay_closes_its_popup() {
        let quake = EarthquakeFeature::new(5.0, -98.5795, 39.8283, 12.0, "Kansas", 0);
        let map = build_map(&[quake], &QuakeMapConfig::default()).unwrap();
        let mut widget = MapWidget::with_loader(map, None);
        widget
            .map_mut()
            .viewport_mut()
            .set_size(Point::new(800.0, 600.0));
        widget.open_popup = widget.marker_popup_at(Point::new(400.0, 300.0));

        // Switching base layers keeps the overlay and its popup
        widget
            .map_mut()
            .set_active_base(crate::core::map::TOPO_LAYER_ID)
            .unwrap();
        widget.close_hidden_popup();
        assert_eq!(widget.open_popup().map(|p| p.title()), Some("Kansas"));

        widget
            .map_mut()
            .set_overlay_visible(crate::core::map::EARTHQUAKE_LAYER_ID, false)
            .unwrap();
        widget.close_hidden_popup();
        assert!(widget.open_popup().is_none());
    }
}
