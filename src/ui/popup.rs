use crate::{core::geo::LatLng, data::geojson::EarthquakeFeature};
use chrono::{Local, TimeZone, Utc};
use std::fmt::Display;

#[cfg(feature = "egui")]
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

/// Line separating the popup title from its body
pub const POPUP_SEPARATOR: char = '\n';

/// `strftime` pattern for the popup's timestamp line
pub const TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// Shown when an origin time cannot be represented
pub const INVALID_DATE: &str = "Invalid Date";

/// Popup text for an earthquake: the place, then the origin time in the
/// machine's local timezone
pub fn popup_for(feature: &EarthquakeFeature) -> String {
    popup_for_in(feature, &Local)
}

/// Same as [`popup_for`] with an explicit timezone
pub fn popup_for_in<Tz>(feature: &EarthquakeFeature, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}{}{}",
        feature.place,
        POPUP_SEPARATOR,
        format_time_millis(feature.time_millis, tz)
    )
}

/// Renders epoch milliseconds, or `Invalid Date` when out of range
pub fn format_time_millis<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match Utc.timestamp_millis_opt(millis).single() {
        Some(utc) => utc.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

#[cfg(feature = "egui")]
#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub title_font: FontId,
    pub body_font: FontId,
    pub text_color: Color32,
    /// Gap between the popup's tip and the marker center
    pub offset: f32,
}

#[cfg(feature = "egui")]
impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            title_font: FontId::proportional(15.0),
            body_font: FontId::proportional(12.0),
            text_color: Color32::BLACK,
            offset: 10.0,
        }
    }
}

/// An open popup anchored to a map position
#[derive(Debug, Clone)]
pub struct Popup {
    pub position: LatLng,
    pub content: String,
    #[cfg(feature = "egui")]
    pub style: PopupStyle,
}

impl Popup {
    pub fn new(position: LatLng, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            #[cfg(feature = "egui")]
            style: PopupStyle::default(),
        }
    }

    /// Text before the first separator
    pub fn title(&self) -> &str {
        self.content
            .split_once(POPUP_SEPARATOR)
            .map_or(self.content.as_str(), |(title, _)| title)
    }

    /// Text after the first separator, if any
    pub fn body(&self) -> Option<&str> {
        self.content.split_once(POPUP_SEPARATOR).map(|(_, body)| body)
    }

    /// Paints the popup centered above `anchor` and returns its rect
    #[cfg(feature = "egui")]
    pub fn paint(&self, painter: &Painter, anchor: Pos2) -> Rect {
        let style = &self.style;
        let measure = |text: &str, font: &FontId| {
            painter
                .fonts(|f| f.layout_no_wrap(text.to_string(), font.clone(), style.text_color))
                .size()
        };

        let title_size = measure(self.title(), &style.title_font);
        let body_size = self
            .body()
            .map(|body| measure(body, &style.body_font))
            .unwrap_or(Vec2::ZERO);
        let rule_gap = if self.body().is_some() { style.padding } else { 0.0 };

        let content_size = Vec2::new(
            title_size.x.max(body_size.x),
            title_size.y + rule_gap + body_size.y,
        );
        let popup_size = content_size + Vec2::splat(style.padding * 2.0);
        let popup_rect = Rect::from_min_size(
            Pos2::new(
                anchor.x - popup_size.x / 2.0,
                anchor.y - style.offset - popup_size.y,
            ),
            popup_size,
        );

        painter.rect_filled(popup_rect, style.rounding, style.background_color);
        painter.rect_stroke(
            popup_rect,
            style.rounding,
            Stroke::new(style.border_width, style.border_color),
        );

        let tip = [
            Pos2::new(anchor.x - style.offset / 2.0, popup_rect.bottom()),
            Pos2::new(anchor.x + style.offset / 2.0, popup_rect.bottom()),
            Pos2::new(anchor.x, anchor.y - 1.0),
        ];
        painter.add(egui::Shape::convex_polygon(
            tip.to_vec(),
            style.background_color,
            Stroke::NONE,
        ));

        let inner = popup_rect.shrink(style.padding);
        painter.text(
            inner.min,
            Align2::LEFT_TOP,
            self.title(),
            style.title_font.clone(),
            style.text_color,
        );

        if let Some(body) = self.body() {
            let rule_y = inner.min.y + title_size.y + rule_gap / 2.0;
            painter.hline(
                inner.x_range(),
                rule_y,
                Stroke::new(style.border_width, style.border_color),
            );
            painter.text(
                Pos2::new(inner.min.x, inner.min.y + title_size.y + rule_gap),
                Align2::LEFT_TOP,
                body,
                style.body_font.clone(),
                style.text_color,
            );
        }

        popup_rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn quake(place: &str, time_millis: i64) -> EarthquakeFeature {
        EarthquakeFeature::new(4.5, -122.0, 37.0, 8.0, place, time_millis)
    }

    #[test]
    fn test_popup_text_in_utc() {
        let text = popup_for_in(&quake("10km N of X", 0), &Utc);
        assert_eq!(text, "10km N of X\nThu Jan 01 1970 00:00:00 GMT+0000");
    }

    #[test]
    fn test_popup_text_in_offset_zone() {
        let tz = FixedOffset::west_opt(8 * 3600).unwrap();
        let text = popup_for_in(&quake("Near Coast", 0), &tz);
        assert!(text.ends_with("Wed Dec 31 1969 16:00:00 GMT-0800"));
    }

    #[test]
    fn test_popup_text_local_zone() {
        let text = popup_for(&quake("10km N of X", 0));
        assert!(text.starts_with("10km N of X\n"));
        assert!(text.contains("Jan 01 1970") || text.contains("Dec 31 1969"));
    }

    #[test]
    fn test_out_of_range_time() {
        let text = popup_for_in(&quake("Far Future", i64::MAX), &Utc);
        assert_eq!(text, "Far Future\nInvalid Date");
    }

    #[test]
    fn test_title_and_body() {
        let popup = Popup::new(LatLng::new(37.0, -122.0), popup_for_in(&quake("Here", 0), &Utc));
        assert_eq!(popup.title(), "Here");
        assert_eq!(popup.body(), Some("Thu Jan 01 1970 00:00:00 GMT+0000"));

        let bare = Popup::new(LatLng::new(0.0, 0.0), "Just a title");
        assert_eq!(bare.title(), "Just a title");
        assert_eq!(bare.body(), None);
    }
}
