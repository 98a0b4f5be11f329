use crate::{
    style::{
        color::Color,
        depth::{ColorBucket, DEPTH_BUCKETS},
    },
    ui::controls::ControlPosition,
};

#[cfg(feature = "egui")]
use egui::{Context, Rect, Stroke, Vec2};

/// A swatch and its label
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub label: String,
    pub color: Color,
}

/// Static key explaining marker colors
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    rows: Vec<LegendRow>,
    position: ControlPosition,
}

impl Legend {
    pub const SWATCH_SIZE: f32 = 20.0;
    pub const SWATCH_SPACING: f32 = 8.0;

    /// One row per depth bucket, shallow first, in the bottom-right corner
    pub fn depth() -> Self {
        Self::from_buckets(&DEPTH_BUCKETS)
    }

    pub fn from_buckets(buckets: &[ColorBucket]) -> Self {
        let rows = buckets
            .iter()
            .map(|bucket| LegendRow {
                label: bucket.label(),
                color: bucket.color,
            })
            .collect();
        Self {
            rows,
            position: ControlPosition::BottomRight,
        }
    }

    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    pub fn rows(&self) -> &[LegendRow] {
        &self.rows
    }

    pub fn position(&self) -> ControlPosition {
        self.position
    }

    #[cfg(feature = "egui")]
    pub fn show(&self, ctx: &Context, map_rect: Rect) {
        let (pivot, anchor) = self.position.placement(map_rect);

        egui::Area::new(egui::Id::new("quakemap_legend"))
            .pivot(pivot)
            .fixed_pos(anchor)
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for row in &self.rows {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = Self::SWATCH_SPACING;
                            let (swatch, _) = ui.allocate_exact_size(
                                Vec2::splat(Self::SWATCH_SIZE),
                                egui::Sense::hover(),
                            );
                            ui.painter().rect(swatch, 0.0, row.color, Stroke::NONE);
                            ui.label(row.label.as_str());
                        });
                    }
                });
            });
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_legend_rows() {
        let legend = Legend::depth();
        let labels: Vec<&str> = legend.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["-10-10", "10-30", "30-50", "50-70", "70-90", "90+"]);

        let colors: Vec<String> = legend.rows().iter().map(|r| r.color.to_hex()).collect();
        assert_eq!(
            colors,
            ["#A8DADC", "#4C9F70", "#2D6A4F", "#F4A261", "#F26C4F", "#9B1C31"]
        );
        assert_eq!(legend.position(), ControlPosition::BottomRight);
    }

    #[test]
    fn test_legend_position_override() {
        let legend = Legend::depth().with_position(ControlPosition::BottomLeft);
        assert_eq!(legend.position(), ControlPosition::BottomLeft);
        assert_eq!(legend.rows().len(), 6);
    }
}
