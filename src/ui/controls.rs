use crate::layers::base::LayerRole;
use serde::{Deserialize, Serialize};

#[cfg(feature = "egui")]
use crate::layers::manager::LayerManager;
#[cfg(feature = "egui")]
use egui::{Align2, Context, Pos2, Rect, Vec2};

/// Corner of the map a control is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[cfg(feature = "egui")]
impl ControlPosition {
    const MARGIN: f32 = 10.0;

    /// Pivot and anchor point for an `egui::Area` placed inside `map_rect`
    pub fn placement(&self, map_rect: Rect) -> (Align2, Pos2) {
        let m = Self::MARGIN;
        match self {
            ControlPosition::TopLeft => (Align2::LEFT_TOP, map_rect.left_top() + Vec2::new(m, m)),
            ControlPosition::TopRight => (Align2::RIGHT_TOP, map_rect.right_top() + Vec2::new(-m, m)),
            ControlPosition::BottomLeft => {
                (Align2::LEFT_BOTTOM, map_rect.left_bottom() + Vec2::new(m, -m))
            }
            ControlPosition::BottomRight => {
                (Align2::RIGHT_BOTTOM, map_rect.right_bottom() + Vec2::new(-m, -m))
            }
        }
    }
}

/// One selectable row of the layer control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub layer_id: String,
    pub label: String,
}

/// Layer switcher: radio buttons for base layers, checkboxes for overlays
#[derive(Debug, Clone, PartialEq)]
pub struct LayerControl {
    base_layers: Vec<LayerEntry>,
    overlays: Vec<LayerEntry>,
    collapsed: bool,
    position: ControlPosition,
}

impl LayerControl {
    pub fn new(position: ControlPosition) -> Self {
        Self {
            base_layers: Vec::new(),
            overlays: Vec::new(),
            collapsed: true,
            position,
        }
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn add_entry(&mut self, role: LayerRole, layer_id: impl Into<String>, label: impl Into<String>) {
        let entry = LayerEntry {
            layer_id: layer_id.into(),
            label: label.into(),
        };
        match role {
            LayerRole::Base => self.base_layers.push(entry),
            LayerRole::Overlay => self.overlays.push(entry),
        }
    }

    pub fn base_layers(&self) -> &[LayerEntry] {
        &self.base_layers
    }

    pub fn overlays(&self) -> &[LayerEntry] {
        &self.overlays
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn position(&self) -> ControlPosition {
        self.position
    }

    /// Draws the control over `map_rect` and applies the user's choice to
    /// `layers`. Returns true when the selection changed.
    #[cfg(feature = "egui")]
    pub fn show(&self, ctx: &Context, map_rect: Rect, layers: &mut LayerManager) -> bool {
        let (pivot, anchor) = self.position.placement(map_rect);
        let mut changed = false;

        egui::Area::new(egui::Id::new("quakemap_layer_control"))
            .pivot(pivot)
            .fixed_pos(anchor)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if self.collapsed {
                        ui.collapsing("Layers", |ui| changed = self.entries_ui(ui, layers));
                    } else {
                        changed = self.entries_ui(ui, layers);
                    }
                });
            });

        changed
    }

    #[cfg(feature = "egui")]
    fn entries_ui(&self, ui: &mut egui::Ui, layers: &mut LayerManager) -> bool {
        let mut changed = false;
        let active = layers.active_base().map(|l| l.id().to_string());

        for entry in &self.base_layers {
            let selected = active.as_deref() == Some(entry.layer_id.as_str());
            if ui.radio(selected, entry.label.as_str()).clicked() && !selected {
                match layers.set_active_base(&entry.layer_id) {
                    Ok(()) => changed = true,
                    Err(e) => log::warn!("layer control: {e}"),
                }
            }
        }

        if !self.base_layers.is_empty() && !self.overlays.is_empty() {
            ui.separator();
        }

        for entry in &self.overlays {
            let Some(mut visible) = layers.get_layer(&entry.layer_id).map(|l| l.is_visible()) else {
                continue;
            };
            if ui.checkbox(&mut visible, entry.label.as_str()).changed() {
                match layers.set_overlay_visible(&entry.layer_id, visible) {
                    Ok(()) => changed = true,
                    Err(e) => log::warn!("layer control: {e}"),
                }
            }
        }

        changed
    }
}
