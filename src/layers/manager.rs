use crate::{
    layers::base::{LayerRole, LayerTrait},
    MapError, Result,
};

use crate::prelude::HashMap;

/// Owns the map's layers, keeps them in draw order, and enforces that at
/// most one base layer is visible
pub struct LayerManager {
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Layer IDs sorted by z-index, insertion order within one z-index
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer; IDs must be unique
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("duplicate layer id {layer_id:?}")));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        let insert_pos = self
            .render_order
            .iter()
            .position(|id| self.layers.get(id).is_some_and(|l| l.z_index() > z_index))
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Typed access to a layer
    pub fn get<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)?.as_any().downcast_ref::<T>()
    }

    /// Layers in draw order
    pub fn layers(&self) -> impl Iterator<Item = &dyn LayerTrait> + '_ {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
    }

    pub fn layers_with_role(&self, role: LayerRole) -> impl Iterator<Item = &dyn LayerTrait> + '_ {
        self.layers().filter(move |l| l.role() == role)
    }

    /// The visible base layer, if any
    pub fn active_base(&self) -> Option<&dyn LayerTrait> {
        self.layers_with_role(LayerRole::Base).find(|l| l.is_visible())
    }

    /// Shows `layer_id` and hides every other base layer
    pub fn set_active_base(&mut self, layer_id: &str) -> Result<()> {
        match self.layers.get(layer_id).map(|l| l.role()) {
            Some(LayerRole::Base) => {}
            Some(LayerRole::Overlay) => {
                return Err(MapError::Layer(format!("{layer_id:?} is an overlay")))
            }
            None => return Err(MapError::Layer(format!("unknown layer {layer_id:?}"))),
        }

        for (id, layer) in self.layers.iter_mut() {
            if layer.role() == LayerRole::Base {
                layer.set_visible(id == layer_id);
            }
        }
        log::debug!("base layer switched to {layer_id}");
        Ok(())
    }

    /// Shows or hides an overlay without touching anything else
    pub fn set_overlay_visible(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        let layer = self
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| MapError::Layer(format!("unknown layer {layer_id:?}")))?;
        if layer.role() != LayerRole::Overlay {
            return Err(MapError::Layer(format!("{layer_id:?} is a base layer")));
        }
        layer.set_visible(visible);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
