//! Layered view
//!
//! The view draws caller-owned items layer by layer. Each layer has a depth;
//! layers are drawn from the deepest to the shallowest, with the GAL layer
//! depth set accordingly so the depth test agrees with the draw order.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use copper_core::{Box2, Gal};

use crate::cache::{CachePolicy, GroupCache};
use crate::item::{LayerId, ViewItem};
use crate::painter::Painter;

/// Layer settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLayer {
    pub id: LayerId,
    /// GAL layer depth; smaller values are drawn on top
    pub depth: f64,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct View {
    layers: Vec<ViewLayer>,
    index: FxHashMap<LayerId, usize>,
    cache: GroupCache,
    visible_area: Option<Box2>,
    /// Layers whose depth changed since their groups were recorded
    stale: SmallVec<[LayerId; 4]>,
}

impl View {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            cache: GroupCache::new(policy),
            ..Self::default()
        }
    }

    /// Add a layer, or move an existing one to a new depth
    ///
    /// Groups bake in the depth they were recorded at, so moving a layer
    /// drops every group cached for it on the next [`View::redraw`] and the
    /// items are recorded again at the new depth.
    pub fn add_layer(&mut self, id: LayerId, depth: f64) {
        match self.index.get(&id) {
            Some(&i) => {
                let layer = &mut self.layers[i];
                if layer.depth != depth {
                    layer.depth = depth;
                    if !self.stale.contains(&id) {
                        self.stale.push(id);
                    }
                }
            }
            None => self.layers.push(ViewLayer {
                id,
                depth,
                visible: true,
            }),
        }
        self.sort_layers();
    }

    /// Remove a layer and delete the groups the items cached for it
    pub fn remove_layer<T: ViewItem>(
        &mut self,
        gal: &mut dyn Gal,
        items: &mut [T],
        id: LayerId,
    ) -> bool {
        let Some(i) = self.index.get(&id).copied() else {
            return false;
        };
        self.layers.remove(i);
        self.sort_layers();
        self.stale.retain(|layer| *layer != id);
        for item in items.iter_mut() {
            self.cache.release_layer(gal, item, id);
        }
        true
    }

    pub fn layer(&self, id: LayerId) -> Option<&ViewLayer> {
        self.index.get(&id).map(|&i| &self.layers[i])
    }

    /// Layers in drawing order
    pub fn layers(&self) -> &[ViewLayer] {
        &self.layers
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) {
        match self.index.get(&id) {
            Some(&i) => self.layers[i].visible = visible,
            None => tracing::warn!("set_layer_visible() on unknown layer {:?}", id),
        }
    }

    pub fn is_layer_visible(&self, id: LayerId) -> bool {
        self.layer(id).is_some_and(|layer| layer.visible)
    }

    /// Restrict drawing to items whose bounding box meets `area` (world units)
    pub fn set_visible_area(&mut self, area: Option<Box2>) {
        self.visible_area = area;
    }

    pub fn visible_area(&self) -> Option<Box2> {
        self.visible_area
    }

    pub fn cache(&self) -> &GroupCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut GroupCache {
        &mut self.cache
    }

    fn sort_layers(&mut self) {
        self.layers
            .sort_by(|a, b| b.depth.total_cmp(&a.depth).then(a.id.cmp(&b.id)));
        self.index = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (layer.id, i))
            .collect();
    }

    /// Apply pending item updates; returns true if any item asked for an
    /// immediate redraw
    pub fn update<T: ViewItem>(&mut self, gal: &mut dyn Gal, items: &mut [T]) -> bool {
        let mut force = false;
        for item in items.iter_mut() {
            force |= self.cache.process_updates(gal, item);
        }

        for layer in std::mem::take(&mut self.stale) {
            tracing::debug!("layer {:?} moved, dropping its cached groups", layer);
            for item in items.iter_mut() {
                self.cache.release_layer(gal, item, layer);
            }
        }
        force
    }

    /// Draw all visible items on all visible layers
    ///
    /// Must be called between [`Gal::begin_drawing`] and [`Gal::end_drawing`].
    pub fn redraw<T: ViewItem>(
        &mut self,
        gal: &mut dyn Gal,
        painter: &mut dyn Painter,
        items: &mut [T],
    ) {
        self.update(gal, items);

        for layer in &self.layers {
            if !layer.visible {
                continue;
            }

            gal.set_layer_depth(layer.depth);
            for item in items.iter_mut() {
                if !item.view_is_visible() || !item.view_layers().contains(&layer.id) {
                    continue;
                }
                if let Some(area) = &self.visible_area {
                    if !area.intersects(&item.view_bbox()) {
                        continue;
                    }
                }
                self.cache.draw_item(gal, painter, item, layer.id);
            }
        }

        for item in items.iter_mut() {
            item.base_mut().set_draw_immediate(false);
        }
    }

    /// Drop the cached groups of every item, e.g. after a settings change
    pub fn invalidate_all<T: ViewItem>(&mut self, gal: &mut dyn Gal, items: &mut [T]) {
        for item in items.iter_mut() {
            self.cache.invalidate(gal, item);
        }
    }

    /// Release every item before the items or the GAL go away
    pub fn release_all<T: ViewItem>(&mut self, gal: &mut dyn Gal, items: &mut [T]) {
        for item in items.iter_mut() {
            self.cache.release(gal, item);
        }
    }
}
