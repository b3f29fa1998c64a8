//! Scene items
//!
//! A [`ViewItem`] is anything the view can draw: it reports its bounding box
//! and the layers it occupies, and carries a [`ViewItemBase`] holding its
//! visibility, pending updates and cached groups. Items are never owned by
//! the view.

use std::any::Any;

use bitflags::bitflags;
use smallvec::SmallVec;

use copper_core::{Box2, Gal, GroupId};

/// Identifier of a drawing layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub i32);

bitflags! {
    /// How severely an item changed
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct UpdateFlags: u32 {
        /// Colors or visibility only; the layer set is unchanged
        const APPEARANCE = 0x1;
        /// Shape or layer set changed
        const GEOMETRY = 0x2;
        const ALL = 0xff;
    }
}

/// Cached group of an item, per layer
///
/// Items occupy few layers, so the pairs are kept inline in layer order of
/// insertion and searched linearly.
#[derive(Clone, Debug, Default)]
pub struct ItemGroups {
    pairs: SmallVec<[(LayerId, GroupId); 4]>,
}

impl ItemGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group recorded for `layer`, if any
    pub fn get(&self, layer: LayerId) -> Option<GroupId> {
        self.pairs
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|(_, group)| *group)
    }

    /// Store the group for `layer`, returning the handle it replaces
    pub fn set(&mut self, layer: LayerId, group: GroupId) -> Option<GroupId> {
        match self.pairs.iter_mut().find(|(l, _)| *l == layer) {
            Some(pair) => Some(std::mem::replace(&mut pair.1, group)),
            None => {
                self.pairs.push((layer, group));
                None
            }
        }
    }

    /// Forget the group of one layer, returning it so the caller can delete it
    pub fn remove(&mut self, layer: LayerId) -> Option<GroupId> {
        let i = self.pairs.iter().position(|(l, _)| *l == layer)?;
        Some(self.pairs.remove(i).1)
    }

    /// Every stored group, in insertion order
    pub fn all(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.pairs.iter().map(|(_, group)| *group)
    }

    /// Forget all groups, returning them so the caller can delete them
    pub fn clear(&mut self) -> SmallVec<[GroupId; 4]> {
        self.pairs.drain(..).map(|(_, group)| group).collect()
    }

    /// Whether at least one layer is cached
    pub fn is_cached(&self) -> bool {
        !self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// View bookkeeping embedded in every item
#[derive(Clone, Debug)]
pub struct ViewItemBase {
    visible: bool,
    pending: UpdateFlags,
    force_redraw: bool,
    draw_immediate: bool,
    groups: ItemGroups,
}

impl Default for ViewItemBase {
    fn default() -> Self {
        Self {
            visible: true,
            pending: UpdateFlags::empty(),
            force_redraw: false,
            draw_immediate: false,
            groups: ItemGroups::default(),
        }
    }
}

impl ViewItemBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true when the visibility changed
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    pub fn groups(&self) -> &ItemGroups {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut ItemGroups {
        &mut self.groups
    }

    /// Updates not yet processed by the view
    pub fn pending_update(&self) -> UpdateFlags {
        self.pending
    }

    pub fn request_update(&mut self, flags: UpdateFlags, force_immediate_redraw: bool) {
        self.pending |= flags;
        self.force_redraw |= force_immediate_redraw;
    }

    /// Clear pending updates; returns (flags, force_immediate_redraw)
    pub fn take_update(&mut self) -> (UpdateFlags, bool) {
        let taken = (self.pending, self.force_redraw);
        self.pending = UpdateFlags::empty();
        self.force_redraw = false;
        taken
    }

    /// Whether the item must be drawn without recording until the next frame
    pub fn draws_immediate(&self) -> bool {
        self.draw_immediate
    }

    pub fn set_draw_immediate(&mut self, immediate: bool) {
        self.draw_immediate = immediate;
    }
}

/// An object the view can draw
pub trait ViewItem: Any {
    /// Bounding box over all layers, in world units
    fn view_bbox(&self) -> Box2;

    /// Layers the item is painted on
    fn view_layers(&self) -> SmallVec<[LayerId; 4]>;

    fn base(&self) -> &ViewItemBase;

    fn base_mut(&mut self) -> &mut ViewItemBase;

    fn as_any(&self) -> &dyn Any;

    /// Draw without a painter; used when no painter recognises the item
    fn view_draw(&self, _layer: LayerId, _gal: &mut dyn Gal) {}

    fn view_is_visible(&self) -> bool {
        self.base().is_visible()
    }

    fn view_set_visible(&mut self, visible: bool) {
        if self.base_mut().set_visible(visible) {
            self.view_update(UpdateFlags::APPEARANCE, false);
        }
    }

    /// Tell the view the item's graphical representation changed
    fn view_update(&mut self, flags: UpdateFlags, force_immediate_redraw: bool) {
        self.base_mut().request_update(flags, force_immediate_redraw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_core::GroupStore;

    fn ids(n: usize) -> Vec<GroupId> {
        let mut store = GroupStore::new();
        (0..n).map(|i| store.insert(i)).collect()
    }

    #[test]
    fn test_item_groups_set_replaces() {
        let g = ids(3);
        let mut groups = ItemGroups::new();

        assert_eq!(groups.set(LayerId(1), g[0]), None);
        assert_eq!(groups.set(LayerId(2), g[1]), None);
        assert_eq!(groups.set(LayerId(1), g[2]), Some(g[0]));

        assert_eq!(groups.get(LayerId(1)), Some(g[2]));
        assert_eq!(groups.get(LayerId(2)), Some(g[1]));
        assert_eq!(groups.get(LayerId(3)), None);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_item_groups_clear() {
        let g = ids(2);
        let mut groups = ItemGroups::new();
        groups.set(LayerId(0), g[0]);
        groups.set(LayerId(5), g[1]);
        assert!(groups.is_cached());

        let cleared = groups.clear();
        assert_eq!(cleared.as_slice(), &[g[0], g[1]]);
        assert!(!groups.is_cached());
        assert!(groups.clear().is_empty());
    }

    #[test]
    fn test_item_groups_remove_one_layer() {
        let g = ids(2);
        let mut groups = ItemGroups::new();
        groups.set(LayerId(0), g[0]);
        groups.set(LayerId(5), g[1]);

        assert_eq!(groups.remove(LayerId(0)), Some(g[0]));
        assert_eq!(groups.remove(LayerId(0)), None);
        assert_eq!(groups.get(LayerId(5)), Some(g[1]));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_update_flags_accumulate() {
        let mut base = ViewItemBase::new();
        base.request_update(UpdateFlags::APPEARANCE, false);
        base.request_update(UpdateFlags::GEOMETRY, true);

        let (flags, force) = base.take_update();
        assert!(flags.contains(UpdateFlags::APPEARANCE | UpdateFlags::GEOMETRY));
        assert!(force);
        assert_eq!(base.take_update(), (UpdateFlags::empty(), false));
    }

    #[test]
    fn test_all_contains_every_flag() {
        assert!(UpdateFlags::ALL.contains(UpdateFlags::APPEARANCE));
        assert!(UpdateFlags::ALL.contains(UpdateFlags::GEOMETRY));
    }
}
