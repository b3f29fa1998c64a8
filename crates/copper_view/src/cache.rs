//! Retained group cache
//!
//! An item's draw calls for a layer are recorded into a GAL group once and
//! replayed on later frames. The cache only keeps handles correct: a group
//! is deleted exactly when the item stops referring to it. Deciding when an
//! item is worth caching is left to the caller through [`CachePolicy`] and
//! [`ViewItemBase::set_draw_immediate`](crate::ViewItemBase::set_draw_immediate).

use copper_core::Gal;

use crate::item::{LayerId, ViewItem};
use crate::painter::Painter;

/// Whether items are recorded into groups at all
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Draw every item immediately on every frame
    Immediate,
    /// Record each item/layer once and replay it
    #[default]
    Groups,
}

/// Counters for the last frames, reset with [`GroupCache::reset_stats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub recorded: usize,
    pub replayed: usize,
    pub immediate: usize,
    pub deleted: usize,
}

#[derive(Debug, Default)]
pub struct GroupCache {
    policy: CachePolicy,
    stats: CacheStats,
}

impl GroupCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            stats: CacheStats::default(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Switching policy does not touch existing groups; call
    /// [`GroupCache::invalidate`] on the items to drop them
    pub fn set_policy(&mut self, policy: CachePolicy) {
        self.policy = policy;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Draw one layer of an item, replaying or recording its group
    pub fn draw_item(
        &mut self,
        gal: &mut dyn Gal,
        painter: &mut dyn Painter,
        item: &mut dyn ViewItem,
        layer: LayerId,
    ) {
        if let Some(group) = item.base().groups().get(layer) {
            gal.draw_group(group);
            self.stats.replayed += 1;
            return;
        }

        if self.policy == CachePolicy::Immediate || item.base().draws_immediate() {
            paint(gal, painter, item, layer);
            self.stats.immediate += 1;
            return;
        }

        let group = gal.begin_group();
        paint(gal, painter, item, layer);
        gal.end_group();

        if let Some(stale) = item.base_mut().groups_mut().set(layer, group) {
            gal.delete_group(stale);
            self.stats.deleted += 1;
        }
        gal.draw_group(group);
        self.stats.recorded += 1;
    }

    /// Delete every group the item owns; safe to call repeatedly
    pub fn invalidate(&mut self, gal: &mut dyn Gal, item: &mut dyn ViewItem) {
        for group in item.base_mut().groups_mut().clear() {
            gal.delete_group(group);
            self.stats.deleted += 1;
        }
    }

    /// Delete the group the item recorded for `layer`, if any
    pub fn release_layer(&mut self, gal: &mut dyn Gal, item: &mut dyn ViewItem, layer: LayerId) {
        if let Some(group) = item.base_mut().groups_mut().remove(layer) {
            gal.delete_group(group);
            self.stats.deleted += 1;
        }
    }

    /// Cleanup when the item leaves the view
    pub fn release(&mut self, gal: &mut dyn Gal, item: &mut dyn ViewItem) {
        self.invalidate(gal, item);
        item.base_mut().take_update();
        item.base_mut().set_draw_immediate(false);
    }

    /// Apply the item's pending update
    ///
    /// Groups bake in both geometry and colors, so any change drops them.
    /// The item then draws immediately for one frame before it is recorded
    /// again. Returns true when the item asked for an immediate redraw.
    pub fn process_updates(&mut self, gal: &mut dyn Gal, item: &mut dyn ViewItem) -> bool {
        let (flags, force) = item.base_mut().take_update();
        if flags.is_empty() {
            return force;
        }

        self.invalidate(gal, item);
        item.base_mut().set_draw_immediate(true);
        force
    }
}

fn paint(gal: &mut dyn Gal, painter: &mut dyn Painter, item: &dyn ViewItem, layer: LayerId) {
    if !painter.draw(gal, item.as_any(), layer) {
        item.view_draw(layer, gal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{UpdateFlags, ViewItemBase};
    use crate::painter::ItemPainter;
    use copper_core::{Box2, RecordingGal, Vector2};
    use smallvec::{smallvec, SmallVec};
    use std::any::Any;

    struct Segment {
        base: ViewItemBase,
        end: Vector2,
    }

    impl Segment {
        fn new(end: Vector2) -> Self {
            Self {
                base: ViewItemBase::new(),
                end,
            }
        }
    }

    impl ViewItem for Segment {
        fn view_bbox(&self) -> Box2 {
            Box2::compute(&[Vector2::ZERO, self.end])
        }

        fn view_layers(&self) -> SmallVec<[LayerId; 4]> {
            smallvec![LayerId(0)]
        }

        fn base(&self) -> &ViewItemBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ViewItemBase {
            &mut self.base
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn view_draw(&self, _layer: LayerId, gal: &mut dyn Gal) {
            gal.draw_line(Vector2::ZERO, self.end);
        }
    }

    fn frame(cache: &mut GroupCache, gal: &mut RecordingGal, item: &mut Segment) {
        gal.begin_drawing();
        cache.process_updates(gal, item);
        cache.draw_item(gal, &mut ItemPainter, item, LayerId(0));
        item.base_mut().set_draw_immediate(false);
        gal.end_drawing();
    }

    #[test]
    fn test_record_then_replay() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(5.0, 0.0));

        frame(&mut cache, &mut gal, &mut item);
        let group = item.base().groups().get(LayerId(0)).unwrap();
        assert_eq!(gal.commands().len(), 1);
        assert_eq!(gal.replayed_groups(), &[group]);

        frame(&mut cache, &mut gal, &mut item);
        assert_eq!(gal.commands().len(), 1);
        assert_eq!(gal.replayed_groups(), &[group]);
        assert_eq!(gal.group_count(), 1);
        assert_eq!(cache.stats().recorded, 1);
        assert_eq!(cache.stats().replayed, 1);
    }

    #[test]
    fn test_update_goes_immediate_then_recaches() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(5.0, 0.0));
        frame(&mut cache, &mut gal, &mut item);

        item.end = Vector2::new(0.0, 7.0);
        item.view_update(UpdateFlags::GEOMETRY, false);
        frame(&mut cache, &mut gal, &mut item);

        assert_eq!(gal.group_count(), 0);
        assert!(!item.base().groups().is_cached());
        assert!(gal.replayed_groups().is_empty());
        assert_eq!(gal.commands()[0].world_points()[1], Vector2::new(0.0, 7.0));

        frame(&mut cache, &mut gal, &mut item);
        assert_eq!(gal.group_count(), 1);
        assert!(item.base().groups().is_cached());
    }

    #[test]
    fn test_invalidate_twice() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(1.0, 1.0));
        frame(&mut cache, &mut gal, &mut item);

        cache.invalidate(&mut gal, &mut item);
        cache.invalidate(&mut gal, &mut item);
        assert_eq!(gal.group_count(), 0);
        assert_eq!(cache.stats().deleted, 1);
    }

    #[test]
    fn test_immediate_policy_never_records() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Immediate);
        let mut item = Segment::new(Vector2::new(1.0, 1.0));

        frame(&mut cache, &mut gal, &mut item);
        frame(&mut cache, &mut gal, &mut item);
        assert_eq!(gal.group_count(), 0);
        assert_eq!(cache.stats().immediate, 2);
        assert_eq!(gal.commands().len(), 1);
    }

    #[test]
    fn test_release_leaves_no_groups() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(1.0, 1.0));
        frame(&mut cache, &mut gal, &mut item);
        item.view_update(UpdateFlags::APPEARANCE, true);

        cache.release(&mut gal, &mut item);
        assert_eq!(gal.group_count(), 0);
        assert_eq!(item.base().pending_update(), UpdateFlags::empty());
    }

    #[test]
    fn test_release_layer_keeps_other_layers() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(1.0, 1.0));
        gal.begin_drawing();
        cache.draw_item(&mut gal, &mut ItemPainter, &mut item, LayerId(0));
        cache.draw_item(&mut gal, &mut ItemPainter, &mut item, LayerId(1));
        gal.end_drawing();
        assert_eq!(gal.group_count(), 2);

        cache.release_layer(&mut gal, &mut item, LayerId(0));
        cache.release_layer(&mut gal, &mut item, LayerId(0));
        assert_eq!(gal.group_count(), 1);
        assert_eq!(cache.stats().deleted, 1);
        assert!(item.base().groups().get(LayerId(0)).is_none());
        assert!(item.base().groups().get(LayerId(1)).is_some());
    }

    #[test]
    fn test_force_redraw_reported() {
        let mut gal = RecordingGal::new();
        let mut cache = GroupCache::new(CachePolicy::Groups);
        let mut item = Segment::new(Vector2::new(1.0, 1.0));

        item.view_update(UpdateFlags::APPEARANCE, true);
        assert!(cache.process_updates(&mut gal, &mut item));
        assert!(!cache.process_updates(&mut gal, &mut item));
    }
}
