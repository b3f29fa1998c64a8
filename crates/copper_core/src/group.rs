//! Retained group handles
//!
//! A group is a recorded, replayable sequence of primitives. Backends own
//! the recorded data in a [`GroupStore`]; callers only ever hold the
//! [`GroupId`]. Keys carry a generation, so a handle that outlives its group
//! is detected instead of aliasing a newer one.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a retained group
    pub struct GroupId;
}

/// Arena of recorded groups, keyed by generation-checked handles
#[derive(Debug)]
pub struct GroupStore<T> {
    groups: SlotMap<GroupId, T>,
}

impl<T> Default for GroupStore<T> {
    fn default() -> Self {
        Self {
            groups: SlotMap::with_key(),
        }
    }
}

impl<T> GroupStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: T) -> GroupId {
        self.groups.insert(group)
    }

    pub fn get(&self, id: GroupId) -> Option<&T> {
        self.groups.get(id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut T> {
        self.groups.get_mut(id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(id)
    }

    /// Remove a group; removing a stale or already removed handle is a no-op
    pub fn remove(&mut self, id: GroupId) -> Option<T> {
        self.groups.remove(id)
    }

    /// Number of live groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &T)> {
        self.groups.iter()
    }
}
