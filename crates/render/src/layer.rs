use std::cmp::Ordering;

use crate::registry::ObjectHandle;

/// A z-order bucket of scene objects, re-sorted every frame.
#[derive(Debug, Clone, Default)]
pub struct DepthLayer {
    members: Vec<ObjectHandle>,
}

impl DepthLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[ObjectHandle] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn insert(&mut self, handle: ObjectHandle) {
        self.members.push(handle);
    }

    /// Remove `handle`, keeping the order of the remaining members.
    pub(crate) fn remove(&mut self, handle: ObjectHandle) -> bool {
        match self.members.iter().position(|h| *h == handle) {
            Some(i) => {
                self.members.remove(i);
                true
            }
            None => false,
        }
    }

    /// Painter's order: smallest (furthest) depth first.
    ///
    /// `depth` returns the sort key of a member, or `None` for objects with no points. Those
    /// stay in their current slots; every other member is stable-sorted into the remaining
    /// slots, so equal keys keep their prior order.
    pub fn sort_by_depth<F>(&mut self, depth: F)
    where
        F: Fn(ObjectHandle) -> Option<f32>,
    {
        let keyed: Vec<(usize, f32)> = self
            .members
            .iter()
            .enumerate()
            .filter_map(|(slot, &h)| depth(h).map(|d| (slot, d)))
            .collect();
        let mut sorted: Vec<(ObjectHandle, f32)> = keyed
            .iter()
            .map(|&(slot, d)| (self.members[slot], d))
            .collect();
        sorted.sort_by(|a, b| compare_depth(a.1, b.1));
        for (&(slot, _), (handle, _)) in keyed.iter().zip(sorted) {
            self.members[slot] = handle;
        }
    }
}

fn compare_depth(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}
