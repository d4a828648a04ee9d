//! Key-indexed batch groups
//!
//! Groups are kept across passes so their vectors keep their capacity; `clear`
//! only forgets which keys are live.

use super::key::{BatchKey, BuildPrecomputedHasher};
use crate::renderable::RenderableTransform;
use std::collections::HashMap;

/// Instances sharing one [`BatchKey`]. `extras` runs parallel to `transforms`
/// for kinds that carry per-instance payload (text strings, atlas frames).
#[derive(Debug)]
pub struct BatchGroup<S, X = ()> {
    pub key: BatchKey,
    pub shared: S,
    pub transforms: Vec<RenderableTransform>,
    pub extras: Vec<X>,
}

impl<S, X> BatchGroup<S, X> {
    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    #[inline]
    pub fn push(&mut self, transform: RenderableTransform) {
        self.transforms.push(transform);
    }

    #[inline]
    pub fn push_with(&mut self, transform: RenderableTransform, extra: X) {
        self.transforms.push(transform);
        self.extras.push(extra);
        debug_assert_eq!(self.transforms.len(), self.extras.len());
    }
}

pub struct BatchGroups<S, X = ()> {
    index: HashMap<BatchKey, usize, BuildPrecomputedHasher>,
    groups: Vec<BatchGroup<S, X>>,
    live: usize,
}

impl<S, X> BatchGroups<S, X> {
    pub fn new() -> Self {
        Self {
            index: HashMap::default(),
            groups: Vec::new(),
            live: 0,
        }
    }

    /// Index of the group for `key`, creating it with `init()` as its shared
    /// state if the key has not been seen this pass. The flag is `true` on creation.
    pub fn find_or_create(&mut self, key: BatchKey, init: impl FnOnce() -> S) -> (usize, bool) {
        if let Some(&index) = self.index.get(&key) {
            debug_assert!(self.groups[index].key == key);
            return (index, false);
        }

        let index = self.live;
        if let Some(group) = self.groups.get_mut(index) {
            group.key = key;
            group.shared = init();
            group.transforms.clear();
            group.extras.clear();
        } else {
            self.groups.push(BatchGroup {
                key,
                shared: init(),
                transforms: Vec::new(),
                extras: Vec::new(),
            });
        }
        self.live += 1;
        self.index.insert(key, index);
        (index, true)
    }

    #[inline]
    pub fn get(&self, index: usize) -> &BatchGroup<S, X> {
        &self.groups[..self.live][index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut BatchGroup<S, X> {
        &mut self.groups[..self.live][index]
    }

    /// Groups created this pass, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &BatchGroup<S, X>> {
        self.groups[..self.live].iter()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.live = 0;
    }
}

impl<S, X> Default for BatchGroups<S, X> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::Color;
    use glam::Vec2;

    fn at(x: f32) -> RenderableTransform {
        RenderableTransform {
            position: Vec2::new(x, 0.0),
            ..RenderableTransform::IDENTITY
        }
    }

    #[test]
    fn first_instance_initializes_shared_state() {
        let mut groups: BatchGroups<Color> = BatchGroups::new();
        let key = BatchKey::circle(1.0, Color::WHITE, 0);

        let (a, created) = groups.find_or_create(key, || Color::WHITE);
        assert!(created);
        groups.get_mut(a).push(at(1.0));

        let (b, created) = groups.find_or_create(key, || Color::BLACK);
        assert!(!created);
        assert_eq!(a, b);
        groups.get_mut(b).push(at(2.0));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get(a).shared, Color::WHITE);
        assert_eq!(groups.get(a).len(), 2);
    }

    #[test]
    fn clear_reuses_group_storage() {
        let mut groups: BatchGroups<(), String> = BatchGroups::new();
        let first = BatchKey::circle(1.0, Color::WHITE, 0);
        let (i, _) = groups.find_or_create(first, || ());
        for n in 0..32 {
            groups.get_mut(i).push_with(at(n as f32), n.to_string());
        }
        let capacity = groups.get(i).transforms.capacity();

        groups.clear();
        assert!(groups.is_empty());

        let second = BatchKey::circle(2.0, Color::WHITE, 0);
        let (j, created) = groups.find_or_create(second, || ());
        assert!(created);
        assert_eq!(j, 0);
        assert!(groups.get(j).is_empty());
        assert!(groups.get(j).extras.is_empty());
        assert_eq!(groups.get(j).transforms.capacity(), capacity);
        assert!(groups.get(j).key == second);
    }

    #[test]
    fn iteration_follows_discovery_order() {
        let mut groups: BatchGroups<u32> = BatchGroups::new();
        for radius in [3.0, 1.0, 2.0, 1.0] {
            let key = BatchKey::circle(radius, Color::WHITE, 0);
            groups.find_or_create(key, || radius as u32);
        }
        let order: Vec<u32> = groups.iter().map(|g| g.shared).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }
}
