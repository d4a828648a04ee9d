//! Triple-buffered renderable store
//!
//! The simulation thread fills the write slot and rotates; the render thread
//! reads the `prev`/`curr` pair under the same lock, so it never sees a torn
//! rotation.

use crate::renderable::Renderable;
use parking_lot::Mutex;

const PREV: usize = 0;
const CURR: usize = 1;
const WRITE: usize = 2;

struct TripleBuffer {
    slots: [Vec<Renderable>; 3],
    generation: u64,
}

pub struct RenderableStore {
    inner: Mutex<TripleBuffer>,
}

impl RenderableStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TripleBuffer {
                slots: [Vec::new(), Vec::new(), Vec::new()],
                generation: 0,
            }),
        }
    }

    pub fn add_renderable(&self, renderable: Renderable) {
        self.inner.lock().slots[WRITE].push(renderable);
    }

    /// Replace the write slot wholesale.
    pub fn add_renderables(&self, renderables: Vec<Renderable>) {
        self.inner.lock().slots[WRITE] = renderables;
    }

    pub fn extend_renderables(&self, renderables: impl IntoIterator<Item = Renderable>) {
        self.inner.lock().slots[WRITE].extend(renderables);
    }

    /// `prev <- curr`, `curr <- write`, `write <- empty`. The old `prev`
    /// allocation is recycled as the new write slot.
    pub fn swap_buffers(&self) {
        let mut inner = self.inner.lock();
        inner.slots.rotate_left(1);
        inner.slots[WRITE].clear();
        inner.generation += 1;
        tracing::trace!(
            generation = inner.generation,
            count = inner.slots[CURR].len(),
            "swapped renderable buffers"
        );
    }

    /// Number of completed swaps.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Clones of `(prev, curr, write)`.
    pub fn snapshot(&self) -> (Vec<Renderable>, Vec<Renderable>, Vec<Renderable>) {
        let inner = self.inner.lock();
        (
            inner.slots[PREV].clone(),
            inner.slots[CURR].clone(),
            inner.slots[WRITE].clone(),
        )
    }

    /// Run `f` over `(prev, curr)` with the lock held.
    pub(crate) fn with_generations<R>(&self, f: impl FnOnce(&[Renderable], &[Renderable]) -> R) -> R {
        let inner = self.inner.lock();
        f(&inner.slots[PREV], &inner.slots[CURR])
    }
}

impl Default for RenderableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::{
        CircleData, Color, EntityId, RenderData, Transform2D,
    };
    use glam::Vec2;
    use proptest::prelude::*;

    fn dot(id: u64, x: f32) -> Renderable {
        Renderable::new(
            EntityId(id),
            Transform2D::from_position(Vec2::new(x, 0.0)),
            RenderData::Circle(CircleData {
                radius: 1.0,
                color: Color::WHITE,
            }),
        )
    }

    #[test]
    fn swap_rotates_and_clears_write() {
        let store = RenderableStore::new();
        store.add_renderable(dot(1, 0.0));
        store.swap_buffers();
        store.add_renderables(vec![dot(1, 1.0), dot(2, 1.0)]);
        store.swap_buffers();

        let (prev, curr, write) = store.snapshot();
        assert_eq!(prev, vec![dot(1, 0.0)]);
        assert_eq!(curr, vec![dot(1, 1.0), dot(2, 1.0)]);
        assert!(write.is_empty());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn add_renderables_replaces_write_slot() {
        let store = RenderableStore::new();
        store.add_renderable(dot(9, 9.0));
        store.add_renderables(vec![dot(1, 1.0)]);
        store.extend_renderables([dot(2, 2.0)]);
        let (_, _, write) = store.snapshot();
        assert_eq!(write, vec![dot(1, 1.0), dot(2, 2.0)]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u64),
        Replace(Vec<u64>),
        Swap,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..16).prop_map(Op::Add),
            prop::collection::vec(0u64..16, 0..4).prop_map(Op::Replace),
            Just(Op::Swap),
        ]
    }

    proptest! {
        #[test]
        fn rotation_never_skips_or_duplicates_a_write(ops in prop::collection::vec(op(), 0..64)) {
            let store = RenderableStore::new();
            let mut pending: Vec<Renderable> = Vec::new();
            let mut committed: Vec<Vec<Renderable>> = Vec::new();

            for op in ops {
                match op {
                    Op::Add(id) => {
                        store.add_renderable(dot(id, id as f32));
                        pending.push(dot(id, id as f32));
                    }
                    Op::Replace(ids) => {
                        let list: Vec<_> = ids.iter().map(|&id| dot(id, id as f32)).collect();
                        store.add_renderables(list.clone());
                        pending = list;
                    }
                    Op::Swap => {
                        store.swap_buffers();
                        committed.push(std::mem::take(&mut pending));
                    }
                }
            }

            let (prev, curr, write) = store.snapshot();
            let n = committed.len();
            let expect_curr = if n >= 1 { committed[n - 1].clone() } else { Vec::new() };
            let expect_prev = if n >= 2 { committed[n - 2].clone() } else { Vec::new() };
            prop_assert_eq!(prev, expect_prev);
            prop_assert_eq!(curr, expect_curr);
            prop_assert_eq!(write, pending);
            prop_assert_eq!(store.generation(), n as u64);
        }
    }
}
