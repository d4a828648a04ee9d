//! Batch keys and grouping
//!
//! Instances are grouped by every piece of state a draw call cannot vary, so the
//! number of draw calls tracks distinct visual states rather than entity count.

mod group;
mod key;
mod shared;

pub use group::{BatchGroup, BatchGroups};
pub use key::{BatchKey, BatchKind, BuildPrecomputedHasher, PrecomputedHasher};
pub use shared::{
    AtlasShared, CircleShared, LineShared, RectShared, ShaderShared, SpriteShared, TextShared,
};
