//! # tumble-index
//!
//! Incremental bounding-volume hierarchy for broad-phase collision
//! detection.
//!
//! Unlike a rebuild-from-scratch BVH, this index is mutated in place:
//! leaves are inserted by a greedy area-cost descent, leaf boxes are
//! inflated along the owner's velocity so slow-moving objects rarely
//! need structural updates, and each re-index pass only touches leaves
//! whose tight box escaped its inflated box. Candidate collision pairs
//! are cached on the leaves themselves ("touching sets") and survive
//! between passes, which is what makes persistent contact state cheap
//! to maintain one level up.
//!
//! The index hosts two trees in one node arena — an active tree and a
//! static tree — sharing a single generation counter, so stamps stay
//! comparable and static/static pairs are never generated.

pub mod index;
mod tree;

pub use index::{BoundsSource, IndexStats, SpatialIndex};
