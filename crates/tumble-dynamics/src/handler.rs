//! Collision handler registry types.
//!
//! A handler is a set of four optional callbacks for one pair of
//! collision types. Callbacks are stored as `Arc` closures so the
//! registry entry can be cloned out before invocation — the space hands
//! itself mutably to the callback, so nothing may still borrow the
//! registry at that point.

use std::sync::Arc;

use tumble_types::CollisionType;

use crate::arbiter::Arbiter;
use crate::space::Space;

/// Callback returning a decision (`begin`, `pre_solve`).
pub type DecisionFn = Arc<dyn Fn(&mut Arbiter, &mut Space) -> bool + Send + Sync>;
/// Callback with no return value (`post_solve`, `separate`).
pub type NotifyFn = Arc<dyn Fn(&mut Arbiter, &mut Space) + Send + Sync>;

/// Callbacks for one registered collision-type pair.
///
/// - `begin` — first step a pair touches. Returning false ignores the
///   pair until physical separation.
/// - `pre_solve` — every touching step, before solving. Returning false
///   skips this step only.
/// - `post_solve` — after the solver has run, while impulses are fresh.
/// - `separate` — when the pair stops touching (or a shape is removed).
#[derive(Clone, Default)]
pub struct CollisionHandler {
    /// First declared collision type.
    pub type_a: CollisionType,
    /// Second declared collision type.
    pub type_b: CollisionType,
    /// Begin callback.
    pub begin: Option<DecisionFn>,
    /// Pre-solve callback.
    pub pre_solve: Option<DecisionFn>,
    /// Post-solve callback.
    pub post_solve: Option<NotifyFn>,
    /// Separate callback.
    pub separate: Option<NotifyFn>,
}

impl CollisionHandler {
    /// A handler that accepts every collision and does nothing — the
    /// default behavior for unregistered type pairs.
    pub fn accept() -> Self {
        Self::default()
    }

    /// Returns true if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.begin.is_none()
            && self.pre_solve.is_none()
            && self.post_solve.is_none()
            && self.separate.is_none()
    }
}

impl std::fmt::Debug for CollisionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionHandler")
            .field("type_a", &self.type_a)
            .field("type_b", &self.type_b)
            .field("begin", &self.begin.is_some())
            .field("pre_solve", &self.pre_solve.is_some())
            .field("post_solve", &self.post_solve.is_some())
            .field("separate", &self.separate.is_some())
            .finish()
    }
}
