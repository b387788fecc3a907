//! Finding the state of a node near the last one that was found.
//!
//! Consecutive frames of a panning or zooming view ask for nodes that are
//! close to each other: a few siblings over, or a few levels up. The
//! [Locator] keeps the last node it found together with its state, and
//! walks from there instead of from the root whenever the walk is short.

use std::cmp::Ordering;

use tracing::trace;

use crate::config::CacheLimits;
use crate::state::{TreeState, Variant};
use crate::NodeId;

/// Counters describing how the locator has been answering requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocateStats {
    /// Requests answered by walking from the cached node.
    pub hits: u64,
    /// Requests answered by recomputing from the root.
    pub misses: u64,
    pub parent_steps: u64,
    pub sibling_steps: u64,
    /// Runs of the remaining path followed downwards, over all requests.
    pub descend_runs: u64,
}

impl LocateStats {
    /// The counts accumulated since `earlier` was taken.
    pub fn since(&self, earlier: &LocateStats) -> LocateStats {
        LocateStats {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
            parent_steps: self.parent_steps.saturating_sub(earlier.parent_steps),
            sibling_steps: self.sibling_steps.saturating_sub(earlier.sibling_steps),
            descend_runs: self.descend_runs.saturating_sub(earlier.descend_runs),
        }
    }
}

/// Computes node states, reusing the previously located node when the
/// target is within [CacheLimits] of it.
///
/// The result never depends on what is cached: a hit and a miss return
/// the same state.
///
/// ```rust
/// use mediant::{CacheLimits, Locator, NodeId, TreeState, Variant};
///
/// let mut locator = Locator::new(Variant::SternBrocot, CacheLimits::default());
///
/// let a: NodeId = "L30R5".parse().unwrap();
/// let b = a.next().unwrap().next().unwrap();
///
/// locator.locate(&a);
/// let state = locator.locate(&b);
///
/// assert_eq!(state, TreeState::from_node(Variant::SternBrocot, &b));
/// assert_eq!(locator.stats().hits, 1);
/// assert_eq!(locator.stats().sibling_steps, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Locator {
    variant: Variant,
    limits: CacheLimits,
    slot: Option<(NodeId, TreeState)>,
    stats: LocateStats,
}

impl Locator {
    pub fn new(variant: Variant, limits: CacheLimits) -> Self {
        Locator {
            variant,
            limits,
            slot: None,
            stats: LocateStats::default(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Switches trees. The cached state belongs to the old tree, so it is
    /// dropped.
    pub fn set_variant(&mut self, variant: Variant) {
        if self.variant != variant {
            self.variant = variant;
            self.invalidate();
        }
    }

    pub fn set_limits(&mut self, limits: CacheLimits) {
        self.limits = limits;
    }

    /// Forgets the cached node; the next request starts from the root.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// The node located last, if any.
    pub fn cached(&self) -> Option<&NodeId> {
        self.slot.as_ref().map(|(node, _)| node)
    }

    pub fn stats(&self) -> LocateStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = LocateStats::default();
    }

    /// Returns the state of `target` and caches it for the next request.
    pub fn locate(&mut self, target: &NodeId) -> TreeState {
        let (depth, state) = match self.replay(target) {
            Some(found) => {
                self.stats.hits += 1;
                found
            }
            None => {
                self.stats.misses += 1;
                trace!(depth = target.depth(), "locator miss, starting from the root");
                (0, self.variant.initial())
            }
        };

        let rest = target.path().suffix(target.depth() - depth);
        self.stats.descend_runs += rest.items().count() as u64;
        let state = state.descend(&rest);

        self.slot = Some((target.clone(), state.clone()));
        state
    }

    /// Walks the cached state to the target's ancestor at the shallower of
    /// the two depths. Returns that depth and the ancestor's state, or None
    /// if either walk would exceed its limit.
    fn replay(&mut self, target: &NodeId) -> Option<(u64, TreeState)> {
        let (mut cached, mut state) = self.slot.clone()?;

        if target.depth() < cached.depth() {
            let up = cached.depth() - target.depth();
            if up > self.limits.max_depth_delta {
                trace!(up, "cached node is too deep");
                return None;
            }
            for _ in 0..up {
                state = state.parent()?;
            }
            cached = cached.nth_ancestor(up).ok()?;
            self.stats.parent_steps += up;
        }

        let ancestor = target.nth_ancestor(target.depth() - cached.depth()).ok()?;
        let (side, distance) = ancestor.distance(&cached).ok()?;
        let steps = match distance.to_u64() {
            Some(steps) if steps <= self.limits.max_sibling_delta => steps,
            _ => {
                trace!(distance = %distance, "cached node is too far along its layer");
                return None;
            }
        };

        for _ in 0..steps {
            state = match side {
                Ordering::Greater => state.next_sibling()?,
                _ => state.prev_sibling()?,
            };
        }
        self.stats.sibling_steps += steps;

        trace!(
            depth = cached.depth(),
            steps,
            below = target.depth() - cached.depth(),
            "locator hit"
        );
        Some((cached.depth(), state))
    }
}
