// Copyright 2019 Eric Izoita (nytopop)
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies
// of the Software, and to permit persons to whom the Software is furnished to
// do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

//! Exact, incremental navigation of the trees that enumerate the positive
//! rationals.
//!
//! Every positive rational appears exactly once in the Stern-Brocot tree,
//! which orders them like a binary search tree, and once in the
//! Calkin-Wilf tree, which lists them breadth-first in the order of
//! Stern's diatomic sequence. Both trees have the same shape, so a node is
//! identified by its path from the root, independently of the tree it is
//! read in.
//!
//! Paths get long: the node `1/n` sits `n - 1` steps down the left spine.
//! They are stored run-length encoded ([RlePath], [RleInt]) so that every
//! operation costs time in the number of runs, and node values are
//! computed with closed-form jumps over whole runs ([TreeState]).
//!
//! A [TreeView](view::TreeView) walks exactly the part of a tree that is
//! visible in a zoomable viewport, reusing the state it computed for the
//! previous frame through a [Locator].
//!
//! References
//! - [0] Neil Calkin, Herbert S. Wilf
//!   [Recounting the Rationals](https://www.math.upenn.edu/~wilf/website/recounting.pdf)
//! - [1] Jeremy Gibbons, David Lester, Richard Bird
//!   [Enumerating the rationals](https://www.cs.ox.ac.uk/jeremy.gibbons/publications/rationals.pdf)

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use num_bigint::BigUint;

pub mod cf;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod locate;
pub mod path;
pub mod rle;
pub mod spatial;
pub mod state;
pub mod view;

pub use self::config::{CacheLimits, ViewConfig};
pub use self::enumerate::Enumeration;
pub use self::error::{Error, Result};
pub use self::locate::{LocateStats, Locator};
pub use self::path::{RlePath, Step};
pub use self::rle::RleInt;
pub use self::spatial::{Rect, SpatialIndex};
pub use self::state::{Fraction, TreeState, Variant};
pub use self::view::{
    Frame, FrameStats, Seed, Selection, TreeView, VisibleNode, VisibleRange, Window,
};

/// Identifies a node by its path from the root.
///
/// A node id says nothing about which tree it is read in; the id `RL2` has
/// the value `4/3` in the Stern-Brocot tree and `2/5` in the Calkin-Wilf
/// tree.
///
/// # Sort order
/// Ids sort breadth-first: by depth, then from left to right within a
/// layer.
///
/// ```rust
/// use mediant::NodeId;
///
/// let root = NodeId::root();
/// let l = root.left_child();
/// let r = root.right_child();
/// let ll = l.left_child();
///
/// assert!(root < l && l < r && r < ll);
/// assert_eq!(l.next().unwrap(), r);
/// assert!(r.next().is_err());
/// ```
///
/// # Identity
/// Each id carries a fingerprint of its path, so unequal ids are usually
/// told apart without comparing the paths themselves.
#[derive(Clone)]
pub struct NodeId {
    path: RlePath,
    fingerprint: u64,
}

/// A single move from a node to one of its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Parent,
    LeftChild,
    RightChild,
    Next,
    Prev,
}

impl NodeId {
    /// Returns the root.
    pub fn root() -> Self {
        Self::from_path(RlePath::root())
    }

    pub fn from_path(path: RlePath) -> Self {
        let mut hasher = DefaultHasher::new();
        path.runs().hash(&mut hasher);
        NodeId {
            fingerprint: hasher.finish(),
            path,
        }
    }

    /// Returns the node at `index` within layer `depth`, counting from the
    /// left.
    ///
    /// ```rust
    /// use mediant::NodeId;
    ///
    /// let node = NodeId::from_layer_index(3, &5u32.into()).unwrap();
    /// assert_eq!(node.to_string(), "RLR");
    /// assert!(NodeId::from_layer_index(3, &8u32.into()).is_err());
    /// ```
    pub fn from_layer_index(depth: u64, index: &BigUint) -> Result<Self> {
        let index = RleInt::from_biguint(index);
        RlePath::from_index(depth, &index).map(Self::from_path)
    }

    /// The leftmost node of layer `depth`.
    pub fn first_in_layer(depth: u64) -> Self {
        let mut path = RlePath::root();
        path.push(Step::Left, depth);
        Self::from_path(path)
    }

    /// The rightmost node of layer `depth`.
    pub fn last_in_layer(depth: u64) -> Self {
        let mut path = RlePath::root();
        path.push(Step::Right, depth);
        Self::from_path(path)
    }

    /// Returns the node numbered `n` in breadth-first order, where the root
    /// is `1`. Returns None for `0`.
    ///
    /// ```rust
    /// use mediant::NodeId;
    ///
    /// let node = NodeId::from_bfs_index(&6u32.into()).unwrap();
    /// assert_eq!(node.to_string(), "RL");
    /// assert_eq!(node.bfs_index(), 6u32.into());
    /// ```
    pub fn from_bfs_index(n: &BigUint) -> Option<Self> {
        let bits = RleInt::from_biguint(n);
        if bits.is_zero() {
            return None;
        }

        // the leading one marks the depth and is not part of the path
        let mut path = RlePath::root();
        for (i, (bit, count)) in bits.segments().enumerate() {
            let count = if i == 0 { count - 1 } else { count };
            path.push(Step::from_bit(bit), count);
        }
        Some(Self::from_path(path))
    }

    /// The breadth-first number of this node, starting at `1` for the root.
    pub fn bfs_index(&self) -> BigUint {
        let marker = std::iter::once((true, 1));
        let segments = self.path.items().map(|(step, count)| (step.bit(), count));
        RleInt::from_segments(marker.chain(segments)).to_biguint()
    }

    /// The position of this node within its layer, counting from the left.
    pub fn index(&self) -> RleInt {
        self.path.to_index()
    }

    /// Builds the node whose Stern-Brocot (or Calkin-Wilf) value has the
    /// continued fraction `coefficients`.
    ///
    /// The node at the end of a continued fraction with coefficient sum `s`
    /// lies at depth `s - 1`. If that is deeper than `max_depth`, this
    /// returns [Error::PrecisionCapped] carrying the node's ancestor at
    /// `max_depth`.
    ///
    /// ```rust
    /// use mediant::{NodeId, Variant};
    /// use num_bigint::BigUint;
    ///
    /// let cf: Vec<BigUint> = vec![1u32.into(), 1u32.into(), 3u32.into()];
    /// let node = NodeId::from_continued_fraction(Variant::SternBrocot, &cf, 1 << 20).unwrap();
    /// assert_eq!(node.to_string(), "RLR2");
    /// assert_eq!(node.value(Variant::SternBrocot).to_string(), "7/4");
    /// ```
    pub fn from_continued_fraction(
        variant: Variant,
        coefficients: &[BigUint],
        max_depth: u64,
    ) -> Result<Self> {
        let (path, capped) = cf::path_of(variant, coefficients, max_depth)?;
        let node = Self::from_path(path);
        if capped {
            return Err(Error::PrecisionCapped {
                cap: max_depth,
                truncated: Box::new(node),
            });
        }
        Ok(node)
    }

    /// Builds the node with the value `value` in the given tree.
    ///
    /// `value` need not be in lowest terms.
    pub fn from_ratio(variant: Variant, value: &Fraction, max_depth: u64) -> Result<Self> {
        let coefficients = cf::of_ratio(&value.num, &value.den)?;
        Self::from_continued_fraction(variant, &coefficients, max_depth)
    }

    /// The continued fraction of this node's value in the given tree.
    pub fn to_continued_fraction(&self, variant: Variant) -> Vec<BigUint> {
        cf::of_path(variant, &self.path)
    }

    /// Computes this node's value in the given tree from the root.
    pub fn value(&self, variant: Variant) -> Fraction {
        TreeState::from_path(variant, &self.path).value()
    }

    pub fn path(&self) -> &RlePath {
        &self.path
    }

    pub fn into_path(self) -> RlePath {
        self.path
    }

    /// Number of steps from the root.
    pub fn depth(&self) -> u64 {
        self.path.size()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns `true` if this is the leftmost node of its layer.
    pub fn is_first_node(&self) -> bool {
        match self.path.runs() {
            [] => true,
            [0, _] => true,
            _ => false,
        }
    }

    /// Returns `true` if this is the rightmost node of its layer.
    pub fn is_last_node(&self) -> bool {
        self.path.runs().len() <= 1
    }

    pub fn left_child(&self) -> Self {
        self.child(Step::Left)
    }

    pub fn right_child(&self) -> Self {
        self.child(Step::Right)
    }

    pub fn child(&self, step: Step) -> Self {
        let mut path = self.path.clone();
        path.push(step, 1);
        Self::from_path(path)
    }

    /// Returns the ancestor `n` levels up; `nth_ancestor(0)` is the node
    /// itself.
    ///
    /// ```rust
    /// use mediant::{Error, NodeId};
    ///
    /// let node: NodeId = "RL3".parse().unwrap();
    /// assert_eq!(node.nth_ancestor(2).unwrap().to_string(), "RL");
    /// assert_eq!(
    ///     node.nth_ancestor(5),
    ///     Err(Error::InvalidDepth { depth: 4, requested: 5 }),
    /// );
    /// ```
    pub fn nth_ancestor(&self, n: u64) -> Result<Self> {
        if n > self.depth() {
            return Err(Error::InvalidDepth {
                depth: self.depth(),
                requested: n,
            });
        }
        let mut path = self.path.clone();
        path.right_shift(n);
        Ok(Self::from_path(path))
    }

    pub fn parent(&self) -> Result<Self> {
        self.nth_ancestor(1)
    }

    /// The node to the right on the same layer.
    ///
    /// Fails with [Error::EdgeOfLayer] on the last node of a layer rather
    /// than wrapping to the next one.
    pub fn next(&self) -> Result<Self> {
        let mut path = self.path.clone();
        path.increment()?;
        Ok(Self::from_path(path))
    }

    /// The node to the left on the same layer.
    pub fn prev(&self) -> Result<Self> {
        let mut path = self.path.clone();
        path.decrement()?;
        Ok(Self::from_path(path))
    }

    /// Returns `true` if `ancestor` lies on the path to this node.
    pub fn has_prefix(&self, ancestor: &NodeId) -> bool {
        self.path.has_prefix(&ancestor.path)
    }

    /// The path from `ancestor` down to this node, if it is an ancestor.
    pub fn relative_to(&self, ancestor: &NodeId) -> Option<RlePath> {
        self.path.strip_prefix(&ancestor.path)
    }

    /// How far this node is from `other` along their common layer, and on
    /// which side.
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use mediant::NodeId;
    ///
    /// let a: NodeId = "LRL".parse().unwrap();
    /// let b: NodeId = "R2L".parse().unwrap();
    /// let (side, distance) = a.distance(&b).unwrap();
    /// assert_eq!(side, Ordering::Less);
    /// assert_eq!(distance.to_u64(), Some(4));
    /// ```
    pub fn distance(&self, other: &NodeId) -> Result<(Ordering, RleInt)> {
        if self.depth() != other.depth() {
            return Err(Error::InvalidDepth {
                depth: self.depth(),
                requested: other.depth(),
            });
        }
        Ok(self.index().cmp_sub(&other.index()))
    }

    pub fn step(&self, m: Move) -> Result<Self> {
        match m {
            Move::Parent => self.parent(),
            Move::LeftChild => Ok(self.left_child()),
            Move::RightChild => Ok(self.right_child()),
            Move::Next => self.next(),
            Move::Prev => self.prev(),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::root()
    }
}

impl From<RlePath> for NodeId {
    fn from(path: RlePath) -> Self {
        Self::from_path(path)
    }
}

impl PartialEq for NodeId {
    fn eq(&self, other: &NodeId) -> bool {
        self.fingerprint == other.fingerprint && self.path == other.path
    }
}

impl Eq for NodeId {}

impl Hash for NodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &NodeId) -> Ordering {
        match self.depth().cmp(&other.depth()) {
            Ordering::Equal => self.path.cmp_in_layer(&other.path),
            o => o,
        }
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &NodeId) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({})", self.path)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(Self::from_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn big(xs: &[u64]) -> Vec<BigUint> {
        xs.iter().map(|&x| BigUint::from(x)).collect()
    }

    #[test]
    fn left_spine_values() {
        let root = NodeId::root();
        assert_eq!(root.value(Variant::SternBrocot), Fraction::new(1u32, 1u32));
        let l = root.left_child();
        assert_eq!(l.value(Variant::SternBrocot), Fraction::new(1u32, 2u32));
        let ll = l.left_child();
        assert_eq!(ll.value(Variant::SternBrocot), Fraction::new(1u32, 3u32));
        let lll = ll.left_child();
        assert_eq!(lll.value(Variant::SternBrocot), Fraction::new(1u32, 4u32));
        assert_eq!(lll, NodeId::first_in_layer(3));
    }

    #[test]
    fn path_cf_value_triples() {
        let cases: &[(&str, &[u64], (u32, u32))] = &[
            ("I", &[1], (1, 1)),
            ("L", &[0, 2], (1, 2)),
            ("RL2", &[1, 3], (4, 3)),
            ("RL3", &[1, 4], (5, 4)),
            ("RLR2", &[1, 1, 3], (7, 4)),
        ];
        for &(path, coefficients, (p, q)) in cases {
            let node = id(path);
            let cf = big(coefficients);
            assert_eq!(node.to_continued_fraction(Variant::SternBrocot), cf);
            assert_eq!(node.value(Variant::SternBrocot), Fraction::new(p, q));
            assert_eq!(cf::evaluate(&cf), Fraction::new(p, q));
            assert_eq!(
                NodeId::from_continued_fraction(Variant::SternBrocot, &cf, 1 << 20),
                Ok(node)
            );
        }
    }

    #[test]
    fn calkin_wilf_shares_continued_fraction() {
        let cf = big(&[1, 3]);
        let node = NodeId::from_continued_fraction(Variant::CalkinWilf, &cf, 1 << 20).unwrap();
        assert_eq!(node, id("L2R"));
        assert_eq!(node.value(Variant::CalkinWilf), Fraction::new(4u32, 3u32));
        assert_eq!(node.to_continued_fraction(Variant::CalkinWilf), cf);
    }

    #[test]
    fn precision_cap() {
        let cf = big(&[2, 100]);
        let err = NodeId::from_continued_fraction(Variant::SternBrocot, &cf, 10).unwrap_err();
        assert_eq!(
            err,
            Error::PrecisionCapped {
                cap: 10,
                truncated: Box::new(id("R2L8")),
            }
        );
    }

    #[test]
    fn from_ratio() {
        let value = Fraction::new(14u32, 8u32);
        let node = NodeId::from_ratio(Variant::SternBrocot, &value, 64).unwrap();
        assert_eq!(node, id("RLR2"));
        assert!(NodeId::from_ratio(Variant::SternBrocot, &Fraction::new(0u32, 3u32), 64).is_err());
    }

    #[test]
    fn layer_edges() {
        let last = NodeId::last_in_layer(4);
        assert!(last.is_last_node());
        assert!(!last.is_first_node());
        assert_eq!(last.next(), Err(Error::EdgeOfLayer { depth: 4 }));

        let first = NodeId::first_in_layer(4);
        assert!(first.is_first_node());
        assert_eq!(first.prev(), Err(Error::EdgeOfLayer { depth: 4 }));

        assert!(NodeId::root().is_first_node());
        assert!(NodeId::root().is_last_node());
        assert!(!id("LR").is_first_node());
        assert!(!id("LR").is_last_node());
    }

    #[test]
    fn neighbours() {
        let node = id("RL2R");
        assert_eq!(node.next().unwrap(), id("RLRL"));
        assert_eq!(node.prev().unwrap(), id("RL3"));
        assert_eq!(node.parent().unwrap(), id("RL2"));
        assert_eq!(node.step(Move::LeftChild).unwrap(), id("RL2RL"));
        assert_eq!(node.step(Move::RightChild).unwrap(), id("RL2R2"));
        assert_eq!(
            NodeId::root().step(Move::Parent),
            Err(Error::InvalidDepth {
                depth: 0,
                requested: 1
            })
        );
    }

    #[test]
    fn ancestry() {
        let node = id("RL3R2");
        let ancestor = id("RL2");
        assert!(node.has_prefix(&ancestor));
        assert_eq!(node.relative_to(&ancestor), Some(id("LR2").into_path()));
        assert_eq!(node.relative_to(&id("L")), None);
        assert_eq!(node.nth_ancestor(node.depth()).unwrap(), NodeId::root());
    }

    #[test]
    fn distance_needs_equal_depth() {
        assert_eq!(
            id("LR").distance(&id("R")),
            Err(Error::InvalidDepth {
                depth: 2,
                requested: 1
            })
        );
        let (side, d) = id("R2").distance(&id("L2")).unwrap();
        assert_eq!(side, Ordering::Greater);
        assert_eq!(d.to_u64(), Some(3));
    }

    #[test]
    fn breadth_first_numbering() {
        let mut numbered = Vec::new();
        for n in 1u32..16 {
            let node = NodeId::from_bfs_index(&n.into()).unwrap();
            assert_eq!(node.bfs_index(), n.into());
            numbered.push(node);
        }
        assert!(numbered.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(numbered[0], NodeId::root());
        assert_eq!(numbered[7], NodeId::first_in_layer(3));
        assert_eq!(NodeId::from_bfs_index(&0u32.into()), None);
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;

        let a = id("L2R");
        let b = NodeId::root().left_child().left_child().right_child();
        assert_eq!(a, b);
        assert_ne!(a, id("L2"));

        let set: HashSet<NodeId> = [a.clone(), b, id("R")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn random_walks() {
        for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
            let mut node = NodeId::root();
            let mut state = variant.initial();
            for _ in 0..64 {
                let step = Step::from_bit(rand::random());
                let count = 1 + rand::random::<u8>() as u64;
                let mut path = node.into_path();
                path.push(step, count);
                node = NodeId::from_path(path);
                state = state.descend_by(step, count);
                assert!(state.is_unimodular());
            }
            assert_eq!(state, TreeState::from_node(variant, &node));

            // the value's continued fraction leads back to the same node
            let cf = node.to_continued_fraction(variant);
            let back = NodeId::from_continued_fraction(variant, &cf, u64::MAX).unwrap();
            assert_eq!(back, node);
            assert_eq!(back.value(variant), state.value());
        }
    }
}
