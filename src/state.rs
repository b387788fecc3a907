//! The boundary-fraction recurrence behind both trees.
//!
//! A Stern-Brocot node is the mediant of two boundary fractions `lo < hi`,
//! starting from `0/1` and `1/0`. Going left replaces `hi` by the node,
//! going right replaces `lo`. A Calkin-Wilf node `a/b` has children
//! `a/(a+b)` and `(a+b)/b`, so its state is just its value.
//!
//! Every transition here is O(1) big-integer operations, including the
//! jumps of `k` levels at once and the sideways steps to a sibling, which
//! use the closed form from
//! - Jeremy Gibbons, David Lester, Richard Bird
//!   [Enumerating the rationals](https://www.cs.ox.ac.uk/jeremy.gibbons/publications/rationals.pdf)

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::Error;
use crate::path::{RlePath, Step};
use crate::NodeId;

/// A pair of naturals `num/den`, kept exactly as constructed.
///
/// `1/0` is a valid boundary value in the Stern-Brocot tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    pub num: BigUint,
    pub den: BigUint,
}

impl Fraction {
    pub fn new<N: Into<BigUint>, D: Into<BigUint>>(num: N, den: D) -> Self {
        Fraction {
            num: num.into(),
            den: den.into(),
        }
    }

    pub fn one() -> Self {
        Self::new(1u32, 1u32)
    }

    /// Component-wise sum; the mediant of two fractions.
    pub fn mediant(&self, other: &Fraction) -> Fraction {
        Fraction {
            num: &self.num + &other.num,
            den: &self.den + &other.den,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.den.is_zero()
    }

    /// `num + den`; strictly grows with every step away from a boundary.
    fn weight(&self) -> BigUint {
        &self.num + &self.den
    }

    /// `self * k + other`, component-wise.
    fn scale_add(&self, k: u64, other: &Fraction) -> Fraction {
        Fraction {
            num: &self.num * k + &other.num,
            den: &self.den * k + &other.den,
        }
    }

    /// `self * k - other`, component-wise. `other` must be no larger.
    fn scale_sub(&self, k: &BigUint, other: &Fraction) -> Fraction {
        Fraction {
            num: &self.num * k - &other.num,
            den: &self.den * k - &other.den,
        }
    }

    fn sub(&self, other: &Fraction) -> Fraction {
        Fraction {
            num: &self.num - &other.num,
            den: &self.den - &other.den,
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Fraction {
    type Err = Error;

    /// Parses a positive fraction `p/q` or a bare integer `p`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let (num, den) = match s.split_once('/') {
            Some((num, den)) => (num.trim(), den.trim()),
            None => (s.trim(), "1"),
        };
        let num: BigUint = num
            .parse()
            .map_err(|_| Error::MalformedFraction("numerator is not a natural number"))?;
        let den: BigUint = den
            .parse()
            .map_err(|_| Error::MalformedFraction("denominator is not a natural number"))?;
        if num.is_zero() {
            return Err(Error::MalformedFraction("numerator is zero"));
        }
        if den.is_zero() {
            return Err(Error::MalformedFraction("denominator is zero"));
        }
        Ok(Fraction { num, den })
    }
}

/// Which of the two enumeration trees is being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    SternBrocot,
    CalkinWilf,
}

impl Variant {
    /// The state of the root node.
    pub fn initial(self) -> TreeState {
        match self {
            Variant::SternBrocot => TreeState::SternBrocot {
                lo: Fraction::new(0u32, 1u32),
                hi: Fraction::new(1u32, 0u32),
            },
            Variant::CalkinWilf => TreeState::CalkinWilf {
                value: Fraction::one(),
            },
        }
    }

    /// The boundary fractions the root is built from, for trees that have
    /// them.
    pub fn seeds(self) -> Option<[Fraction; 2]> {
        match self {
            Variant::SternBrocot => Some([Fraction::new(0u32, 1u32), Fraction::new(1u32, 0u32)]),
            Variant::CalkinWilf => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::SternBrocot => "stern-brocot",
            Variant::CalkinWilf => "calkin-wilf",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The state needed to compute a node's value and to move to its
/// neighbours.
///
/// ```rust
/// use mediant::{Fraction, Variant};
///
/// let root = Variant::SternBrocot.initial();
/// assert_eq!(root.value(), Fraction::new(1u32, 1u32));
///
/// let node = root.descend_left(2).descend_right(1);
/// assert_eq!(node.value(), Fraction::new(2u32, 5u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeState {
    /// The node is the mediant of `lo` and `hi`.
    SternBrocot { lo: Fraction, hi: Fraction },
    /// The node is `value`.
    CalkinWilf { value: Fraction },
}

impl TreeState {
    /// Computes the state of the node at the end of `path` from the root.
    pub fn from_path(variant: Variant, path: &RlePath) -> Self {
        variant.initial().descend(path)
    }

    /// Computes the state of `node` from the root, one jump per run of its
    /// path.
    pub fn from_node(variant: Variant, node: &NodeId) -> Self {
        Self::from_path(variant, node.path())
    }

    pub fn variant(&self) -> Variant {
        match self {
            TreeState::SternBrocot { .. } => Variant::SternBrocot,
            TreeState::CalkinWilf { .. } => Variant::CalkinWilf,
        }
    }

    /// The rational at this node.
    pub fn value(&self) -> Fraction {
        match self {
            TreeState::SternBrocot { lo, hi } => lo.mediant(hi),
            TreeState::CalkinWilf { value } => value.clone(),
        }
    }

    /// The states of the left and right children.
    pub fn children(self) -> (TreeState, TreeState) {
        (self.clone().descend_left(1), self.descend_right(1))
    }

    /// Takes `k` left steps at once.
    pub fn descend_left(self, k: u64) -> Self {
        if k == 0 {
            return self;
        }
        let next = match self {
            TreeState::SternBrocot { lo, hi } => {
                let hi = lo.scale_add(k, &hi);
                TreeState::SternBrocot { lo, hi }
            }
            TreeState::CalkinWilf { value } => TreeState::CalkinWilf {
                value: Fraction {
                    den: &value.num * k + &value.den,
                    num: value.num,
                },
            },
        };
        next.checked()
    }

    /// Takes `k` right steps at once.
    pub fn descend_right(self, k: u64) -> Self {
        if k == 0 {
            return self;
        }
        let next = match self {
            TreeState::SternBrocot { lo, hi } => {
                let lo = hi.scale_add(k, &lo);
                TreeState::SternBrocot { lo, hi }
            }
            TreeState::CalkinWilf { value } => TreeState::CalkinWilf {
                value: Fraction {
                    num: &value.den * k + &value.num,
                    den: value.den,
                },
            },
        };
        next.checked()
    }

    /// Takes `k` steps in direction `step`.
    pub fn descend_by(self, step: Step, k: u64) -> Self {
        match step {
            Step::Left => self.descend_left(k),
            Step::Right => self.descend_right(k),
        }
    }

    /// Follows every run of `path`, one closed-form jump per run.
    pub fn descend(self, path: &RlePath) -> Self {
        path.items()
            .fold(self, |state, (step, count)| state.descend_by(step, count))
    }

    /// The parent's state, or `None` at the root.
    ///
    /// Which boundary to undo is read off the state itself: the one that
    /// was replaced last is always the heavier one.
    pub fn parent(&self) -> Option<Self> {
        let next = match self {
            TreeState::SternBrocot { lo, hi } => match lo.weight().cmp(&hi.weight()) {
                std::cmp::Ordering::Less => TreeState::SternBrocot {
                    lo: lo.clone(),
                    hi: hi.sub(lo),
                },
                std::cmp::Ordering::Greater => TreeState::SternBrocot {
                    lo: lo.sub(hi),
                    hi: hi.clone(),
                },
                std::cmp::Ordering::Equal => return None,
            },
            TreeState::CalkinWilf { value } => match value.num.cmp(&value.den) {
                std::cmp::Ordering::Less => TreeState::CalkinWilf {
                    value: Fraction {
                        num: value.num.clone(),
                        den: &value.den - &value.num,
                    },
                },
                std::cmp::Ordering::Greater => TreeState::CalkinWilf {
                    value: Fraction {
                        num: &value.num - &value.den,
                        den: value.den.clone(),
                    },
                },
                std::cmp::Ordering::Equal => return None,
            },
        };
        Some(next.checked())
    }

    /// The state of the next node on the same layer, or `None` if this is
    /// the last node of its layer.
    pub fn next_sibling(&self) -> Option<Self> {
        let next = match self {
            TreeState::SternBrocot { lo, hi } => {
                if hi.is_infinite() {
                    return None;
                }
                let j = (lo.weight() - 1u32) / hi.weight();
                let k = (j << 1u32) + 1u32;
                TreeState::SternBrocot {
                    lo: hi.clone(),
                    hi: hi.scale_sub(&k, lo),
                }
            }
            TreeState::CalkinWilf { value } => {
                if value.den.is_one() {
                    return None;
                }
                let k = ((&value.num / &value.den) << 1u32) + 1u32;
                TreeState::CalkinWilf {
                    value: Fraction {
                        num: value.den.clone(),
                        den: &k * &value.den - &value.num,
                    },
                }
            }
        };
        Some(next.checked())
    }

    /// The state of the previous node on the same layer, or `None` if this
    /// is the first node of its layer.
    pub fn prev_sibling(&self) -> Option<Self> {
        let prev = match self {
            TreeState::SternBrocot { lo, hi } => {
                if lo.num.is_zero() {
                    return None;
                }
                let j = (hi.weight() - 1u32) / lo.weight();
                let k = (j << 1u32) + 1u32;
                TreeState::SternBrocot {
                    lo: lo.scale_sub(&k, hi),
                    hi: lo.clone(),
                }
            }
            TreeState::CalkinWilf { value } => {
                if value.num.is_one() {
                    return None;
                }
                let k = ((&value.den / &value.num) << 1u32) + 1u32;
                TreeState::CalkinWilf {
                    value: Fraction {
                        num: &k * &value.num - &value.den,
                        den: value.num.clone(),
                    },
                }
            }
        };
        Some(prev.checked())
    }

    /// Returns `true` if the state satisfies the determinant invariant:
    /// `hi.num * lo.den - lo.num * hi.den == 1` for Stern-Brocot, and a
    /// value in lowest terms for Calkin-Wilf.
    pub fn is_unimodular(&self) -> bool {
        match self {
            TreeState::SternBrocot { lo, hi } => {
                &hi.num * &lo.den == &lo.num * &hi.den + 1u32
            }
            TreeState::CalkinWilf { value } => value.num.gcd(&value.den).is_one(),
        }
    }

    fn checked(self) -> Self {
        debug_assert!(self.is_unimodular(), "broken tree state: {:?}", self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(num: u32, den: u32) -> Fraction {
        Fraction::new(num, den)
    }

    fn sb(path: &str) -> TreeState {
        TreeState::from_path(Variant::SternBrocot, &path.parse().unwrap())
    }

    fn cw(path: &str) -> TreeState {
        TreeState::from_path(Variant::CalkinWilf, &path.parse().unwrap())
    }

    #[test]
    fn stern_brocot_left_spine() {
        let root = Variant::SternBrocot.initial();
        assert_eq!(
            root,
            TreeState::SternBrocot {
                lo: frac(0, 1),
                hi: frac(1, 0)
            }
        );
        assert_eq!(root.value(), frac(1, 1));
        assert_eq!(sb("L").value(), frac(1, 2));
        assert_eq!(sb("L2").value(), frac(1, 3));
        assert_eq!(sb("L3").value(), frac(1, 4));
        assert_eq!(sb("R3").value(), frac(4, 1));
    }

    #[test]
    fn stern_brocot_values() {
        assert_eq!(sb("RL").value(), frac(3, 2));
        assert_eq!(sb("RL2").value(), frac(4, 3));
        assert_eq!(sb("RL3").value(), frac(5, 4));
        assert_eq!(sb("RLR2").value(), frac(7, 4));
        assert_eq!(sb("LRL").value(), frac(3, 5));
    }

    #[test]
    fn calkin_wilf_values() {
        assert_eq!(cw("I").value(), frac(1, 1));
        assert_eq!(cw("L").value(), frac(1, 2));
        assert_eq!(cw("R").value(), frac(2, 1));
        assert_eq!(cw("RL").value(), frac(2, 3));
        assert_eq!(cw("LR").value(), frac(3, 2));
        assert_eq!(cw("L2R").value(), frac(4, 3));
    }

    #[test]
    fn jumps_match_single_steps() {
        for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
            let mut stepped = variant.initial();
            for _ in 0..7 {
                stepped = stepped.descend_left(1);
            }
            stepped = stepped.descend_right(1).descend_right(1);
            let jumped = variant.initial().descend_left(7).descend_right(2);
            assert_eq!(stepped, jumped);
        }
    }

    #[test]
    fn parent_undoes_descend() {
        for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
            let path: RlePath = "RL3R2LR".parse().unwrap();
            let mut state = TreeState::from_path(variant, &path);
            let mut prefix = path.clone();
            while !prefix.is_empty() {
                prefix.right_shift(1);
                state = state.parent().unwrap();
                assert_eq!(state, TreeState::from_path(variant, &prefix));
            }
            assert_eq!(state.parent(), None);
        }
    }

    #[test]
    fn siblings_walk_the_layer() {
        let sb_layer = ["L3", "L2R", "LRL", "LR2", "RL2", "RLR", "R2L", "R3"];
        for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
            let mut state = TreeState::from_path(variant, &sb_layer[0].parse().unwrap());
            assert_eq!(state.prev_sibling(), None);
            for path in &sb_layer[1..] {
                state = state.next_sibling().unwrap();
                assert_eq!(state, TreeState::from_path(variant, &path.parse().unwrap()));
            }
            assert_eq!(state.next_sibling(), None);

            for path in sb_layer[..7].iter().rev() {
                state = state.prev_sibling().unwrap();
                assert_eq!(state, TreeState::from_path(variant, &path.parse().unwrap()));
            }
        }
    }

    #[test]
    fn root_has_no_siblings() {
        for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
            assert_eq!(variant.initial().next_sibling(), None);
            assert_eq!(variant.initial().prev_sibling(), None);
        }
    }

    #[test]
    fn deep_jump_stays_exact() {
        let state = Variant::SternBrocot.initial().descend_left(1_000_000);
        assert_eq!(state.value(), frac(1, 1_000_001));
        assert!(state.is_unimodular());
        let next = state.next_sibling().unwrap();
        assert_eq!(next.value(), frac(2, 1_999_999));
    }

    #[test]
    fn parse_fraction() {
        assert_eq!("5/4".parse::<Fraction>(), Ok(frac(5, 4)));
        assert_eq!(" 7 / 2 ".parse::<Fraction>(), Ok(frac(7, 2)));
        assert_eq!("3".parse::<Fraction>(), Ok(frac(3, 1)));
        assert!("1/0".parse::<Fraction>().is_err());
        assert_eq!(
            "0/3".parse::<Fraction>(),
            Err(Error::MalformedFraction("numerator is zero"))
        );
        assert!("0".parse::<Fraction>().is_err());
        assert!("-1/2".parse::<Fraction>().is_err());
        assert!("x".parse::<Fraction>().is_err());
    }
}
