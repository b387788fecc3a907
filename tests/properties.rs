//! Property tests over the public API.
//!
//! 1. RleInt agrees with BigUint on conversion, addition and subtraction.
//! 2. Children and ancestors undo each other.
//! 3. States stay unimodular along any walk, and agree with their
//!    continued fractions.
//! 4. Continued fractions survive a trip through the tree.
//! 5. The locator returns the same state whatever it has cached.

use mediant::cf;
use mediant::{
    CacheLimits, Fraction, Locator, NodeId, RleInt, RlePath, Step, TreeState, Variant,
};
use num_bigint::BigUint;
use num_rational::Ratio;
use num_traits::{One, Zero};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn biguint() -> impl Strategy<Value = BigUint> {
    prop::collection::vec(any::<u8>(), 0..40).prop_map(|bytes| BigUint::from_bytes_be(&bytes))
}

/// Numbers with long runs, which random bytes almost never produce.
fn runny() -> impl Strategy<Value = BigUint> {
    prop::collection::vec(1u64..300, 0..10)
        .prop_map(|runs| RleInt::from_runs(runs).to_biguint())
}

fn variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::SternBrocot), Just(Variant::CalkinWilf)]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![Just(Step::Left), Just(Step::Right)]
}

fn path() -> impl Strategy<Value = RlePath> {
    prop::collection::vec((step(), 1u64..64), 0..12).prop_map(|items| {
        let mut path = RlePath::root();
        for (step, count) in items {
            path.push(step, count);
        }
        path
    })
}

fn node() -> impl Strategy<Value = NodeId> {
    path().prop_map(NodeId::from_path)
}

/// Continued fractions of positive rationals in canonical form: the last
/// coefficient of a fraction with two or more terms is at least 2.
fn continued_fraction() -> impl Strategy<Value = Vec<u64>> {
    prop_oneof![
        (1u64..50).prop_map(|a| vec![a]),
        (0u64..50, prop::collection::vec(1u64..50, 0..8), 2u64..50).prop_map(
            |(first, middle, last)| {
                let mut cf = vec![first];
                cf.extend(middle);
                cf.push(last);
                cf
            }
        ),
    ]
}

fn big(v: &[u64]) -> Vec<BigUint> {
    v.iter().map(|&a| BigUint::from(a)).collect()
}

/// Evaluates a continued fraction with exact rationals.
fn as_ratio(cf: &[BigUint]) -> Ratio<BigUint> {
    let mut acc: Option<Ratio<BigUint>> = None;
    for a in cf.iter().rev() {
        let a = Ratio::from_integer(a.clone());
        acc = Some(match acc {
            Some(tail) => a + tail.recip(),
            None => a,
        });
    }
    acc.unwrap_or_else(Ratio::zero)
}

fn to_ratio(value: &Fraction) -> Ratio<BigUint> {
    Ratio::new(value.num.clone(), value.den.clone())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. RleInt arithmetic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rle_roundtrip(n in prop_oneof![biguint(), runny()]) {
        let rle = RleInt::from_biguint(&n);
        prop_assert_eq!(rle.to_biguint(), n.clone());
        prop_assert_eq!(rle.size(), n.bits());

        // rebuilt from runs alone, without the cached value
        let rebuilt = RleInt::from_runs(rle.runs().to_vec());
        prop_assert_eq!(rebuilt.as_biguint(), &n);
        prop_assert_eq!(rebuilt, rle);
    }

    #[test]
    fn rle_add_sub(a in prop_oneof![biguint(), runny()], b in prop_oneof![biguint(), runny()]) {
        let (ra, rb) = (RleInt::from_biguint(&a), RleInt::from_biguint(&b));

        prop_assert_eq!((&ra + &rb).to_biguint(), &a + &b);
        prop_assert_eq!(ra.cmp(&rb), a.cmp(&b));

        match ra.checked_sub(&rb) {
            Some(diff) => prop_assert_eq!(diff.to_biguint(), &a - &b),
            None => prop_assert!(a < b),
        }

        let (ord, dist) = ra.cmp_sub(&rb);
        prop_assert_eq!(ord, a.cmp(&b));
        let expected = if a >= b { &a - &b } else { &b - &a };
        prop_assert_eq!(dist.to_biguint(), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Ancestry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn children_know_their_parent(node in node()) {
        prop_assert_eq!(node.left_child().parent().unwrap(), node.clone());
        prop_assert_eq!(node.right_child().parent().unwrap(), node.clone());
        prop_assert!(node.left_child() < node.right_child());
    }

    #[test]
    fn ancestors_are_prefixes(node in node(), up in 0u64..1000) {
        let up = up % (node.depth() + 1);
        let ancestor = node.nth_ancestor(up).unwrap();

        prop_assert_eq!(ancestor.depth(), node.depth() - up);
        prop_assert!(node.has_prefix(&ancestor));
        prop_assert_eq!(node.index().to_biguint() >> up, ancestor.index().to_biguint());

        let below = node.relative_to(&ancestor).unwrap();
        let mut path = ancestor.into_path();
        for (step, count) in below.items() {
            path.push(step, count);
        }
        prop_assert_eq!(NodeId::from_path(path), node.clone());

        prop_assert!(node.nth_ancestor(node.depth() + 1).is_err());
    }

    #[test]
    fn layer_index_roundtrip(node in node()) {
        let index = node.index().to_biguint();
        prop_assert_eq!(NodeId::from_layer_index(node.depth(), &index).unwrap(), node.clone());

        let bfs = node.bfs_index();
        prop_assert_eq!(NodeId::from_bfs_index(&bfs).unwrap(), node.clone());
    }

    #[test]
    fn paths_print_and_parse(path in path()) {
        let printed = path.to_string();
        prop_assert_eq!(printed.parse::<RlePath>().unwrap(), path);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. States along walks
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn walks_stay_unimodular(variant in variant(), node in node()) {
        let mut state = variant.initial();
        for (step, count) in node.path().items() {
            state = state.descend_by(step, count);
            prop_assert!(state.is_unimodular());
        }

        let value = state.value();
        let cf = node.to_continued_fraction(variant);
        prop_assert_eq!(to_ratio(&value), as_ratio(&cf));
        prop_assert_eq!(cf::evaluate(&cf), value);
    }

    #[test]
    fn siblings_match_layer_order(variant in variant(), node in node()) {
        let state = TreeState::from_node(variant, &node);

        match (node.next(), state.next_sibling()) {
            (Ok(next), Some(s)) => prop_assert_eq!(s, TreeState::from_node(variant, &next)),
            (Err(_), None) => prop_assert!(node.is_last_node()),
            (next, s) => prop_assert!(false, "next {:?} but sibling {:?}", next, s),
        }
        match (node.prev(), state.prev_sibling()) {
            (Ok(prev), Some(s)) => prop_assert_eq!(s, TreeState::from_node(variant, &prev)),
            (Err(_), None) => prop_assert!(node.is_first_node()),
            (prev, s) => prop_assert!(false, "prev {:?} but sibling {:?}", prev, s),
        }

        if !node.is_root() {
            let parent = state.parent().unwrap();
            prop_assert_eq!(parent, TreeState::from_node(variant, &node.parent().unwrap()));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Continued fractions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn continued_fraction_roundtrip(variant in variant(), cf in continued_fraction()) {
        let cf = big(&cf);
        let node = NodeId::from_continued_fraction(variant, &cf, u64::MAX).unwrap();

        let depth: BigUint = cf.iter().sum::<BigUint>() - 1u32;
        prop_assert_eq!(BigUint::from(node.depth()), depth);
        prop_assert_eq!(node.to_continued_fraction(variant), cf.clone());
        prop_assert_eq!(to_ratio(&node.value(variant)), as_ratio(&cf));
    }

    #[test]
    fn every_ratio_has_a_node(variant in variant(), p in 1u64..1_000_000, q in 1u64..1_000_000) {
        let value = Fraction::new(p, q);
        let node = NodeId::from_ratio(variant, &value, u64::MAX).unwrap();
        let expected = Ratio::new(BigUint::from(p), BigUint::from(q));
        prop_assert_eq!(to_ratio(&node.value(variant)), expected);
    }

    #[test]
    fn capped_nodes_are_ancestors(
        variant in variant(),
        cf in continued_fraction(),
        cap in 0u64..40,
    ) {
        let cf = big(&cf);
        let full = NodeId::from_continued_fraction(variant, &cf, u64::MAX).unwrap();

        match NodeId::from_continued_fraction(variant, &cf, cap) {
            Ok(node) => {
                prop_assert!(full.depth() <= cap);
                prop_assert_eq!(node, full);
            }
            Err(mediant::Error::PrecisionCapped { truncated, .. }) => {
                prop_assert!(full.depth() > cap);
                prop_assert_eq!(truncated.depth(), cap);
                prop_assert!(full.has_prefix(&truncated));
            }
            Err(err) => prop_assert!(false, "unexpected {}", err),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Locator
// ═════════════════════════════════════════════════════════════════════════

fn mv() -> impl Strategy<Value = mediant::Move> {
    use mediant::Move;
    prop_oneof![
        Just(Move::Parent),
        Just(Move::LeftChild),
        Just(Move::RightChild),
        Just(Move::Next),
        Just(Move::Prev),
    ]
}

proptest! {
    #[test]
    fn locator_is_transparent(
        variant in variant(),
        start in node(),
        moves in prop::collection::vec(prop::collection::vec(mv(), 1..6), 1..30),
        depth_delta in 0u64..6,
        sibling_delta in 0u64..6,
    ) {
        let limits = CacheLimits { max_depth_delta: depth_delta, max_sibling_delta: sibling_delta };
        let mut locator = Locator::new(variant, limits);

        let mut node = start;
        for hop in moves {
            for m in hop {
                // edges of the tree are skipped
                if let Ok(next) = node.step(m) {
                    node = next;
                }
            }
            let state = locator.locate(&node);
            prop_assert_eq!(state, TreeState::from_node(variant, &node));
        }

        let stats = locator.stats();
        prop_assert!(stats.misses >= 1);
        prop_assert!(stats.sibling_steps <= sibling_delta * stats.hits);
    }
}

#[test]
fn root_continued_fraction() {
    for variant in [Variant::SternBrocot, Variant::CalkinWilf] {
        let root = NodeId::root();
        assert_eq!(root.to_continued_fraction(variant), vec![BigUint::one()]);
        assert_eq!(root.value(variant), Fraction::one());
    }
}
