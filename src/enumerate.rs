//! Breadth-first enumeration of a tree's fractions.

use crate::state::{Fraction, TreeState, Variant};
use crate::NodeId;

/// An endless iterator over the nodes of a tree in breadth-first order,
/// yielding each node with its value.
///
/// Every positive rational appears exactly once. Within a layer the walk
/// steps from sibling to sibling without going back to the root; only the
/// first node of each layer is computed from scratch.
///
/// ```rust
/// use mediant::{Enumeration, Variant};
///
/// let first: Vec<String> = Enumeration::new(Variant::CalkinWilf)
///     .take(7)
///     .map(|(_, value)| value.to_string())
///     .collect();
/// assert_eq!(first, ["1/1", "1/2", "2/1", "1/3", "3/2", "2/3", "3/1"]);
/// ```
#[derive(Debug, Clone)]
pub struct Enumeration {
    variant: Variant,
    node: NodeId,
    state: TreeState,
}

impl Enumeration {
    /// Starts at the root.
    pub fn new(variant: Variant) -> Self {
        Enumeration {
            variant,
            node: NodeId::root(),
            state: variant.initial(),
        }
    }

    /// Starts at `node`, continuing with the nodes after it.
    pub fn starting_at(variant: Variant, node: NodeId) -> Self {
        let state = TreeState::from_node(variant, &node);
        Enumeration {
            variant,
            node,
            state,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl Iterator for Enumeration {
    type Item = (NodeId, Fraction);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, state) = match (self.node.next(), self.state.next_sibling()) {
            (Ok(node), Some(state)) => (node, state),
            _ => {
                let node = NodeId::first_in_layer(self.node.depth() + 1);
                let state = TreeState::from_node(self.variant, &node);
                (node, state)
            }
        };

        let node = std::mem::replace(&mut self.node, node);
        let value = std::mem::replace(&mut self.state, state).value();
        Some((node, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use std::collections::HashSet;

    fn values(it: impl Iterator<Item = (NodeId, Fraction)>, n: usize) -> Vec<String> {
        it.take(n).map(|(_, v)| v.to_string()).collect()
    }

    #[test]
    fn stern_brocot_order() {
        let got = values(Enumeration::new(Variant::SternBrocot), 7);
        assert_eq!(got, ["1/1", "1/2", "2/1", "1/3", "2/3", "3/2", "3/1"]);
    }

    #[test]
    fn nodes_are_numbered_breadth_first() {
        for (n, (node, value)) in Enumeration::new(Variant::SternBrocot).take(300).enumerate() {
            assert_eq!(node.bfs_index(), BigUint::from(n + 1));
            assert_eq!(value, node.value(Variant::SternBrocot));
        }
    }

    #[test]
    fn resumes_mid_layer() {
        let start: NodeId = "RL2".parse().unwrap();
        let got: Vec<String> = Enumeration::starting_at(Variant::SternBrocot, start)
            .take(6)
            .map(|(node, _)| node.to_string())
            .collect();
        assert_eq!(got, ["RL2", "RLR", "R2L", "R3", "L4", "L3R"]);
    }

    #[test]
    fn no_value_repeats() {
        let mut seen = HashSet::new();
        for (_, value) in Enumeration::new(Variant::CalkinWilf).take(1023) {
            assert!(seen.insert(value.to_string()), "{} repeated", value);
        }
    }
}
