//! Error type shared by every module of the crate.

use crate::NodeId;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable failures of tree navigation and conversion.
///
/// None of these are fatal: they describe a request that has no answer
/// (an ancestor above the root, a sibling past the end of a layer) or
/// input that does not describe a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An ancestor above the root was requested, or two ids at different
    /// depths were compared as siblings.
    #[error("depth {requested} is out of range for a node at depth {depth}")]
    InvalidDepth {
        /// Depth of the node the request was made on.
        depth: u64,
        /// Depth (or number of levels) that was requested.
        requested: u64,
    },

    /// Stepped past the first or last node of a layer.
    #[error("no further node on layer {depth}")]
    EdgeOfLayer {
        /// The layer on which the step was attempted.
        depth: u64,
    },

    /// A path string could not be parsed.
    #[error("malformed path at offset {offset}: {reason}")]
    MalformedPath {
        /// Byte offset of the offending character.
        offset: usize,
        /// What was expected there.
        reason: &'static str,
    },

    /// A continued fraction was deeper than the configured cap. The node
    /// returned in `truncated` is the ancestor of the requested node at
    /// depth `cap`.
    #[error("continued fraction is deeper than {cap} levels; truncated to its ancestor")]
    PrecisionCapped {
        /// The depth cap that was applied.
        cap: u64,
        /// The requested node's ancestor at depth `cap`.
        truncated: Box<NodeId>,
    },

    /// The coefficient list does not describe a positive rational.
    #[error("invalid continued fraction: {0}")]
    InvalidContinuedFraction(&'static str),

    /// A negative integer was given where only naturals are representable.
    #[error("negative integers cannot be run-length encoded")]
    Negative,

    /// A fraction string was not of the form `p/q` with `p, q > 0`.
    #[error("malformed fraction: {0}")]
    MalformedFraction(&'static str),
}
