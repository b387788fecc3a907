//! Tunables for the locator and the viewport traversal.

/// Deepest node that [NodeId::from_continued_fraction](crate::NodeId::from_continued_fraction)
/// builds before truncating, when going through a [TreeView](crate::view::TreeView).
pub const DEFAULT_MAX_CF_DEPTH: u64 = 1 << 20;

/// How far the locator will walk from its cached node before it gives up
/// and recomputes from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Most parent steps taken to bring the cached node up to the target's
    /// depth.
    pub max_depth_delta: u64,
    /// Most sibling steps taken along the cached node's layer.
    pub max_sibling_delta: u64,
}

impl Default for CacheLimits {
    fn default() -> Self {
        CacheLimits {
            max_depth_delta: 8,
            max_sibling_delta: 8,
        }
    }
}

/// Configuration of a [TreeView](crate::view::TreeView).
///
/// ```rust
/// use mediant::config::{CacheLimits, ViewConfig};
///
/// let config = ViewConfig::default()
///     .with_min_node_width(4.0)
///     .with_cache(CacheLimits { max_depth_delta: 16, max_sibling_delta: 32 });
/// assert_eq!(config.min_node_width, 4.0);
/// assert_eq!(config.cache.max_sibling_delta, 32);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub cache: CacheLimits,
    /// Depth at which nodes built from continued fractions are cut off.
    pub max_cf_depth: u64,
    /// Nodes narrower than this many pixels are not expanded.
    pub min_node_width: f64,
    /// Side of a square bucket in the picking index, in pixels.
    pub spatial_bucket: f64,
    /// Reuse the previous frame's frontier when the new one lies within it.
    pub reuse_frontier: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            cache: CacheLimits::default(),
            max_cf_depth: DEFAULT_MAX_CF_DEPTH,
            min_node_width: 10.0,
            spatial_bucket: 10.0,
            reuse_frontier: true,
        }
    }
}

impl ViewConfig {
    pub fn with_cache(mut self, cache: CacheLimits) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_max_cf_depth(mut self, depth: u64) -> Self {
        self.max_cf_depth = depth;
        self
    }

    pub fn with_min_node_width(mut self, width: f64) -> Self {
        self.min_node_width = width;
        self
    }

    pub fn with_spatial_bucket(mut self, size: f64) -> Self {
        self.spatial_bucket = size;
        self
    }

    pub fn with_reuse_frontier(mut self, reuse: bool) -> Self {
        self.reuse_frontier = reuse;
        self
    }
}
