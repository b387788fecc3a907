//! Walking the part of a tree that is visible in a viewport.
//!
//! The tree is laid out in a square of tree units: the root spans the
//! whole width, each layer below splits every node in two. A viewport is a
//! window onto that square at some scale, described to the traversal by
//! the [VisibleRange] trait. [Window] is the fixed-point implementation
//! used by interactive front ends.
//!
//! A frame starts from the shallowest visible layer. The nodes of that
//! layer that intersect the viewport (the frontier) are found through the
//! [Locator], so a frame that only moved a little reuses the previous
//! frame's work. From each frontier node the visible subtree is expanded
//! depth first until nodes get too small to draw or fall off the canvas.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};
use tracing::{debug, debug_span};

use crate::config::ViewConfig;
use crate::error::{Error, Result};
use crate::locate::{LocateStats, Locator};
use crate::path::Step;
use crate::spatial::{Rect, SpatialIndex};
use crate::state::{Fraction, TreeState, Variant};
use crate::NodeId;

/// Tree units per canvas height at scale `SIZE`.
pub const SIZE: u64 = 1 << 16;

/// Smallest scale a [Window] zooms out to.
pub const MIN_SCALE: u64 = SIZE * 9 / 10;

/// Scale of a freshly reset [Window].
pub const INITIAL_SCALE: u64 = SIZE * 97 / 100;

/// Largest zoom applied by one [Window::zoom] call, as a power of two.
pub const MAX_ZOOM_STEP: f64 = 4096.0;

/// Multiplies by `2^shift`, flooring when `shift` is negative.
fn shift_by<T>(value: T, shift: i64) -> T
where
    T: std::ops::Shl<u64, Output = T> + std::ops::Shr<u64, Output = T>,
{
    if shift >= 0 {
        value << shift as u64
    } else {
        value >> shift.unsigned_abs()
    }
}

/// What the traversal needs to know about the viewport.
///
/// Layer indices are in the same numbering as
/// [NodeId::from_layer_index]; pixel quantities are in canvas pixels with
/// the origin at the top left.
pub trait VisibleRange {
    /// The shallowest layer with any part on the canvas.
    fn min_depth(&self) -> u64;

    /// The deepest layer drawn, if any.
    fn max_depth(&self) -> Option<u64> {
        None
    }

    /// Index of the leftmost node of layer `depth` that is on the canvas,
    /// clamped into the layer.
    fn first_index(&self, depth: u64) -> BigUint;

    /// Index of the rightmost node of layer `depth` that is on the canvas,
    /// clamped into the layer.
    fn last_index(&self, depth: u64) -> BigUint;

    /// Width of a node of layer `depth`.
    fn node_width(&self, depth: u64) -> f64;

    /// Left edge of `node`.
    fn node_x(&self, node: &NodeId) -> f64;

    /// Vertical centre of the nodes of layer `depth`.
    fn layer_y(&self, depth: u64) -> f64;

    fn canvas_width(&self) -> f64;

    fn canvas_height(&self) -> f64;
}

/// A pannable, zoomable window onto the tree.
///
/// Positions are kept in integer tree units so that zooming in by any
/// amount stays exact: at scale `s` the root is `s` units wide and a
/// canvas height spans [SIZE] units.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    width: f64,
    height: f64,
    scale: BigUint,
    origin_x: BigInt,
    origin_y: BigInt,
}

impl Window {
    /// Creates a window over a `width` by `height` pixel canvas, showing the
    /// whole tree.
    pub fn new(width: f64, height: f64) -> Self {
        let mut window = Window {
            width: width.max(1.0),
            height: height.max(1.0),
            scale: BigUint::zero(),
            origin_x: BigInt::zero(),
            origin_y: BigInt::zero(),
        };
        window.reset();
        window
    }

    /// Zooms out to show the whole tree, centred horizontally.
    pub fn reset(&mut self) {
        let scale = BigInt::from(INITIAL_SCALE);
        let canvas_width = self.from_canvas(self.width);
        self.origin_x = -(canvas_width - &scale) / 2u32;
        self.origin_y = scale;
        self.scale = BigUint::from(INITIAL_SCALE);
    }

    /// Changes the canvas size, keeping the top left corner in place.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn scale(&self) -> &BigUint {
        &self.scale
    }

    /// The tree coordinates of the top left corner of the canvas.
    pub fn origin(&self) -> (&BigInt, &BigInt) {
        (&self.origin_x, &self.origin_y)
    }

    /// Moves the window to an explicit position; the scale is clamped to
    /// [MIN_SCALE] and the origin kept within reach of the tree.
    pub fn set_position(&mut self, origin_x: BigInt, origin_y: BigInt, scale: BigUint) {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self.scale = scale.max(BigUint::from(MIN_SCALE));
        self.clamp();
    }

    /// Drags the tree by `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.origin_x -= self.from_canvas(dx);
        self.origin_y += self.from_canvas(dy);
        self.clamp();
    }

    /// Zooms by `2^log2_factor`, keeping the tree point under the canvas
    /// pixel `(anchor_x, anchor_y)` in place.
    ///
    /// A single call zooms by at most `2^MAX_ZOOM_STEP` either way; a
    /// non-finite factor is ignored.
    pub fn zoom(&mut self, log2_factor: f64, anchor_x: f64, anchor_y: f64) {
        // the factor is applied in fixed point with this many fraction bits
        const F: u32 = 5;

        if !log2_factor.is_finite() {
            return;
        }
        let log2_factor = log2_factor.clamp(-MAX_ZOOM_STEP, MAX_ZOOM_STEP);

        let ax = self.from_canvas(anchor_x);
        let ay = self.from_canvas(anchor_y);
        self.origin_x += &ax;
        self.origin_y -= &ay;

        // whole powers of two become shifts; only the fraction goes through f64
        let whole = log2_factor.floor();
        let factor = f64::powf(2.0, F as f64 + (log2_factor - whole)).floor() as u64;
        let shift = whole as i64 - F as i64;
        let scaled = shift_by(&self.scale * factor, shift);
        let min = BigUint::from(MIN_SCALE);
        if scaled < min {
            let old = BigInt::from(self.scale.clone());
            let min_units = BigInt::from(MIN_SCALE);
            self.origin_x = &self.origin_x * &min_units / &old;
            self.origin_y = &self.origin_y * &min_units / &old;
            self.scale = min;
        } else {
            self.origin_x = shift_by(&self.origin_x * factor, shift);
            self.origin_y = shift_by(&self.origin_y * factor, shift);
            self.scale = scaled;
        }

        self.origin_x -= &ax;
        self.origin_y += &ay;
        self.clamp();
    }

    /// Moves and zooms so that `node` sits in the middle of the canvas at
    /// a quarter of its height.
    pub fn center_on(&mut self, node: &NodeId) {
        let depth = node.depth();
        let layer_height = self.from_canvas(self.height / 4.0);
        let scale = layer_height.to_biguint().unwrap_or_default() << (depth + 1);
        let scale = scale.max(BigUint::from(MIN_SCALE));

        let layer_height = BigInt::from(&scale >> (depth + 1));
        let x_mid = BigInt::from((node.index().as_biguint() * &scale) >> depth) + &layer_height;
        let y_mid = &layer_height + &layer_height / 2u32;

        let origin_x = x_mid - self.from_canvas(self.width / 2.0);
        let origin_y = self.from_canvas(self.height / 2.0) - y_mid;
        self.set_position(origin_x, origin_y, scale);
    }

    /// The tree coordinates under canvas pixel `(x, y)`.
    pub fn to_tree(&self, x: f64, y: f64) -> (BigInt, BigInt) {
        (
            &self.origin_x + self.from_canvas(x),
            &self.origin_y - self.from_canvas(y),
        )
    }

    fn clamp(&mut self) {
        let min = BigInt::from(MIN_SCALE);
        let max = BigInt::from(self.scale.clone()) + &min;
        if self.origin_y < min {
            self.origin_y = min;
        } else if self.origin_y > max {
            self.origin_y = max;
        }
    }

    fn to_canvas(&self, units: &BigInt) -> f64 {
        units.to_f64().unwrap_or(0.0) * self.height / SIZE as f64
    }

    fn from_canvas(&self, px: f64) -> BigInt {
        BigInt::from((px * SIZE as f64 / self.height).floor() as i64)
    }

    /// The index of the node of layer `depth` under tree coordinate `x`,
    /// clamped into the layer.
    fn index_at(&self, x: &BigInt, depth: u64) -> BigUint {
        let index = (x << depth) / BigInt::from(self.scale.clone());
        let end = BigUint::one() << depth;
        match index.to_biguint() {
            Some(index) if index < end => index,
            Some(_) => end - 1u32,
            None => BigUint::zero(),
        }
    }
}

impl VisibleRange for Window {
    fn min_depth(&self) -> u64 {
        // layers whose bottom edge is above the canvas are skipped
        let ratio = match self.origin_y.to_biguint() {
            Some(y) if !y.is_zero() => &self.scale / y,
            _ => return 0,
        };
        ratio.bits().saturating_sub(2)
    }

    fn first_index(&self, depth: u64) -> BigUint {
        self.index_at(&self.origin_x, depth)
    }

    fn last_index(&self, depth: u64) -> BigUint {
        let right = &self.origin_x + self.from_canvas(self.width);
        self.index_at(&right, depth)
    }

    fn node_width(&self, depth: u64) -> f64 {
        self.to_canvas(&BigInt::from(&self.scale >> depth))
    }

    fn node_x(&self, node: &NodeId) -> f64 {
        let start = (node.index().as_biguint() * &self.scale) >> node.depth();
        self.to_canvas(&(BigInt::from(start) - &self.origin_x))
    }

    fn layer_y(&self, depth: u64) -> f64 {
        let half = BigInt::from(&self.scale >> (depth + 1));
        self.to_canvas(&(&self.origin_y - &half)) - self.to_canvas(&half) * 0.5
    }

    fn canvas_width(&self) -> f64 {
        self.width
    }

    fn canvas_height(&self) -> f64 {
        self.height
    }
}

/// How a visible node relates to the selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// Not on the path to the selected node.
    #[default]
    None,
    /// The selected node itself.
    Final,
    /// On the path; it continues through the left child.
    Left,
    /// On the path; it continues through the right child.
    Right,
}

/// A node placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: NodeId,
    pub value: Fraction,
    /// Left edge.
    pub x: f64,
    /// Vertical centre.
    pub y: f64,
    pub width: f64,
    pub selection: Selection,
}

impl VisibleNode {
    /// The box a renderer draws the node's fraction in: the node's width,
    /// half as tall, centred on `y`.
    pub fn bounds(&self) -> Rect {
        let height = self.width * 0.5;
        Rect::new(self.x, self.y - height * 0.5, self.width, height)
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f64 {
        self.x + self.width * 0.5
    }
}

/// One of the boundary fractions the root of the Stern-Brocot tree is the
/// mediant of, placed at the root's corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub value: Fraction,
    pub x: f64,
    pub y: f64,
}

/// Counters for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Shallowest layer drawn.
    pub min_depth: u64,
    pub nodes: u64,
    /// Nodes in the frontier the subtrees were expanded from.
    pub initial_nodes: u64,
    pub frontier_reused: bool,
    /// Work done by the locator for this frame.
    pub locate: LocateStats,
}

/// Everything visible in one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Visible nodes in drawing order.
    pub nodes: Vec<VisibleNode>,
    pub seeds: Vec<Seed>,
    pub stats: FrameStats,
}

impl Frame {
    /// Builds a picking index over the nodes of this frame.
    pub fn spatial_index(&self, width: f64, height: f64, bucket_size: f64) -> SpatialIndex<NodeId> {
        let mut index = SpatialIndex::new(width, height, bucket_size);
        for node in &self.nodes {
            index.insert(node.id.clone(), node.bounds());
        }
        index
    }

    /// The visible node with the given id, if any.
    pub fn find(&self, id: &NodeId) -> Option<&VisibleNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// The frontier of the last frame, kept for reuse.
#[derive(Debug, Clone)]
struct Frontier {
    variant: Variant,
    depth: u64,
    first: BigUint,
    nodes: Vec<(NodeId, TreeState)>,
}

impl Frontier {
    /// The part of this frontier covering `first..=last` on layer `depth`,
    /// if it covers all of it.
    fn covering(
        &self,
        variant: Variant,
        depth: u64,
        first: &BigUint,
        last: &BigUint,
    ) -> Option<&[(NodeId, TreeState)]> {
        if self.variant != variant || self.depth != depth || first < &self.first {
            return None;
        }
        let start = (first - &self.first).to_usize()?;
        let end = (last - &self.first).to_usize()?.checked_add(1)?;
        self.nodes.get(start..end)
    }
}

/// A node waiting to be drawn.
struct Pending {
    id: NodeId,
    state: TreeState,
    x: f64,
    y: f64,
    width: f64,
    on_path: bool,
}

/// Produces the visible nodes of one tree, frame after frame.
///
/// ```rust
/// use mediant::{TreeView, Variant, ViewConfig, Window};
///
/// let window = Window::new(800.0, 600.0);
/// let mut view = TreeView::new(Variant::SternBrocot, ViewConfig::default());
///
/// let frame = view.frame(&window, None);
/// assert_eq!(frame.nodes[0].value.to_string(), "1/1");
/// assert_eq!(frame.seeds.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TreeView {
    config: ViewConfig,
    locator: Locator,
    frontier: Option<Frontier>,
}

impl TreeView {
    pub fn new(variant: Variant, config: ViewConfig) -> Self {
        TreeView {
            locator: Locator::new(variant, config.cache),
            frontier: None,
            config,
        }
    }

    pub fn variant(&self) -> Variant {
        self.locator.variant()
    }

    /// Switches trees, dropping everything cached for the old one.
    pub fn set_variant(&mut self, variant: Variant) {
        self.locator.set_variant(variant);
        self.frontier = None;
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ViewConfig) {
        self.locator.set_limits(config.cache);
        self.config = config;
    }

    /// Totals over every frame drawn so far.
    pub fn locate_stats(&self) -> LocateStats {
        self.locator.stats()
    }

    /// The state of `node` in the current tree, through the view's cache.
    pub fn locate(&mut self, node: &NodeId) -> TreeState {
        self.locator.locate(node)
    }

    /// Builds the picking index for `frame` over the canvas of `range`,
    /// bucketed as configured.
    pub fn picking_index<R: VisibleRange>(&self, frame: &Frame, range: &R) -> SpatialIndex<NodeId> {
        frame.spatial_index(
            range.canvas_width(),
            range.canvas_height(),
            self.config.spatial_bucket,
        )
    }

    /// Builds a node from a continued fraction and moves `window` onto it.
    ///
    /// Continued fractions deeper than the configured cap yield
    /// [Error::PrecisionCapped]; the window is still moved, onto the
    /// truncated node the error carries.
    pub fn select_continued_fraction(
        &self,
        coefficients: &[BigUint],
        window: &mut Window,
    ) -> Result<NodeId> {
        let node = NodeId::from_continued_fraction(
            self.variant(),
            coefficients,
            self.config.max_cf_depth,
        );
        match &node {
            Ok(node) => window.center_on(node),
            Err(Error::PrecisionCapped { truncated, .. }) => window.center_on(truncated),
            Err(_) => {}
        }
        node
    }

    /// Computes the nodes visible in `range`, marking the path to
    /// `selected`.
    pub fn frame<R: VisibleRange>(&mut self, range: &R, selected: Option<&NodeId>) -> Frame {
        let span = debug_span!("frame", variant = %self.variant());
        let _enter = span.enter();

        let before = self.locator.stats();
        let depth = range.min_depth();
        let mut stats = FrameStats {
            min_depth: depth,
            ..FrameStats::default()
        };

        let frontier = self.frontier(range, depth, &mut stats);
        stats.initial_nodes = frontier.len() as u64;

        // the selected node's ancestor on the frontier layer
        let selected_root =
            selected.and_then(|s| s.nth_ancestor(s.depth().checked_sub(depth)?).ok());

        let width = range.node_width(depth);
        let y = range.layer_y(depth);
        let mut frame = Frame::default();

        let seeds = self.variant().seeds();
        if let (0, Some(seeds), Some((root, _))) = (depth, seeds, frontier.first()) {
            let x = range.node_x(root);
            let seed_y = y - width * 0.05;
            frame.seeds = seeds
                .iter()
                .zip([x, x + width])
                .map(|(value, x)| Seed {
                    value: value.clone(),
                    x,
                    y: seed_y,
                })
                .collect();
        }

        let mut stack: Vec<Pending> = frontier
            .into_iter()
            .map(|(id, state)| Pending {
                x: range.node_x(&id),
                on_path: selected_root.as_ref() == Some(&id),
                id,
                state,
                y,
                width,
            })
            .collect();
        // first frontier node on top
        stack.reverse();

        let canvas_width = range.canvas_width();
        let canvas_height = range.canvas_height();
        let max_depth = range.max_depth();

        while let Some(pending) = stack.pop() {
            let Pending {
                id,
                state,
                x,
                y,
                width,
                on_path,
            } = pending;

            let selection = match (on_path, selected) {
                (true, Some(s)) if s.depth() == id.depth() => Selection::Final,
                (true, Some(s)) => match s.path().step_at(id.depth()) {
                    Some(Step::Left) => Selection::Left,
                    Some(Step::Right) => Selection::Right,
                    None => Selection::None,
                },
                _ => Selection::None,
            };

            let child_width = width * 0.5;
            let child_y = y + child_width * 0.75;
            let expand = child_width >= self.config.min_node_width
                && child_y <= canvas_height
                && max_depth.map_or(true, |max| id.depth() < max);

            let value = state.value();
            if expand {
                let (left, right) = state.children();
                let mid = x + child_width;
                // pushed right first so the left subtree is drawn first
                if mid < canvas_width {
                    stack.push(Pending {
                        id: id.right_child(),
                        state: right,
                        x: mid,
                        y: child_y,
                        width: child_width,
                        on_path: selection == Selection::Right,
                    });
                }
                if mid >= 0.0 {
                    stack.push(Pending {
                        id: id.left_child(),
                        state: left,
                        x,
                        y: child_y,
                        width: child_width,
                        on_path: selection == Selection::Left,
                    });
                }
            }

            frame.nodes.push(VisibleNode {
                id,
                value,
                x,
                y,
                width,
                selection,
            });
        }

        stats.nodes = frame.nodes.len() as u64;
        stats.locate = self.locator.stats().since(&before);
        debug!(
            depth,
            nodes = stats.nodes,
            initial_nodes = stats.initial_nodes,
            frontier_reused = stats.frontier_reused,
            hits = stats.locate.hits,
            misses = stats.locate.misses,
            "frame"
        );
        frame.stats = stats;
        frame
    }

    /// The nodes of layer `depth` that intersect the canvas, with their
    /// states.
    fn frontier<R: VisibleRange>(
        &mut self,
        range: &R,
        depth: u64,
        stats: &mut FrameStats,
    ) -> Vec<(NodeId, TreeState)> {
        let variant = self.variant();
        let first = range.first_index(depth);
        let last = range.last_index(depth).max(first.clone());

        if self.config.reuse_frontier {
            let reused = self
                .frontier
                .as_ref()
                .and_then(|f| f.covering(variant, depth, &first, &last));
            if let Some(nodes) = reused {
                debug!(depth, count = nodes.len(), "reusing frontier");
                stats.frontier_reused = true;
                return nodes.to_vec();
            }
        }

        let mut id = NodeId::from_layer_index(depth, &first)
            .unwrap_or_else(|_| NodeId::last_in_layer(depth));
        let mut state = self.locator.locate(&id);
        let count = (&last - &first).to_u64().unwrap_or(u64::MAX).saturating_add(1);
        let canvas_width = range.canvas_width();

        let mut nodes = Vec::new();
        loop {
            if !nodes.is_empty() && range.node_x(&id) >= canvas_width {
                break;
            }
            nodes.push((id.clone(), state.clone()));
            if nodes.len() as u64 >= count {
                break;
            }
            match (id.next(), state.next_sibling()) {
                (Ok(next_id), Some(next_state)) => {
                    id = next_id;
                    state = next_state;
                }
                _ => break,
            }
        }

        self.frontier = Some(Frontier {
            variant,
            depth,
            first,
            nodes: nodes.clone(),
        });
        nodes
    }
}
