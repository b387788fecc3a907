//! Root-to-node paths stored as run lengths.
//!
//! A path alternates runs of right and left steps, starting with a run of
//! rights which may be empty: `RRLLLR` is stored as `[2, 3, 1]` and `LLR`
//! as `[0, 2, 1]`. Read as binary with `R = 1` and `L = 0`, the path of a
//! node is its index within its layer, counted from the left.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::rle::RleInt;

/// A single step down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Towards the smaller child; a `0` bit.
    Left,
    /// Towards the larger child; a `1` bit.
    Right,
}

impl Step {
    /// The bit this step contributes to a layer index.
    pub fn bit(self) -> bool {
        self == Step::Right
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Step::Right
        } else {
            Step::Left
        }
    }

    /// The letter used for this step in path strings.
    pub fn letter(self) -> char {
        match self {
            Step::Left => 'L',
            Step::Right => 'R',
        }
    }

    pub(crate) fn of_run(i: usize) -> Self {
        if i % 2 == 0 {
            Step::Right
        } else {
            Step::Left
        }
    }
}

impl std::ops::Not for Step {
    type Output = Step;

    fn not(self) -> Step {
        match self {
            Step::Left => Step::Right,
            Step::Right => Step::Left,
        }
    }
}

/// A path from the root, stored as alternating runs of steps.
///
/// ```rust
/// use mediant::RlePath;
///
/// let path: RlePath = "LLR3L".parse().unwrap();
/// assert_eq!(path.runs(), &[0, 2, 3, 1]);
/// assert_eq!(path.size(), 6);
/// assert_eq!(path.to_string(), "L2R3L");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RlePath {
    runs: Vec<u64>,
    size: u64,
}

impl RlePath {
    /// The empty path, which leads to the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from raw runs, the first of which counts right steps.
    pub fn from_runs<I: IntoIterator<Item = u64>>(runs: I) -> Self {
        let mut path = Self::root();
        for (i, count) in runs.into_iter().enumerate() {
            path.push(Step::of_run(i), count);
        }
        path
    }

    /// Builds the path of the node at `index` within layer `depth`.
    ///
    /// Fails with [Error::EdgeOfLayer] if `index` does not fit in `depth` bits.
    pub fn from_index(depth: u64, index: &RleInt) -> Result<Self> {
        if index.size() > depth {
            return Err(Error::EdgeOfLayer { depth });
        }
        let mut path = Self::root();
        path.push(Step::Left, depth - index.size());
        for (bit, count) in index.segments() {
            path.push(Step::from_bit(bit), count);
        }
        Ok(path)
    }

    /// Returns the raw runs, starting with a (possibly empty) run of rights.
    pub fn runs(&self) -> &[u64] {
        &self.runs
    }

    /// Iterates the non-empty runs as `(step, count)` pairs, from the root.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = (Step, u64)> + '_ {
        self.runs
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(i, &count)| (Step::of_run(i), count))
    }

    /// Number of steps, i.e. the depth of the node this path leads to.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The final step, or `None` for the root.
    pub fn last_step(&self) -> Option<Step> {
        match self.runs.len() {
            0 => None,
            n => Some(Step::of_run(n - 1)),
        }
    }

    /// The step taken at `depth` (0 is the step out of the root).
    pub fn step_at(&self, depth: u64) -> Option<Step> {
        let mut seen = 0;
        for (i, &count) in self.runs.iter().enumerate() {
            seen += count;
            if depth < seen {
                return Some(Step::of_run(i));
            }
        }
        None
    }

    /// Extends the path by `count` copies of `step`.
    pub fn push(&mut self, step: Step, count: u64) {
        if count == 0 {
            return;
        }
        match self.last_step() {
            Some(last) if last == step => {
                if let Some(run) = self.runs.last_mut() {
                    *run += count;
                }
            }
            None if step == Step::Left => self.runs.extend([0, count]),
            _ => self.runs.push(count),
        }
        self.size += count;
    }

    /// Removes the last `n` steps; removing more than there are yields the
    /// root.
    pub fn right_shift(&mut self, n: u64) {
        if n >= self.size {
            *self = Self::root();
            return;
        }
        self.size -= n;

        let mut n = n;
        while n > 0 {
            match self.runs.last_mut() {
                Some(last) if *last <= n => {
                    n -= *last;
                    self.runs.pop();
                }
                Some(last) => {
                    *last -= n;
                    n = 0;
                }
                None => break,
            }
        }
    }

    /// Reverses the order of the steps.
    ///
    /// The Calkin-Wilf path of a rational is the reverse of its
    /// Stern-Brocot path.
    pub fn reverse(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        if self.last_step() == Some(Step::Left) {
            self.runs.push(0);
        }
        self.runs.reverse();
        if self.runs.last() == Some(&0) {
            self.runs.pop();
        }
    }

    /// Returns the last `n` steps as a new path.
    ///
    /// ```rust
    /// use mediant::RlePath;
    ///
    /// let path: RlePath = "R2L3R".parse().unwrap();
    /// assert_eq!(path.suffix(3).to_string(), "L2R");
    /// ```
    pub fn suffix(&self, n: u64) -> Self {
        if n >= self.size {
            return self.clone();
        }

        let mut kept = Vec::new();
        let mut remaining = n;
        for (step, count) in self.items().rev() {
            if remaining == 0 {
                break;
            }
            let take = count.min(remaining);
            kept.push((step, take));
            remaining -= take;
        }

        let mut out = Self::root();
        for (step, count) in kept.into_iter().rev() {
            out.push(step, count);
        }
        out
    }

    /// Returns `true` if `prefix` is the leading part of this path.
    pub fn has_prefix(&self, prefix: &RlePath) -> bool {
        if prefix.size > self.size {
            return false;
        }
        let last = match prefix.runs.len() {
            0 => return true,
            n => n - 1,
        };
        if last >= self.runs.len() {
            return false;
        }
        prefix.runs[..last] == self.runs[..last] && prefix.runs[last] <= self.runs[last]
    }

    /// Returns the steps that remain after `prefix`, if it is a prefix.
    pub fn strip_prefix(&self, prefix: &RlePath) -> Option<RlePath> {
        if !self.has_prefix(prefix) {
            return None;
        }
        Some(self.suffix(self.size - prefix.size))
    }

    /// Moves to the next path of the same length, counting in binary.
    ///
    /// Fails with [Error::EdgeOfLayer] on the all-right path.
    pub fn increment(&mut self) -> Result<()> {
        self.adjust(Step::Right)
    }

    /// Moves to the previous path of the same length.
    ///
    /// Fails with [Error::EdgeOfLayer] on the all-left path.
    pub fn decrement(&mut self) -> Result<()> {
        self.adjust(Step::Left)
    }

    /// Rewrites the tail `a b..b` as `b a..a`, where `b` is `into` and `a`
    /// its opposite. Only the last two runs are touched.
    fn adjust(&mut self, into: Step) -> Result<()> {
        let edge = Error::EdgeOfLayer { depth: self.size };

        let tail = match self.last_step() {
            Some(last) if last == into => self.runs.pop().unwrap_or(0),
            _ => 0,
        };

        // only `into` steps, nothing to flip
        if self.runs.is_empty() || self.runs == [0u64] {
            if tail > 0 {
                self.runs.push(tail);
            }
            return Err(edge);
        }

        let flipped = self.runs.pop().unwrap_or(0) - 1;
        if flipped > 0 {
            self.runs.extend([flipped, 1]);
        } else {
            match self.runs.last_mut() {
                Some(prev) => *prev += 1,
                // the flipped run was the leading run of rights
                None => self.runs.extend([0, 1]),
            }
        }
        if tail > 0 {
            self.runs.push(tail);
        }
        Ok(())
    }

    /// The path read as a binary number with `R = 1`: the node's index in
    /// its layer.
    pub fn to_index(&self) -> RleInt {
        RleInt::from_segments(self.items().map(|(step, count)| (step.bit(), count)))
    }

    /// Orders two paths of equal length by their position in the layer.
    pub fn cmp_in_layer(&self, other: &RlePath) -> Ordering {
        for (i, (a, b)) in self.runs.iter().zip(&other.runs).enumerate() {
            match a.cmp(b) {
                Ordering::Equal => continue,
                o if Step::of_run(i) == Step::Left => return o.reverse(),
                o => return o,
            }
        }
        self.runs.len().cmp(&other.runs.len())
    }
}

impl fmt::Display for RlePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("I");
        }
        for (step, count) in self.items() {
            write!(f, "{}", step.letter())?;
            if count > 1 {
                write!(f, "{}", count)?;
            }
        }
        Ok(())
    }
}

impl FromStr for RlePath {
    type Err = Error;

    /// Parses `I` (the root) or a sequence of `L` and `R`, each optionally
    /// followed by a positive repeat count.
    fn from_str(s: &str) -> Result<Self> {
        if s == "I" {
            return Ok(Self::root());
        }

        let bytes = s.as_bytes();
        let mut path = Self::root();
        let mut i = 0;
        while i < bytes.len() {
            let step = match bytes[i] {
                b'L' => Step::Left,
                b'R' => Step::Right,
                _ => {
                    return Err(Error::MalformedPath {
                        offset: i,
                        reason: "expected `L` or `R`",
                    })
                }
            };
            i += 1;

            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let count = match &s[start..i] {
                "" => 1,
                digits => digits.parse::<u64>().map_err(|_| Error::MalformedPath {
                    offset: start,
                    reason: "repeat count does not fit in 64 bits",
                })?,
            };
            if count == 0 {
                return Err(Error::MalformedPath {
                    offset: start,
                    reason: "repeat count must be positive",
                });
            }
            path.push(step, count);
        }
        Ok(path)
    }
}
