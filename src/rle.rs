//! Run-length encoded natural numbers.
//!
//! An [RleInt] stores the binary expansion of a natural number as the
//! lengths of its alternating runs of bits, most significant run first.
//! The first run is always a run of `1` bits, so `0b1110011` is stored as
//! `[3, 2, 2]`. Zero has no runs at all.
//!
//! The operations needed by the tree layer (comparison, addition,
//! subtraction, shifts and suffixes) walk runs rather than bits, so their
//! cost depends on how many runs a number has, not on how long it is. A
//! path that turns left a million times is a single run.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;

use itertools::Itertools;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{Error, Result};

/// A natural number stored as alternating runs of `1` and `0` bits.
///
/// ```rust
/// use mediant::RleInt;
///
/// let n = RleInt::from(0b1110011u64);
/// assert_eq!(n.runs(), &[3, 2, 2]);
/// assert_eq!(n.size(), 7);
/// assert_eq!(n.to_u64(), Some(0b1110011));
/// ```
#[derive(Clone, Default)]
pub struct RleInt {
    runs: Vec<u64>,
    size: u64,
    value: OnceCell<BigUint>,
}

impl RleInt {
    /// Returns zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds a number from raw runs, the first of which counts `1` bits.
    ///
    /// Zero-length runs are allowed in the input and are folded away, as is
    /// a leading run of zeros.
    ///
    /// ```rust
    /// use mediant::RleInt;
    ///
    /// // 0b00111 with two leading zeros and a spurious empty run
    /// let n = RleInt::from_runs(vec![0, 2, 3, 0]);
    /// assert_eq!(n.runs(), &[3]);
    /// assert_eq!(n.to_u64(), Some(7));
    /// ```
    pub fn from_runs(runs: Vec<u64>) -> Self {
        let mut n = RleInt {
            runs,
            ..Self::default()
        };
        n.normalize();
        n
    }

    /// Builds a number from `(bit, count)` segments, most significant first.
    pub(crate) fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = (bool, u64)>,
    {
        let mut n = Self::default();
        for (bit, count) in segments {
            n.append_bits(bit, count);
        }
        n
    }

    /// Converts from a native arbitrary precision integer.
    pub fn from_biguint(n: &BigUint) -> Self {
        let mut out = (0..n.bits())
            .rev()
            .map(|i| n.bit(i))
            .dedup_with_count()
            .fold(Self::default(), |mut acc, (count, bit)| {
                acc.append_bits(bit, count as u64);
                acc
            });
        out.value = OnceCell::from(n.clone());
        out
    }

    /// Returns the native value, computing it on first use.
    pub fn as_biguint(&self) -> &BigUint {
        self.value.get_or_init(|| {
            let mut value = BigUint::zero();
            for (bit, count) in self.segments() {
                value <<= count;
                if bit {
                    value |= (BigUint::one() << count) - 1u32;
                }
            }
            value
        })
    }

    /// Returns the native value.
    pub fn to_biguint(&self) -> BigUint {
        self.as_biguint().clone()
    }

    /// Returns the value if it fits in a `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        if self.size > 64 {
            return None;
        }
        self.as_biguint().to_u64()
    }

    /// The raw runs, most significant first, starting with a run of ones.
    pub fn runs(&self) -> &[u64] {
        &self.runs
    }

    /// Iterates `(bit, count)` pairs, most significant first.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = (bool, u64)> + '_ {
        self.runs
            .iter()
            .enumerate()
            .map(|(i, &count)| (i % 2 == 0, count))
    }

    /// Bit length of the value; zero for zero.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns `true` if this is zero.
    pub fn is_zero(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of `1` bits before the first `0`.
    pub fn leading_ones(&self) -> u64 {
        self.runs.first().copied().unwrap_or(0)
    }

    /// Shifts `count` copies of `bit` in at the least significant end.
    ///
    /// Shifting zeros into zero leaves it unchanged.
    pub fn append_bits(&mut self, bit: bool, count: u64) {
        if count == 0 || (self.runs.is_empty() && !bit) {
            return;
        }
        self.value.take();

        let last_is_one = self.runs.len() % 2 == 1;
        match self.runs.last_mut() {
            Some(last) if last_is_one == bit => *last += count,
            _ => self.runs.push(count),
        }
        self.size += count;
    }

    /// Drops the lowest `n` bits. Shifting past the size yields zero.
    pub fn right_shift(&mut self, n: u64) {
        if n >= self.size {
            *self = Self::default();
            return;
        }
        self.value.take();
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

    /// Reverses the bit order of the value, first padding it with leading
    /// zeros up to `pad_to` bits.
    ///
    /// ```rust
    /// use mediant::RleInt;
    ///
    /// // 00110 -> 01100
    /// let mut n = RleInt::from(0b110u64);
    /// n.reverse(5);
    /// assert_eq!(n.to_u64(), Some(0b1100));
    /// ```
    pub fn reverse(&mut self, pad_to: u64) {
        let pad = pad_to.saturating_sub(self.size);
        self.value.take();

        // trailing zeros turn into leading zeros, which are not stored
        if self.runs.len() % 2 == 0 {
            if let Some(zeros) = self.runs.pop() {
                self.size -= zeros;
            }
        }
        self.runs.reverse();
        self.append_bits(false, pad);
    }

    /// Returns the lowest `n` bits as a new value.
    pub fn suffix(&self, n: u64) -> Self {
        if n >= self.size {
            return self.clone();
        }

        let mut kept = Vec::new();
        let mut remaining = n;
        for (bit, count) in self.segments().rev() {
            if remaining == 0 {
                break;
            }
            let take = count.min(remaining);
            kept.push((bit, take));
            remaining -= take;
        }
        Self::from_segments(kept.into_iter().rev())
    }

    /// Drops leading zero runs and folds empty runs into their neighbours.
    pub fn normalize(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        let value = self.value.take();

        *self = Self::from_segments(
            runs.into_iter()
                .enumerate()
                .map(|(i, count)| (i % 2 == 0, count)),
        );
        if let Some(value) = value {
            self.value = OnceCell::from(value);
        }
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    ///
    /// ```rust
    /// use mediant::RleInt;
    ///
    /// let a = RleInt::from(1u64 << 40);
    /// let b = RleInt::from(1u64);
    /// assert_eq!(a.checked_sub(&b).unwrap().runs(), &[40]);
    /// assert!(b.checked_sub(&a).is_none());
    /// ```
    pub fn checked_sub(&self, other: &RleInt) -> Option<RleInt> {
        let mut out = LsbRuns::default();
        let mut borrow = false;

        for (x, y, count) in self.aligned(other) {
            match (x, y) {
                (true, false) => {
                    out.push(!borrow, 1);
                    out.push(true, count - 1);
                    borrow = false;
                }
                (false, true) => {
                    out.push(!borrow, 1);
                    out.push(false, count - 1);
                    borrow = true;
                }
                _ => out.push(borrow, count),
            }
        }

        if borrow {
            return None;
        }
        Some(out.finish())
    }

    /// Compares with `other` once and returns the ordering together with
    /// the magnitude of the difference.
    ///
    /// ```rust
    /// use mediant::RleInt;
    /// use std::cmp::Ordering;
    ///
    /// let (ord, dist) = RleInt::from(5u64).cmp_sub(&RleInt::from(9u64));
    /// assert_eq!(ord, Ordering::Less);
    /// assert_eq!(dist.to_u64(), Some(4));
    /// ```
    pub fn cmp_sub(&self, other: &RleInt) -> (Ordering, RleInt) {
        let (ord, diff) = match self.cmp(other) {
            Ordering::Equal => return (Ordering::Equal, RleInt::zero()),
            Ordering::Greater => (Ordering::Greater, self.checked_sub(other)),
            Ordering::Less => (Ordering::Less, other.checked_sub(self)),
        };
        // the larger operand always comes first
        (ord, diff.unwrap_or_default())
    }

    /// Runs read from the least significant end, zero padded to `width`.
    fn lsb_segments(&self, width: u64) -> Vec<(bool, u64)> {
        let mut out: Vec<_> = self.segments().rev().collect();
        if width > self.size {
            out.push((false, width - self.size));
        }
        out
    }

    /// Splits both operands into stretches over which neither changes its
    /// bit, least significant first: `(bit of self, bit of other, length)`.
    fn aligned(&self, other: &RleInt) -> Vec<(bool, bool, u64)> {
        let width = self.size.max(other.size);
        let r = self.lsb_segments(width);
        let q = other.lsb_segments(width);

        let mut out = Vec::with_capacity(r.len() + q.len());
        let (mut i, mut j) = (0, 0);
        let mut r_left = r.first().map_or(0, |s| s.1);
        let mut q_left = q.first().map_or(0, |s| s.1);

        while i < r.len() && j < q.len() {
            let v = r_left.min(q_left);
            if v > 0 {
                out.push((r[i].0, q[j].0, v));
            }
            r_left -= v;
            q_left -= v;
            if r_left == 0 {
                i += 1;
                r_left = r.get(i).map_or(0, |s| s.1);
            }
            if q_left == 0 {
                j += 1;
                q_left = q.get(j).map_or(0, |s| s.1);
            }
        }
        out
    }
}

/// Accumulates a result least significant run first.
#[derive(Default)]
struct LsbRuns(Vec<(bool, u64)>);

impl LsbRuns {
    fn push(&mut self, bit: bool, count: u64) {
        if count == 0 {
            return;
        }
        match self.0.last_mut() {
            Some((b, c)) if *b == bit => *c += count,
            _ => self.0.push((bit, count)),
        }
    }

    fn finish(self) -> RleInt {
        RleInt::from_segments(self.0.into_iter().rev())
    }
}

impl Add for &RleInt {
    type Output = RleInt;

    /// Adds two numbers with a carry walk over their runs.
    fn add(self, other: &RleInt) -> RleInt {
        let mut out = LsbRuns::default();
        let mut carry = false;

        for (x, y, count) in self.aligned(other) {
            match (x, y) {
                (false, false) => {
                    out.push(carry, 1);
                    out.push(false, count - 1);
                    carry = false;
                }
                (true, true) => {
                    out.push(carry, 1);
                    out.push(true, count - 1);
                    carry = true;
                }
                _ => out.push(!carry, count),
            }
        }
        if carry {
            out.push(true, 1);
        }

        out.finish()
    }
}

impl Add for RleInt {
    type Output = RleInt;

    fn add(self, other: RleInt) -> RleInt {
        &self + &other
    }
}

impl Ord for RleInt {
    fn cmp(&self, other: &RleInt) -> Ordering {
        self.size.cmp(&other.size).then_with(|| {
            for (i, (a, b)) in self.runs.iter().zip(&other.runs).enumerate() {
                match a.cmp(b) {
                    Ordering::Equal => continue,
                    // a longer run of zeros means a smaller number
                    o if i % 2 == 1 => return o.reverse(),
                    o => return o,
                }
            }
            self.runs.len().cmp(&other.runs.len())
        })
    }
}

impl PartialOrd for RleInt {
    fn partial_cmp(&self, other: &RleInt) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RleInt {
    fn eq(&self, other: &RleInt) -> bool {
        self.runs == other.runs
    }
}

impl Eq for RleInt {}

impl Hash for RleInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.runs.hash(state);
    }
}

impl fmt::Debug for RleInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RleInt")
            .field("runs", &self.runs)
            .field("size", &self.size)
            .finish()
    }
}

impl fmt::Display for RleInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.as_biguint(), f)
    }
}

impl From<u64> for RleInt {
    fn from(n: u64) -> Self {
        Self::from_biguint(&BigUint::from(n))
    }
}

impl From<&BigUint> for RleInt {
    fn from(n: &BigUint) -> Self {
        Self::from_biguint(n)
    }
}

impl From<BigUint> for RleInt {
    fn from(n: BigUint) -> Self {
        Self::from_biguint(&n)
    }
}

impl TryFrom<&BigInt> for RleInt {
    type Error = Error;

    fn try_from(n: &BigInt) -> Result<Self> {
        match n.sign() {
            Sign::Minus => Err(Error::Negative),
            _ => Ok(Self::from_biguint(n.magnitude())),
        }
    }
}
