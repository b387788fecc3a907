//! Continued fractions and their correspondence with tree paths.
//!
//! The continued fraction `[a0; a1, ..., an]` of a positive rational is the
//! run-length encoding of its Stern-Brocot path: `a0` rights, `a1` lefts,
//! and so on, with the final coefficient one larger than its run.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::path::{RlePath, Step};
use crate::state::{Fraction, Variant};

/// Number of fractional digits shown by the node report.
pub const DECIMAL_DIGITS: u32 = 15;

/// Computes the coefficients of `p/q` with Euclid's algorithm.
///
/// ```rust
/// use mediant::cf;
/// use num_bigint::BigUint;
///
/// let coefficients = cf::of_ratio(&BigUint::from(7u32), &BigUint::from(4u32)).unwrap();
/// assert_eq!(coefficients, vec![1u32.into(), 1u32.into(), 3u32.into()]);
/// ```
pub fn of_ratio(p: &BigUint, q: &BigUint) -> Result<Vec<BigUint>> {
    if q.is_zero() {
        return Err(Error::MalformedFraction("denominator is zero"));
    }

    let (mut p, mut q) = (p.clone(), q.clone());
    let mut coefficients = Vec::new();
    loop {
        let (a, rem) = p.div_rem(&q);
        coefficients.push(a);
        if rem.is_zero() {
            return Ok(coefficients);
        }
        p = q;
        q = rem;
    }
}

/// Evaluates `[a0; a1, ..., an]` to a fraction in lowest terms.
///
/// An empty list evaluates to `1/0`.
pub fn evaluate(coefficients: &[BigUint]) -> Fraction {
    let (num, den) = coefficients
        .iter()
        .rev()
        .fold((BigUint::one(), BigUint::zero()), |(a, b), c| {
            (&a * c + b, a)
        });
    Fraction { num, den }
}

/// Formats a fraction as a decimal truncated to `digits` places, ending
/// in `…` when the expansion does not terminate within them.
///
/// ```rust
/// use mediant::{cf, Fraction};
///
/// assert_eq!(cf::to_decimal(&Fraction::new(7u32, 4u32), 15), "1.75");
/// assert_eq!(cf::to_decimal(&Fraction::new(1u32, 3u32), 4), "0.3333…");
/// assert_eq!(cf::to_decimal(&Fraction::new(1u32, 50u32), 15), "0.02");
/// ```
pub fn to_decimal(value: &Fraction, digits: u32) -> String {
    if value.den.is_zero() {
        return "∞".to_string();
    }

    let (int, rem) = value.num.div_rem(&value.den);
    if rem.is_zero() || digits == 0 {
        return int.to_string();
    }

    let scaled = rem * BigUint::from(10u32).pow(digits);
    let (frac, rest) = scaled.div_rem(&value.den);
    let mut frac = format!("{:0>width$}", frac.to_string(), width = digits as usize);
    if rest.is_zero() {
        frac.truncate(frac.trim_end_matches('0').len());
    } else {
        frac.push('…');
    }
    format!("{}.{}", int, frac)
}

/// Checks that `coefficients` describe a positive rational: a non-empty
/// list whose first entry may be zero only if more follow, and whose
/// remaining entries are positive.
fn validate(coefficients: &[BigUint]) -> Result<()> {
    let (first, rest) = match coefficients.split_first() {
        Some(split) => split,
        None => return Err(Error::InvalidContinuedFraction("no coefficients")),
    };
    if first.is_zero() && rest.is_empty() {
        return Err(Error::InvalidContinuedFraction("zero is not in the tree"));
    }
    if rest.iter().any(Zero::is_zero) {
        return Err(Error::InvalidContinuedFraction(
            "only the first coefficient may be zero",
        ));
    }
    Ok(())
}

/// Builds the path of the node with the given coefficients, cut off after
/// `max_depth` steps. Returns the path and whether it was cut.
///
/// Calkin-Wilf paths are the Stern-Brocot path reversed, so for that tree
/// the runs are consumed from the back, which keeps the cut path an
/// ancestor of the full one.
pub(crate) fn path_of(
    variant: Variant,
    coefficients: &[BigUint],
    max_depth: u64,
) -> Result<(RlePath, bool)> {
    validate(coefficients)?;

    let mut runs: Vec<(Step, BigUint)> = coefficients
        .iter()
        .enumerate()
        .map(|(i, c)| (Step::of_run(i), c.clone()))
        .collect();
    if let Some((_, last)) = runs.last_mut() {
        *last -= 1u32;
    }
    if variant == Variant::CalkinWilf {
        runs.reverse();
    }

    let mut path = RlePath::root();
    let mut remaining = max_depth;
    for (step, count) in runs {
        let take = count.to_u64().map_or(remaining, |c| c.min(remaining));
        path.push(step, take);
        remaining -= take;
        if count > BigUint::from(take) {
            return Ok((path, true));
        }
    }
    Ok((path, false))
}

/// The coefficients of the node at the end of `path`; the root is `[1]`.
pub(crate) fn of_path(variant: Variant, path: &RlePath) -> Vec<BigUint> {
    let mut path = path.clone();
    if variant == Variant::CalkinWilf {
        path.reverse();
    }

    let mut coefficients: Vec<BigUint> = path.runs().iter().map(|&r| r.into()).collect();
    match coefficients.last_mut() {
        Some(last) => *last += 1u32,
        None => coefficients.push(BigUint::one()),
    }
    coefficients
}
