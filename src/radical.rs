//! Integer helpers for working with radicals exactly.

use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};
use std::str::FromStr;

/// Candidates above this are not trial divided. Whatever is left over after
/// trial division is kept as a single (possibly composite) factor.
const TRIAL_DIVISION_LIMIT: u32 = 1 << 16;

/// The largest root we'll check for when looking for perfect powers.
const MAX_PERFECT_POWER: u32 = 64;

/// Split a positive integer into `(factor, multiplicity)` pairs.
///
/// Small prime factors are found by trial division. A remaining cofactor is
/// checked for being a perfect power so things like `(65537^2)^(1/2)` still
/// come out exact.
pub(crate) fn factorize(n: &BigInt) -> Vec<(BigInt, u32)> {
    debug_assert!(n.is_positive());

    let mut remaining = n.clone();
    let mut factors = Vec::new();

    let candidates =
        std::iter::once(2).chain((3..TRIAL_DIVISION_LIMIT).step_by(2));

    for candidate in candidates {
        let divisor = BigInt::from(candidate);
        if &divisor * &divisor > remaining {
            break;
        }

        let mut multiplicity = 0;
        while (&remaining % &divisor).is_zero() {
            remaining /= &divisor;
            multiplicity += 1;
        }

        if multiplicity > 0 {
            factors.push((divisor, multiplicity));
        }
    }

    if remaining > BigInt::one() {
        factors.push(perfect_power(&remaining));
    }

    factors
}

/// Find the largest `k` such that `n == base^k`.
fn perfect_power(n: &BigInt) -> (BigInt, u32) {
    let max = n.bits().min(u64::from(MAX_PERFECT_POWER)) as u32;

    for k in (2..=max).rev() {
        let root = n.nth_root(k);
        if &root.pow(k) == n {
            return (root, k);
        }
    }

    (n.clone(), 1)
}

/// Parse a decimal literal (`"3"`, `"3."`, `"3.14"`) into an exact rational.
pub(crate) fn parse_decimal(text: &str) -> Option<BigRational> {
    let (whole, fraction) = match text.find('.') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, ""),
    };

    let digits = format!("{}{}", whole, fraction);
    let numerator = BigInt::from_str(&digits).ok()?;
    let denominator = num::pow(BigInt::from(10), fraction.len());

    Some(BigRational::new(numerator, denominator))
}

/// Raise a rational to an integer power, refusing to build absurdly large
/// numbers.
pub(crate) fn checked_powi(
    base: &BigRational,
    exponent: &BigInt,
) -> Option<BigRational> {
    let exponent = exponent.to_i32()?;
    if exponent < 0 && base.is_zero() {
        return None;
    }

    Some(base.pow(exponent))
}

/// The divisors of `n`, if it's small enough to enumerate them.
pub(crate) fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    const LIMIT: u64 = 1_000_000_000_000;

    let n = n.abs().to_u64()?;
    if n == 0 || n > LIMIT {
        return None;
    }

    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut candidate = 1;

    while candidate * candidate <= n {
        if n % candidate == 0 {
            small.push(BigInt::from(candidate));
            if candidate * candidate != n {
                large.push(BigInt::from(n / candidate));
            }
        }
        candidate += 1;
    }

    small.extend(large.into_iter().rev());
    Some(small)
}
