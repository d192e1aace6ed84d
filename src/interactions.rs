//! Bit-level leakage features.
//!
//! Pure functions shared by every model that works on operand bits:
//!
//! - [`hamming_weight`]: number of set bits (first-order leakage).
//! - [`popcount_pairs`]: number of set-bit pairs (second-order leakage).
//! - [`bitflip`]: bits that change between two values (switching activity).
//! - [`weighted_term`]: folds one feature into the output through a
//!   calibrated coefficient vector.

/// Bit width of operand values.
pub const OPERAND_BITS: u32 = u32::BITS;

/// Number of set bits in `value`.
#[inline]
pub fn hamming_weight(value: u32) -> u32 {
    value.count_ones()
}

/// Number of unordered bit-index pairs `(i, j)`, `i != j`, where both bits are set.
///
/// Tests every pair directly instead of using `C(popcount, 2)`; the result is
/// the same, but the loop is the shape any other pairwise predicate would take.
pub fn popcount_pairs(value: u32) -> u32 {
    count_bit_pairs(value, |a, b| a && b)
}

/// Count unordered bit-index pairs of `value` for which `predicate` holds.
pub fn count_bit_pairs(value: u32, predicate: impl Fn(bool, bool) -> bool) -> u32 {
    let bit = |i: u32| (value >> i) & 1 == 1;
    let mut count = 0;
    for i in 0..OPERAND_BITS {
        for j in (i + 1)..OPERAND_BITS {
            if predicate(bit(i), bit(j)) {
                count += 1;
            }
        }
    }
    count
}

/// Bits that differ between `a` and `b`.
#[inline]
pub fn bitflip(a: u32, b: u32) -> u32 {
    a ^ b
}

/// Sum of `feature * c` over every coefficient `c`.
///
/// The scalar feature is broadcast across all bit-position weights rather
/// than paired with per-bit features.
pub fn weighted_term(coefficients: &[f64], feature: f64) -> f64 {
    coefficients.iter().map(|c| feature * c).sum()
}
