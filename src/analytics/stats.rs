use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Continuous percentile over ascending `sorted` values, matching PostgreSQL
/// `PERCENTILE_CONT`: the rank is `fraction * (n - 1)` and the result is linearly
/// interpolated between the two neighbouring values. Empty input yields zero.
pub fn percentile_cont(sorted: &[Decimal], fraction: Decimal) -> Decimal {
    let n = sorted.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    if n == 1 {
        return sorted[0];
    }

    let fraction = fraction.clamp(Decimal::ZERO, Decimal::ONE);
    let rank = fraction * Decimal::from(n - 1);
    let lower = rank.floor();
    let weight = rank - lower;

    // lower is within 0..=n-1 by construction
    let lo = lower.to_usize().unwrap_or(0);
    let hi = (lo + 1).min(n - 1);

    if weight.is_zero() || lo == hi {
        return sorted[lo];
    }
    sorted[lo] + weight * (sorted[hi] - sorted[lo])
}
