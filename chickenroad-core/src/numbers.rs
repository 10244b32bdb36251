//! Numeric conversion helpers centralizing lossy casts used by reports.

use num_traits::cast::cast;

/// Convert a count to f64, returning 0.0 if it cannot be represented.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Fraction `count / total`, or 0.0 for an empty total.
#[must_use]
pub fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count_to_f64(count) / count_to_f64(total)
}

/// Round a probability to whole percent, clamped to `0..=100`.
#[must_use]
pub fn percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    cast::<f64, u8>((value * 100.0).round().clamp(0.0, 100.0)).unwrap_or(0)
}
