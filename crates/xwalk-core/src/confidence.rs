//! # Confidence Scores
//!
//! Confidence values live in `[0, 1]`. Algorithmic scores are rounded to
//! four decimals when generated and to three decimals when exposed on a
//! [`CrosswalkMatch`](crate::CrosswalkMatch).

/// Confidence assigned to a manual mapping when the curator omits one.
pub const DEFAULT_MANUAL_CONFIDENCE: f64 = 0.9;

/// Score assigned to an evidence reuse hint when the curator omits one.
pub const DEFAULT_HINT_SCORE: f64 = 0.75;

/// Round `value` to `decimals` decimal places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// True when `value` is a finite number inside `[0, 1]`.
pub fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
