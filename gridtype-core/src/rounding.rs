//! Rounding Policy - Half-Up, Shared
//!
//! The layout engine and the QC validator both derive fill lengths, tick
//! positions and percentages from these two functions. Nothing else in the
//! crate rounds a proportion.

/// Round to the nearest integer with ties toward positive infinity.
///
/// `round_half_up(2.5) == 3`, `round_half_up(-2.5) == -2`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Fill length of `value` in a bar field of `width` cells, scaled to `vmax`.
///
/// Clamped to `[0, width]`. Every length is 0 when `vmax <= 0`.
pub fn scale_bar_len(value: f64, vmax: f64, width: usize) -> usize {
    if !(vmax > 0.0) || !value.is_finite() {
        return 0;
    }
    let n = round_half_up(value / vmax * width as f64);
    n.clamp(0, width as i64) as usize
}
