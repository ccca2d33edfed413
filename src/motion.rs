//! Pointer movement thresholding.

/// Decide whether a raw movement delta counts as real motion.
///
/// Returns true iff either axis moved strictly more than `threshold` pixels.
/// A threshold of 0 means any nonzero movement qualifies; equality on either
/// axis does not. Negative or NaN thresholds are treated as 0 so a corrupt
/// setting can never make the comparison misbehave.
pub fn exceeds_threshold(dx: f64, dy: f64, threshold: f64) -> bool {
    let threshold = if threshold.is_finite() && threshold > 0.0 {
        threshold
    } else {
        0.0
    };
    dx.abs() > threshold || dy.abs() > threshold
}
