use thiserror::Error;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., by exceeding the allowed number of laps.
#[derive(Debug, Clone, Error)]
#[error("Invalid input value")]
pub struct InputValueError;

/// clamp_finite restricts x to the range [min, max]. Non-finite values cannot be ordered in a
/// meaningful way and are therefore replaced by the inserted fallback (which is clamped as well).
pub fn clamp_finite(x: f64, min: f64, max: f64, fallback: f64) -> f64 {
    let x = if x.is_finite() { x } else { fallback };
    x.max(min).min(max)
}

/// clamp_percent is a shortcut for values that live on a 0 to 100 scale, e.g. tire health or
/// fuel. Non-finite values are mapped to 0.0.
pub fn clamp_percent(x: f64) -> f64 {
    clamp_finite(x, 0.0, 100.0, 0.0)
}

/// wrap_progress maps a race progress value onto a single lap, i.e. the range [0, 100). It is
/// used to place a car on a track map. Non-finite values are mapped to 0.0.
pub fn wrap_progress(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }

    let wrapped = x.rem_euclid(100.0);

    // rem_euclid can return exactly 100.0 for tiny negative inputs due to rounding
    if wrapped >= 100.0 {
        0.0
    } else {
        wrapped
    }
}
