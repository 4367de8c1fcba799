//! Overlay geometry constants and pixel math.
//!
//! Gesture deltas arrive as floating-point pixel offsets; everything that is
//! stored (locally or remotely) goes through [`round_point`] /
//! [`round_size`] first, and dimensions through [`clamp_size`].

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum interactive overlay width in pixels.
pub const MIN_WIDTH: i32 = 50;

/// Minimum interactive overlay height in pixels.
pub const MIN_HEIGHT: i32 = 20;

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// Enforce the minimum interactive bounds on a pair of integer dimensions.
pub fn clamp_size(width: i32, height: i32) -> (i32, i32) {
    (width.max(MIN_WIDTH), height.max(MIN_HEIGHT))
}

/// Float variant of [`clamp_size`] used for live resize previews.
///
/// Non-finite inputs collapse to the minimum.
pub fn clamp_size_f64(width: f64, height: f64) -> (f64, f64) {
    let clamp = |v: f64, min: i32| {
        if v.is_finite() {
            v.max(f64::from(min))
        } else {
            f64::from(min)
        }
    };
    (clamp(width, MIN_WIDTH), clamp(height, MIN_HEIGHT))
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round a pixel offset to the nearest integer pixel.
///
/// Ties go toward positive infinity (`-2.5 -> -2`, `2.5 -> 3`), the same
/// rule pointer libraries in the browser apply. Out-of-range values
/// saturate at the `i32` bounds and NaN becomes `0`.
pub fn round_coord(v: f64) -> i32 {
    // `v + 0.5` is inexact just below a tie, so compare the fraction instead.
    let floor = v.floor();
    let rounded = if v - floor >= 0.5 { floor + 1.0 } else { floor };
    // `as` saturates and maps NaN to 0.
    rounded as i32
}

/// Round an `(x, y)` pair to integer pixels.
pub fn round_point(x: f64, y: f64) -> (i32, i32) {
    (round_coord(x), round_coord(y))
}

/// Round a `(width, height)` pair to integer pixels and clamp it to the
/// minimum bounds.
pub fn round_size(width: f64, height: f64) -> (i32, i32) {
    clamp_size(round_coord(width), round_coord(height))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
