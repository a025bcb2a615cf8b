//! Synthetic contrast curves over the focus axis.
//!
//! Curves are plain closures from position to metric, so tests can also pass
//! their own.

use focus_core::Position;

/// A downward parabola with its maximum of `0.0` at `peak`.
///
/// The square is taken before scaling so values stay exact for integer
/// positions when `scale` is `1.0`.
pub fn parabola(peak: Position, scale: f64) -> impl Fn(Position) -> f64 + 'static {
    move |x| {
        let dx = (x - peak) as f64;
        -scale * (dx * dx)
    }
}

/// A straight line through the origin with slope `k`.
pub fn linear(k: f64) -> impl Fn(Position) -> f64 + 'static {
    move |x| k * x as f64
}

/// The same metric everywhere.
pub fn flat(value: f64) -> impl Fn(Position) -> f64 + 'static {
    move |_| value
}

/// A Gaussian bump of `height` centred on `peak`.
pub fn gaussian(peak: Position, width: f64, height: f64) -> impl Fn(Position) -> f64 + 'static {
    move |x| {
        let z = (x - peak) as f64 / width;
        height * (-0.5 * z * z).exp()
    }
}

/// Two parabolic peaks of equal height at `a` and `b`.
pub fn twin_peaks(a: Position, b: Position, scale: f64) -> impl Fn(Position) -> f64 + 'static {
    let left = parabola(a, scale);
    let right = parabola(b, scale);
    move |x| left(x).max(right(x))
}
