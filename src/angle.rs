use glam::DVec2;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Bearing of the displacement `(dx, dy)` in `[0, 2π)`, with `(1, 0)` at 0 and angles
/// increasing towards `+y`.
///
/// Built on the plain arctangent of `dy / dx`, which only covers `(-π/2, π/2)`; the
/// quadrant is restored from the signs of the components. A vertical displacement is
/// handled separately so `dx` is never divided by zero, and `(0, 0)` maps to 0.
pub fn bearing(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 {
        return if dy > 0.0 {
            FRAC_PI_2
        } else if dy < 0.0 {
            3.0 * FRAC_PI_2
        } else {
            0.0
        };
    }
    let base = (dy / dx).atan();
    let angle = if dx < 0.0 {
        base + PI
    } else if dy < 0.0 {
        base + TAU
    } else {
        base
    };
    normalize(angle)
}

#[inline]
pub fn bearing_of(v: DVec2) -> f64 {
    bearing(v.x, v.y)
}

#[inline]
pub fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
pub(crate) fn arc_between(a: f64, b: f64) -> f64 {
    let delta = normalize(a - b);
    if delta > PI { TAU - delta } else { delta }
}

#[inline]
pub fn unit(angle: f64) -> DVec2 {
    DVec2::from_angle(angle)
}
