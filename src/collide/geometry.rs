//! Small 3-vector helpers for collision geometry.

use rand::Rng;

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn scale(v: [f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm_sq(v: [f64; 3]) -> f64 {
    dot(v, v)
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    norm_sq(v).sqrt()
}

pub(crate) fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    scale(add(a, b), 0.5)
}

/// Rotates `v` by `angle` around `axis` (Rodrigues' formula).
///
/// The axis need not be normalized.
pub(crate) fn rotate_about(axis: [f64; 3], angle: f64, v: [f64; 3]) -> [f64; 3] {
    let len = norm(axis);
    if len == 0.0 {
        return v;
    }
    let k = scale(axis, 1.0 / len);
    let (sin, cos) = angle.sin_cos();
    let kxv = cross(k, v);
    let kdv = dot(k, v);
    add(
        add(scale(v, cos), scale(kxv, sin)),
        scale(k, kdv * (1.0 - cos)),
    )
}

/// Draws a vector orthogonal to `axis` with uniformly random azimuth.
///
/// Crosses the axis with a random unit vector; re-draws when the sample is
/// nearly parallel to the axis and the product degenerates.
pub(crate) fn random_orthogonal<R: Rng>(rng: &mut R, axis: [f64; 3]) -> [f64; 3] {
    loop {
        let z: f64 = rng.gen_range(-1.0..=1.0);
        let alpha: f64 = rng.gen_range(0.0..std::f64::consts::PI);
        let r = (1.0 - z * z).sqrt();
        let sample = [r * alpha.cos(), r * alpha.sin(), z];
        let orthogonal = cross(axis, sample);
        if norm_sq(orthogonal) > 1e-12 {
            return orthogonal;
        }
    }
}
