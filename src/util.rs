#[inline(always)]
pub(crate) fn zero_inverse(value: f64) -> f64 {
    if value != 0.0 { 1.0 / value } else { 0.0 }
}

/// Converts to `i32`, clamping out of range values and mapping NaN to 0.
#[inline]
pub(crate) fn saturate_i32(value: f64) -> i32 {
    // `as` casts from float to int saturate since Rust 1.45
    value as i32
}

/// Weighted sum of three value groups, weights being barycentric coordinates.
pub(crate) fn blend<const N: usize>(a: &[f32; N], b: &[f32; N], c: &[f32; N], weights: [f32; 3]) -> [f32; N] {
    let mut result = [0.0; N];

    for (i, r) in result.iter_mut().enumerate() {
        *r = a[i] * weights[0] + b[i] * weights[1] + c[i] * weights[2];
    }

    result
}

/// Normalizes the first three components in place, leaving the rest untouched.
pub(crate) fn normalize_xyz<const N: usize>(v: &mut [f32; N]) {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();

    if length > 0.0 {
        v[0] /= length;
        v[1] /= length;
        v[2] /= length;
    }
}
