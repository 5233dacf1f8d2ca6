//! Symmetric 4x4 quadric matrices

// This work is based on:
// Michael Garland and Paul S. Heckbert. Surface simplification using quadric error metrics. 1997

use crate::Vector3;

use std::ops::{Add, AddAssign};

/// Symmetric 4x4 matrix stored as its upper triangle:
///
/// ```text
/// | m0 m1 m2 m3 |
/// |    m4 m5 m6 |
/// |       m7 m8 |
/// |          m9 |
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub(crate) struct SymmetricMatrix {
    m: [f64; 10],
}

impl SymmetricMatrix {
    /// Quadric of the plane `ax + by + cz + d = 0`, i.e. the outer product of `(a, b, c, d)` with itself.
    pub fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            m: [a * a, a * b, a * c, a * d, b * b, b * c, b * d, c * c, c * d, d * d],
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn det(
        &self,
        a11: usize,
        a12: usize,
        a13: usize,
        a21: usize,
        a22: usize,
        a23: usize,
        a31: usize,
        a32: usize,
        a33: usize,
    ) -> f64 {
        let m = &self.m;

        m[a11] * m[a22] * m[a33] + m[a13] * m[a21] * m[a32] + m[a12] * m[a23] * m[a31]
            - m[a13] * m[a22] * m[a31]
            - m[a11] * m[a23] * m[a32]
            - m[a12] * m[a21] * m[a33]
    }

    /// Determinant of the top-left 3x3 block; zero means the quadric has no unique minimum.
    pub fn det_minor(&self) -> f64 {
        self.det(0, 1, 2, 1, 4, 5, 2, 5, 7)
    }

    /// Point minimizing the quadric, given the non-zero determinant from [det_minor](Self::det_minor).
    ///
    /// Each coordinate is a cofactor ratio of the 3x4 system `A x = -b`.
    pub fn optimal_point(&self, det: f64) -> Vector3 {
        Vector3::new(
            -1.0 / det * self.det(1, 2, 3, 4, 5, 6, 5, 7, 8),
            1.0 / det * self.det(0, 2, 3, 1, 5, 6, 2, 7, 8),
            -1.0 / det * self.det(0, 1, 3, 1, 4, 6, 2, 5, 8),
        )
    }

    /// Evaluates `vᵀ Q v` for `v = (x, y, z, 1)`.
    pub fn error(&self, v: &Vector3) -> f64 {
        let m = &self.m;
        let (x, y, z) = (v.x, v.y, v.z);

        m[0] * x * x + 2.0 * m[1] * x * y + 2.0 * m[2] * x * z + 2.0 * m[3] * x + m[4] * y * y
            + 2.0 * m[5] * y * z
            + 2.0 * m[6] * y
            + m[7] * z * z
            + 2.0 * m[8] * z
            + m[9]
    }
}

impl AddAssign for SymmetricMatrix {
    fn add_assign(&mut self, other: Self) {
        for (a, b) in self.m.iter_mut().zip(other.m.iter()) {
            *a += *b;
        }
    }
}

impl Add for SymmetricMatrix {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}
