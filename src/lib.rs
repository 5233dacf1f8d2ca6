//! mesh-simplifier
//!
//! Quadric error metric (QEM) decimation of indexed triangle meshes. Positions drive the collapse decisions,
//! while normals, UVs, tangents, colors and skinning data are carried along and interpolated.
//!
//! # Example
//!
//! ```
//! use mesh_simplifier::{MeshBuffers, SimplificationOptions, simplify_mesh};
//!
//! // unit quad made of two triangles
//! let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
//! let indices = vec![0, 1, 2, 2, 1, 3];
//!
//! let mesh = MeshBuffers::new(positions, indices);
//! let result = simplify_mesh(&mesh, 2, &SimplificationOptions::default()).unwrap();
//!
//! assert_eq!(result.mesh.triangle_count(), 2);
//! ```
//!
//! # Features
//!
//! * `serde`: Derives `Serialize`/`Deserialize` for [SimplificationOptions] and [MeshBuffers]

pub mod error;
pub mod mesh;
mod quadric;
pub mod simplify;
mod util;

use std::ops::{Add, Mul, Sub};

pub use crate::error::{SimplifyError, SimplifyResult};
pub use crate::mesh::MeshBuffers;
pub use crate::simplify::{
    Preserve, Simplification, SimplificationOptions, SimplificationStats, Simplifier, simplify_mesh,
    simplify_mesh_or_original,
};

pub const INVALID_INDEX: u32 = u32::MAX;

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub(crate) struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Self { x, y, z }
    }

    pub fn from_f32(v: [f32; 3]) -> Vector3 {
        Self::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn normalize(&mut self) -> f64 {
        let length = self.length();

        if length > 0.0 {
            self.x /= length;
            self.y /= length;
            self.z /= length;
        }

        length
    }

    pub fn normalized(mut self) -> Vector3 {
        self.normalize();
        self
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut v = Vector3::new(3.0, 0.0, 4.0);

        assert_eq!(v.normalize(), 5.0);
        assert_eq!(v, Vector3::new(0.6, 0.0, 0.8));

        // zero vectors are left untouched instead of turning into NaN
        let mut zero = Vector3::default();
        assert_eq!(zero.normalize(), 0.0);
        assert_eq!(zero, Vector3::default());
    }

    #[test]
    fn test_cross() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);

        assert_eq!(x.cross(&y), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(x.dot(&y), 0.0);
    }
}
