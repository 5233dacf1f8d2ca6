//! Optional per-vertex attribute streams carried through simplification

use crate::mesh::MeshBuffers;
use crate::util::{blend, normalize_xyz};

/// Attribute streams addressed by the attribute index space of the triangles (`va`).
///
/// Each stream is either absent for the whole mesh or holds one element per vertex.
#[derive(Clone, Debug, Default)]
pub(crate) struct AttributeStreams {
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub tangents: Option<Vec<[f32; 4]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<[f32; 4]>>,
}

impl AttributeStreams {
    pub fn from_buffers(mesh: &MeshBuffers) -> Self {
        Self {
            normals: mesh.normals.clone(),
            uvs: mesh.uvs.clone(),
            tangents: mesh.tangents.clone(),
            colors: mesh.colors.clone(),
            joints: mesh.joints.clone(),
            weights: mesh.weights.clone(),
        }
    }

    /// Moves the streams into `mesh`, replacing whatever it held.
    pub fn write_to(self, mesh: &mut MeshBuffers) {
        mesh.normals = self.normals;
        mesh.uvs = self.uvs;
        mesh.tangents = self.tangents;
        mesh.colors = self.colors;
        mesh.joints = self.joints;
        mesh.weights = self.weights;
    }

    fn has_skin(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    /// Returns true when UVs are present and exactly equal for both attribute slots.
    pub fn uvs_equal(&self, a: usize, b: usize) -> bool {
        match &self.uvs {
            Some(uvs) => uvs[a] == uvs[b],
            None => false,
        }
    }

    /// Writes the barycentric blend of `corners` into the `dst` slot.
    ///
    /// # Arguments
    ///
    /// * `corners`: attribute slots of the reference triangle; `corners[0]` is the surviving slot and `corners[1]` the
    ///   slot of the vertex being collapsed
    /// * `weights`: barycentric coordinates of the collapse target within the reference triangle
    pub fn interpolate(&mut self, dst: usize, corners: [usize; 3], weights: [f32; 3]) {
        let [a, b, c] = corners;

        if let Some(normals) = &mut self.normals {
            let mut n = blend(&normals[a], &normals[b], &normals[c], weights);
            normalize_xyz(&mut n);
            normals[dst] = n;
        }

        if let Some(uvs) = &mut self.uvs {
            uvs[dst] = blend(&uvs[a], &uvs[b], &uvs[c], weights);
        }

        if let Some(tangents) = &mut self.tangents {
            let handedness = if tangents[a][3] < 0.0 { -1.0 } else { 1.0 };

            let mut t = blend(&tangents[a], &tangents[b], &tangents[c], weights);
            normalize_xyz(&mut t);
            t[3] = handedness;
            tangents[dst] = t;
        }

        if let Some(colors) = &mut self.colors {
            colors[dst] = blend(&colors[a], &colors[b], &colors[c], weights);
        }

        if self.has_skin() && dst != b {
            self.merge_skin(dst, b);
        }
    }

    /// Merges the joint influences of `src` into `dst` and renormalizes the weights of `dst`.
    fn merge_skin(&mut self, dst: usize, src: usize) {
        let (Some(joints), Some(weights)) = (&mut self.joints, &mut self.weights) else {
            return;
        };

        let (src_joints, src_weights) = (joints[src], weights[src]);
        let (dst_joints, dst_weights) = (&mut joints[dst], &mut weights[dst]);

        for (joint, weight) in src_joints.into_iter().zip(src_weights) {
            if weight <= 0.0 {
                continue;
            }

            let shared = (0..4).find(|&k| dst_weights[k] > 0.0 && dst_joints[k] == joint);

            if let Some(k) = shared {
                dst_weights[k] = (dst_weights[k] + weight) * 0.5;
                continue;
            }

            if let Some(k) = (0..4).find(|&k| dst_weights[k] <= 0.0) {
                dst_joints[k] = joint;
                dst_weights[k] = weight;
                continue;
            }

            let mut smallest = 0;
            for k in 1..4 {
                if dst_weights[k] < dst_weights[smallest] {
                    smallest = k;
                }
            }

            if weight > dst_weights[smallest] {
                dst_joints[smallest] = joint;
                dst_weights[smallest] = weight;
            }
        }

        let sum: f32 = dst_weights.iter().sum();

        if sum > 0.0 {
            for w in dst_weights.iter_mut() {
                *w /= sum;
            }
        }
    }

    /// Copies skinning data of a topological vertex onto an attribute slot split off from it.
    pub fn copy_skin(&mut self, dst: usize, src: usize) {
        if let Some(joints) = &mut self.joints {
            joints[dst] = joints[src];
        }

        if let Some(weights) = &mut self.weights {
            weights[dst] = weights[src];
        }
    }

    /// Copies every stream element of `src` into `dst`.
    pub fn move_vertex(&mut self, dst: usize, src: usize) {
        fn copy<T: Copy>(stream: &mut Option<Vec<T>>, dst: usize, src: usize) {
            if let Some(data) = stream {
                data[dst] = data[src];
            }
        }

        copy(&mut self.normals, dst, src);
        copy(&mut self.uvs, dst, src);
        copy(&mut self.tangents, dst, src);
        copy(&mut self.colors, dst, src);
        copy(&mut self.joints, dst, src);
        copy(&mut self.weights, dst, src);
    }

    pub fn truncate(&mut self, len: usize) {
        fn cut<T>(stream: &mut Option<Vec<T>>, len: usize) {
            if let Some(data) = stream {
                data.truncate(len);
            }
        }

        cut(&mut self.normals, len);
        cut(&mut self.uvs, len);
        cut(&mut self.tangents, len);
        cut(&mut self.colors, len);
        cut(&mut self.joints, len);
        cut(&mut self.weights, len);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn streams() -> AttributeStreams {
        AttributeStreams {
            normals: Some(vec![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            uvs: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
            tangents: Some(vec![[1.0, 0.0, 0.0, -1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]),
            colors: Some(vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]),
            joints: None,
            weights: None,
        }
    }

    #[test]
    fn test_interpolate() {
        let mut s = streams();
        s.interpolate(0, [0, 1, 2], [0.5, 0.5, 0.0]);

        assert_eq!(s.uvs.as_ref().unwrap()[0], [0.5, 0.0]);
        assert_eq!(s.colors.as_ref().unwrap()[0], [0.5, 0.5, 0.0, 1.0]);

        let n = s.normals.as_ref().unwrap()[0];
        assert!((n[0] * n[0] + n[1] * n[1] + n[2] * n[2] - 1.0).abs() < 1e-6);
        assert!((n[0] - n[2]).abs() < 1e-6);

        // handedness follows the surviving slot
        let t = s.tangents.as_ref().unwrap()[0];
        assert_eq!(t[3], -1.0);
        assert!((t[0] * t[0] + t[1] * t[1] + t[2] * t[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_uvs_equal() {
        let mut s = streams();
        assert!(!s.uvs_equal(0, 1));
        assert!(s.uvs_equal(1, 1));

        s.uvs = None;
        assert!(!s.uvs_equal(1, 1));
    }

    #[test]
    fn test_merge_skin() {
        let mut s = AttributeStreams {
            joints: Some(vec![[0, 0, 0, 0], [1, 0, 0, 0], [2, 3, 4, 5], [6, 0, 0, 0]]),
            weights: Some(vec![
                [1.0, 0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [0.4, 0.3, 0.2, 0.1],
                [0.9, 0.0, 0.0, 0.0],
            ]),
            ..Default::default()
        };

        // disjoint joints fill empty slots
        s.interpolate(0, [0, 1, 2], [1.0, 0.0, 0.0]);
        assert_eq!(s.joints.as_ref().unwrap()[0], [0, 1, 0, 0]);
        assert_eq!(s.weights.as_ref().unwrap()[0], [0.5, 0.5, 0.0, 0.0]);

        // a full set only gives way to a heavier influence
        s.interpolate(2, [2, 3, 0], [1.0, 0.0, 0.0]);
        assert_eq!(s.joints.as_ref().unwrap()[2], [2, 3, 4, 6]);

        let w = s.weights.as_ref().unwrap()[2];
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(w[3] > w[0]);
    }

    #[test]
    fn test_move_and_truncate() {
        let mut s = streams();
        s.move_vertex(0, 2);
        s.truncate(1);

        assert_eq!(s.uvs.as_ref().unwrap(), &vec![[0.0, 1.0]]);
        assert_eq!(s.normals.as_ref().unwrap(), &vec![[0.0, 1.0, 0.0]]);
        assert_eq!(s.tangents.as_ref().unwrap().len(), 1);
    }
}
