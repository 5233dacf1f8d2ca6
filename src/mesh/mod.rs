//! Indexed mesh buffers and the internal mesh store used during simplification

mod attributes;
mod reference;
mod store;

pub(crate) use attributes::AttributeStreams;
pub(crate) use reference::Ref;
pub(crate) use store::{MeshStore, Vertex};

use crate::error::{SimplifyError, SimplifyResult};

/// Indexed triangle mesh with optional per-vertex attribute streams.
///
/// All attribute streams are addressed by the same vertex index space as `positions`; a stream that is present must
/// have exactly one element per vertex. This is both the input and the output format of the simplifier.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Tangent direction in xyz, handedness in w
    pub tangents: Option<Vec<[f32; 4]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<[f32; 4]>>,
}

impl MeshBuffers {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[must_use]
    pub fn with_tangents(mut self, tangents: Vec<[f32; 4]>) -> Self {
        self.tangents = Some(tangents);
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Sets joint indices and their skin weights; both streams travel together.
    #[must_use]
    pub fn with_skin(mut self, joints: Vec<[u16; 4]>, weights: Vec<[f32; 4]>) -> Self {
        self.joints = Some(joints);
        self.weights = Some(weights);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the buffers describe an indexed triangle list with consistently sized attribute streams.
    pub fn validate(&self) -> SimplifyResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(SimplifyError::IndexCountNotTriangles(self.indices.len()));
        }

        let vertex_count = self.vertex_count();

        if let Some((position, index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, index)| **index as usize >= vertex_count)
        {
            return Err(SimplifyError::IndexOutOfRange {
                position,
                index: *index,
                vertex_count,
            });
        }

        check_stream("normals", self.normals.as_deref(), vertex_count)?;
        check_stream("uvs", self.uvs.as_deref(), vertex_count)?;
        check_stream("tangents", self.tangents.as_deref(), vertex_count)?;
        check_stream("colors", self.colors.as_deref(), vertex_count)?;
        check_stream("joints", self.joints.as_deref(), vertex_count)?;
        check_stream("weights", self.weights.as_deref(), vertex_count)?;

        Ok(())
    }
}

fn check_stream<T>(stream: &'static str, data: Option<&[T]>, expected: usize) -> SimplifyResult<()> {
    match data {
        Some(data) if data.len() != expected => Err(SimplifyError::StreamLengthMismatch {
            stream,
            len: data.len(),
            expected,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad() -> MeshBuffers {
        #[rustfmt::skip]
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ];

        MeshBuffers::new(positions, vec![0, 1, 2, 2, 1, 3])
    }

    #[test]
    fn test_counts() {
        let mesh = quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_validate_partial_triangle() {
        let mut mesh = quad();
        mesh.indices.push(0);

        assert!(matches!(mesh.validate(), Err(SimplifyError::IndexCountNotTriangles(7))));
    }

    #[test]
    fn test_validate_out_of_range() {
        let mut mesh = quad();
        mesh.indices[5] = 4;

        assert!(matches!(
            mesh.validate(),
            Err(SimplifyError::IndexOutOfRange {
                position: 5,
                index: 4,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn test_validate_stream_length() {
        let mesh = quad().with_uvs(vec![[0.0, 0.0]; 3]);

        assert!(matches!(
            mesh.validate(),
            Err(SimplifyError::StreamLengthMismatch {
                stream: "uvs",
                len: 3,
                expected: 4
            })
        ));

        let mesh = quad().with_skin(vec![[0; 4]; 4], vec![[1.0, 0.0, 0.0, 0.0]; 4]);
        assert!(mesh.validate().is_ok());
    }
}
