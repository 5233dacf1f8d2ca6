//! Vertex and triangle records mutated in place during simplification

use crate::Vector3;
use crate::mesh::{AttributeStreams, MeshBuffers, Ref};
use crate::quadric::SymmetricMatrix;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Vertex {
    pub p: Vector3,
    pub q: SymmetricMatrix,
    pub tstart: usize,
    pub tcount: usize,
    pub border: bool,
    /// Welded with a border vertex of different UVs
    pub uv_seam: bool,
    /// Welded with a border vertex of identical UVs
    pub uv_foldover: bool,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Triangle {
    /// Topological vertices
    pub v: [usize; 3],
    /// Attribute slots, diverging from `v` across UV seams
    pub va: [usize; 3],
    pub n: Vector3,
    /// Per-edge collapse errors, the last element being their minimum
    pub err: [f64; 4],
    pub deleted: bool,
    pub dirty: bool,
}

impl Triangle {
    pub fn contains(&self, vertex: usize) -> bool {
        self.v.contains(&vertex)
    }
}

/// Owns the working copy of a mesh: vertex and triangle records, their adjacency and the attribute streams.
#[derive(Clone, Debug, Default)]
pub(crate) struct MeshStore {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub refs: Vec<Ref>,
    pub attributes: AttributeStreams,
}

impl MeshStore {
    /// Ingests validated buffers; every triangle starts with `va == v`.
    pub fn from_buffers(mesh: &MeshBuffers) -> Self {
        let vertices = mesh
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                p: Vector3::from_f32(*p),
                index: i as u32,
                ..Default::default()
            })
            .collect();

        let triangles = mesh
            .indices
            .chunks_exact(3)
            .map(|t| {
                let v = [t[0] as usize, t[1] as usize, t[2] as usize];

                Triangle { v, va: v, ..Default::default() }
            })
            .collect();

        Self {
            vertices,
            triangles,
            refs: Vec::new(),
            attributes: AttributeStreams::from_buffers(mesh),
        }
    }

    /// Drops deleted triangles. Invalidates the reference index.
    pub fn compact_triangles(&mut self) {
        self.triangles.retain(|t| !t.deleted);
    }

    /// Removes deleted triangles and unused vertices, resolving attribute slots into real vertices.
    ///
    /// A triangle corner whose attribute slot differs from its topological vertex turns into that slot: the slot
    /// receives the position and skinning of the topological vertex, keeping its own texture attributes.
    pub fn compact(&mut self) {
        self.compact_triangles();

        for vertex in self.vertices.iter_mut() {
            vertex.tcount = 0;
        }

        for triangle in self.triangles.iter_mut() {
            for j in 0..3 {
                let (src, dst) = (triangle.v[j], triangle.va[j]);

                if src != dst {
                    self.vertices[dst].p = self.vertices[src].p;
                    self.attributes.copy_skin(dst, src);
                    triangle.v[j] = dst;
                }
            }

            for &v in &triangle.v {
                self.vertices[v].tcount = 1;
            }
        }

        // tstart becomes the compacted index of each used vertex
        let mut dst = 0;

        for i in 0..self.vertices.len() {
            if self.vertices[i].tcount > 0 {
                self.vertices[i].tstart = dst;

                if dst != i {
                    self.vertices[dst].p = self.vertices[i].p;
                    self.vertices[dst].index = dst as u32;
                    self.attributes.move_vertex(dst, i);
                }

                dst += 1;
            }
        }

        for triangle in self.triangles.iter_mut() {
            for j in 0..3 {
                triangle.v[j] = self.vertices[triangle.v[j]].tstart;
            }

            triangle.va = triangle.v;
        }

        self.vertices.truncate(dst);
        self.attributes.truncate(dst);
        self.refs.clear();
    }

    /// Exports the compacted store as mesh buffers.
    pub fn into_buffers(self) -> MeshBuffers {
        let mut mesh = MeshBuffers::new(
            self.vertices.iter().map(|v| v.p.to_f32()).collect(),
            self.triangles
                .iter()
                .flat_map(|t| t.v)
                .map(|v| v as u32)
                .collect(),
        );

        self.attributes.write_to(&mut mesh);

        mesh
    }
}
