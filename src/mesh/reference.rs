//! Vertex to triangle adjacency

use crate::mesh::MeshStore;

/// Triangle corner referencing a vertex: the triangle id and the slot of the vertex within it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Ref {
    pub tid: usize,
    pub tvertex: usize,
}

impl MeshStore {
    /// Rebuilds the reference array from the current triangle set.
    ///
    /// Afterwards `refs[tstart..tstart + tcount]` of every vertex lists exactly the triangles using it. The index is
    /// only valid until the next collapse appends to it.
    pub fn rebuild_references(&mut self) {
        let MeshStore {
            vertices,
            triangles,
            refs,
            ..
        } = self;

        // count triangle corners per vertex
        for vertex in vertices.iter_mut() {
            vertex.tstart = 0;
            vertex.tcount = 0;
        }

        for triangle in triangles.iter() {
            for &v in &triangle.v {
                vertices[v].tcount += 1;
            }
        }

        // exclusive prefix sum
        let mut tstart = 0;

        for vertex in vertices.iter_mut() {
            vertex.tstart = tstart;
            tstart += vertex.tcount;
            vertex.tcount = 0;
        }

        refs.clear();
        refs.resize(tstart, Ref::default());

        for (tid, triangle) in triangles.iter().enumerate() {
            for (tvertex, &v) in triangle.v.iter().enumerate() {
                let vertex = &mut vertices[v];
                refs[vertex.tstart + vertex.tcount] = Ref { tid, tvertex };
                vertex.tcount += 1;
            }
        }

        assert_eq!(refs.len(), triangles.len() * 3);
    }

    /// References of the triangles currently attached to `vertex`.
    #[inline]
    pub fn references(&self, vertex: usize) -> &[Ref] {
        let v = &self.vertices[vertex];
        &self.refs[v.tstart..v.tstart + v.tcount]
    }
}
