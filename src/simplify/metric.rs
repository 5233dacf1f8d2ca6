//! Quadric error metric for edge collapses

use crate::Vector3;
use crate::mesh::MeshStore;
use crate::quadric::SymmetricMatrix;

/// Recomputes face normals and rebuilds vertex quadrics as the sum of the plane quadrics of their triangles.
pub(crate) fn fill_quadrics(mesh: &mut MeshStore) {
    for vertex in mesh.vertices.iter_mut() {
        vertex.q = SymmetricMatrix::default();
    }

    let MeshStore {
        vertices, triangles, ..
    } = mesh;

    for triangle in triangles.iter_mut().filter(|t| !t.deleted) {
        let [i0, i1, i2] = triangle.v;
        let p0 = vertices[i0].p;

        let n = (vertices[i1].p - p0).cross(&(vertices[i2].p - p0)).normalized();
        triangle.n = n;

        let q = SymmetricMatrix::from_plane(n.x, n.y, n.z, -n.dot(&p0));

        for v in triangle.v {
            vertices[v].q += q;
        }
    }
}

/// Recomputes the edge errors of every live triangle.
pub(crate) fn fill_edge_errors(mesh: &mut MeshStore, preserve_curvature: bool) {
    for tid in 0..mesh.triangles.len() {
        if mesh.triangles[tid].deleted {
            continue;
        }

        let err = edge_errors(mesh, tid, preserve_curvature);
        mesh.triangles[tid].err = err;
    }
}

/// Collapse errors of the three edges of a triangle followed by their minimum.
pub(crate) fn edge_errors(mesh: &MeshStore, tid: usize, preserve_curvature: bool) -> [f64; 4] {
    let v = mesh.triangles[tid].v;

    let e0 = calculate_error(mesh, v[0], v[1], preserve_curvature).0;
    let e1 = calculate_error(mesh, v[1], v[2], preserve_curvature).0;
    let e2 = calculate_error(mesh, v[2], v[0], preserve_curvature).0;

    [e0, e1, e2, e0.min(e1.min(e2))]
}

/// Returns the error of collapsing the edge `i0`-`i1` together with the point the merged vertex should move to.
///
/// The point minimizes the summed quadric when it is invertible and neither endpoint lies on a border. Otherwise the
/// cheapest of the two endpoints and the edge midpoint is picked, ties resolved in that order.
pub(crate) fn calculate_error(mesh: &MeshStore, i0: usize, i1: usize, preserve_curvature: bool) -> (f64, Vector3) {
    let vert0 = &mesh.vertices[i0];
    let vert1 = &mesh.vertices[i1];

    let q = vert0.q + vert1.q;
    let border = vert0.border || vert1.border;
    let det = q.det_minor();

    if det != 0.0 && !border {
        let p = q.optimal_point(det);
        let mut error = q.error(&p);

        if preserve_curvature {
            error += curvature_error(mesh, i0, i1);
        }

        (error, p)
    } else {
        let p1 = vert0.p;
        let p2 = vert1.p;
        let p3 = (p1 + p2) * 0.5;

        let error1 = q.error(&p1);
        let error2 = q.error(&p2);
        let error3 = q.error(&p3);
        let error = error1.min(error2.min(error3));

        let p = if error == error1 {
            p1
        } else if error == error2 {
            p2
        } else {
            p3
        };

        (error, p)
    }
}

/// Penalty for collapsing an edge across a curved region: the edge length scaled by the largest normal similarity
/// between any triangle around the edge and the triangles sharing the edge.
fn curvature_error(mesh: &MeshStore, i0: usize, i1: usize) -> f64 {
    let length = (mesh.vertices[i0].p - mesh.vertices[i1].p).length();

    let around = mesh
        .references(i0)
        .iter()
        .chain(mesh.references(i1))
        .map(|r| &mesh.triangles[r.tid])
        .filter(|t| !t.deleted);

    let mut max_dot = 0.0f64;

    for triangle in around {
        let sharing = mesh
            .references(i0)
            .iter()
            .map(|r| &mesh.triangles[r.tid])
            .filter(|t| !t.deleted && t.contains(i1));

        for side in sharing {
            max_dot = max_dot.max(triangle.n.dot(&side.n));
        }
    }

    length * max_dot
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::MeshBuffers;
    use crate::simplify::border::classify_borders;
    use crate::simplify::test::grid;

    fn prepare(mesh: &MeshBuffers) -> MeshStore {
        let mut store = MeshStore::from_buffers(mesh);
        store.rebuild_references();
        classify_borders(&mut store);
        fill_quadrics(&mut store);
        store
    }

    #[test]
    fn test_face_normals() {
        let store = prepare(&grid(2));

        for t in &store.triangles {
            assert_eq!(t.n, Vector3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_flat_interior_edges_are_free() {
        let mut store = prepare(&grid(4));
        fill_edge_errors(&mut store, false);

        // 5 and 6 are interior vertices
        assert!(!store.vertices[5].border && !store.vertices[6].border);

        let (error, p) = calculate_error(&store, 5, 6, false);
        assert!(error.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);

        for t in &store.triangles {
            assert_eq!(t.err, [0.0; 4]);
        }
    }

    #[test]
    fn test_border_candidates() {
        let store = prepare(&grid(3));

        // both endpoints on the border: the result is one of the endpoints or the midpoint, first one on ties
        let (error, p) = calculate_error(&store, 0, 1, false);
        assert_eq!(error, 0.0);
        assert_eq!(p, store.vertices[0].p);
    }

    #[test]
    fn test_singular_picks_cheapest_candidate() {
        let mut store = prepare(&grid(3));

        // lift vertex 1 off the plane of its neighbors
        store.vertices[1].p.z = 1.0;

        let (error, p) = calculate_error(&store, 0, 1, false);
        assert_eq!(error, 0.0);
        assert_eq!(p, store.vertices[0].p);

        let (error, p) = calculate_error(&store, 1, 0, false);
        assert_eq!(error, 0.0);
        assert_eq!(p, store.vertices[0].p);
    }

    #[test]
    fn test_curvature_penalty() {
        #[rustfmt::skip]
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ];

        let store = prepare(&MeshBuffers::new(positions, vec![0, 1, 2, 2, 1, 3]));

        // coplanar neighbors give the full edge length
        let penalty = curvature_error(&store, 1, 2);
        assert!((penalty - 2.0f64.sqrt()).abs() < 1e-12);
    }
}
