//! Edge collapse validation and execution

use crate::Vector3;
use crate::mesh::{MeshStore, Vertex};
use crate::simplify::SimplificationOptions;
use crate::simplify::metric::edge_errors;

/// Checks the border and seam classification of both endpoints against each other and the preservation options.
pub(crate) fn can_collapse(v0: &Vertex, v1: &Vertex, options: &SimplificationOptions) -> bool {
    if v0.border != v1.border || v0.uv_seam != v1.uv_seam || v0.uv_foldover != v1.uv_foldover {
        return false;
    }

    !((options.preserve_border_edges() && v0.border)
        || (options.preserve_uv_seam_edges() && v0.uv_seam)
        || (options.preserve_uv_foldover_edges() && v0.uv_foldover))
}

/// Returns true when moving `i0` to `p` would degenerate or flip one of its triangles.
///
/// On return `deleted` flags, per reference of `i0`, the triangles that the collapse of `i0`-`i1` removes. Triangles
/// after the first rejected one are left unflagged.
pub(crate) fn flipped(mesh: &MeshStore, p: &Vector3, i0: usize, i1: usize, deleted: &mut Vec<bool>) -> bool {
    let references = mesh.references(i0);

    deleted.clear();
    deleted.resize(references.len(), false);

    for (k, r) in references.iter().enumerate() {
        let triangle = &mesh.triangles[r.tid];

        if triangle.deleted {
            continue;
        }

        let id1 = triangle.v[(r.tvertex + 1) % 3];
        let id2 = triangle.v[(r.tvertex + 2) % 3];

        if id1 == i1 || id2 == i1 {
            deleted[k] = true;
            continue;
        }

        let d1 = (mesh.vertices[id1].p - *p).normalized();
        let d2 = (mesh.vertices[id2].p - *p).normalized();

        if d1.dot(&d2).abs() > 0.999 {
            return true;
        }

        let n = d1.cross(&d2).normalized();
        deleted[k] = false;

        if n.dot(&triangle.n) < 0.2 {
            return true;
        }
    }

    false
}

/// Barycentric coordinates of `p` projected onto the triangle `abc`; `(1, 0, 0)` for a degenerate triangle.
pub(crate) fn barycentric(p: &Vector3, a: &Vector3, b: &Vector3, c: &Vector3) -> [f32; 3] {
    let v0 = *b - *a;
    let v1 = *c - *a;
    let v2 = *p - *a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;

    if denom == 0.0 {
        return [1.0, 0.0, 0.0];
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    [u as f32, v as f32, w as f32]
}

/// Collapses edge `edge` of triangle `tid` into its first vertex, moving it to `p`.
///
/// # Arguments
///
/// * `deleted0`, `deleted1`: triangles removed by the collapse, as flagged by [flipped] for the two endpoints
/// * `deleted_triangles`: running count of deleted triangles, incremented for every triangle removed here
#[allow(clippy::too_many_arguments)]
pub(crate) fn collapse_edge(
    mesh: &mut MeshStore,
    tid: usize,
    edge: usize,
    p: Vector3,
    deleted0: &[bool],
    deleted1: &[bool],
    deleted_triangles: &mut usize,
    preserve_curvature: bool,
) {
    let triangle = mesh.triangles[tid];

    let i0 = triangle.v[edge];
    let i1 = triangle.v[(edge + 1) % 3];
    let i2 = triangle.v[(edge + 2) % 3];

    let weights = barycentric(
        &p,
        &mesh.vertices[i0].p,
        &mesh.vertices[i1].p,
        &mesh.vertices[i2].p,
    );

    let q1 = mesh.vertices[i1].q;
    let vertex0 = &mut mesh.vertices[i0];
    vertex0.p = p;
    vertex0.q += q1;

    let corners = [
        triangle.va[edge],
        triangle.va[(edge + 1) % 3],
        triangle.va[(edge + 2) % 3],
    ];
    mesh.attributes.interpolate(corners[0], corners, weights);

    // seam vertices keep the attribute slots of their triangles
    let ia0 = if mesh.vertices[i0].uv_seam { None } else { Some(corners[0]) };

    let tstart = mesh.refs.len();

    update_triangles(mesh, i0, ia0, i0, deleted0, deleted_triangles, preserve_curvature);
    update_triangles(mesh, i0, ia0, i1, deleted1, deleted_triangles, preserve_curvature);

    let tcount = mesh.refs.len() - tstart;
    let vertex0 = &mut mesh.vertices[i0];

    if tcount <= vertex0.tcount {
        // reuse the old block
        mesh.refs.copy_within(tstart..tstart + tcount, vertex0.tstart);
        mesh.refs.truncate(tstart);
    } else {
        vertex0.tstart = tstart;
    }

    vertex0.tcount = tcount;
}

/// Redirects the live triangles of `source` to `i0`, deleting the ones flagged in `deleted`, and appends their
/// references to the reference array.
fn update_triangles(
    mesh: &mut MeshStore,
    i0: usize,
    ia0: Option<usize>,
    source: usize,
    deleted: &[bool],
    deleted_triangles: &mut usize,
    preserve_curvature: bool,
) {
    let Vertex { tstart, tcount, .. } = mesh.vertices[source];

    for k in 0..tcount {
        let r = mesh.refs[tstart + k];
        let triangle = &mut mesh.triangles[r.tid];

        if triangle.deleted {
            continue;
        }

        if deleted[k] {
            triangle.deleted = true;
            *deleted_triangles += 1;
            continue;
        }

        triangle.v[r.tvertex] = i0;

        if let Some(ia0) = ia0 {
            triangle.va[r.tvertex] = ia0;
        }

        triangle.dirty = true;

        let err = edge_errors(mesh, r.tid, preserve_curvature);
        mesh.triangles[r.tid].err = err;

        mesh.refs.push(r);
    }
}
