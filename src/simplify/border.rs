//! Border classification and welding of nearly coincident border vertices

use crate::INVALID_INDEX;
use crate::mesh::MeshStore;
use crate::util::{saturate_i32, zero_inverse};

#[derive(Clone, Copy, Debug)]
struct BorderVertex {
    index: u32,
    hash: i32,
}

/// Flags every vertex lying on an edge used by a single triangle. Returns the number of border vertices.
///
/// Requires a current reference index.
pub(crate) fn classify_borders(mesh: &mut MeshStore) -> usize {
    for vertex in mesh.vertices.iter_mut() {
        vertex.border = false;
    }

    let mut neighbor_ids: Vec<usize> = Vec::new();
    let mut neighbor_counts: Vec<u32> = Vec::new();

    for i in 0..mesh.vertices.len() {
        neighbor_ids.clear();
        neighbor_counts.clear();

        for r in mesh.references(i) {
            for &id in &mesh.triangles[r.tid].v {
                if id == i {
                    continue;
                }

                match neighbor_ids.iter().position(|&n| n == id) {
                    Some(k) => neighbor_counts[k] += 1,
                    None => {
                        neighbor_ids.push(id);
                        neighbor_counts.push(1);
                    }
                }
            }
        }

        for (&id, &count) in neighbor_ids.iter().zip(neighbor_counts.iter()) {
            if count == 1 {
                mesh.vertices[i].border = true;
                mesh.vertices[id].border = true;
            }
        }
    }

    mesh.vertices.iter().filter(|v| v.border).count()
}

/// Welds border vertices that are at most `link_distance` apart. Returns the number of welded vertices.
///
/// Border vertices are hashed by their X coordinate over the X extent of the border and sorted, so only vertices close
/// in hash space are compared exactly. The triangles of each welded vertex are redirected to the vertex it was matched
/// against while keeping their attribute slots, which turns the weld into a UV seam (or a foldover when the UVs are
/// identical). Both vertices stop being border vertices.
///
/// Requires a current reference index and leaves it stale.
pub(crate) fn link_border_vertices(mesh: &mut MeshStore, link_distance: f64) -> usize {
    let mut border: Vec<BorderVertex> = mesh
        .vertices
        .iter()
        .filter(|v| v.border)
        .map(|v| BorderVertex { index: v.index, hash: 0 })
        .collect();

    if border.len() < 2 {
        return 0;
    }

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;

    for bv in &border {
        let x = mesh.vertices[bv.index as usize].p.x;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }

    let inv_width = zero_inverse(max_x - min_x);

    for bv in border.iter_mut() {
        let x = mesh.vertices[bv.index as usize].p.x;
        bv.hash = saturate_i32(((x - min_x) * inv_width * 2.0 - 1.0) * i32::MAX as f64);
    }

    border.sort_by_key(|bv| bv.hash);

    let hash_max_distance = saturate_i32(link_distance * inv_width * i32::MAX as f64).max(1) as i64;
    let link_distance_sq = link_distance * link_distance;

    let mut welded = 0;

    for i in 0..border.len() {
        let my = border[i].index;

        if my == INVALID_INDEX {
            continue;
        }

        let my = my as usize;
        let my_hash = border[i].hash as i64;

        for j in i + 1..border.len() {
            let other = border[j].index;

            if other == INVALID_INDEX {
                continue;
            }

            if border[j].hash as i64 - my_hash > hash_max_distance {
                break;
            }

            let other = other as usize;

            if (mesh.vertices[my].p - mesh.vertices[other].p).length_squared() > link_distance_sq {
                continue;
            }

            border[j].index = INVALID_INDEX;

            let foldover = mesh.attributes.uvs_equal(my, other);

            for v in [my, other] {
                let vertex = &mut mesh.vertices[v];
                vertex.border = false;

                if foldover {
                    vertex.uv_foldover = true;
                } else {
                    vertex.uv_seam = true;
                }
            }

            let MeshStore {
                vertices,
                triangles,
                refs,
                ..
            } = &mut *mesh;

            let other_vertex = &vertices[other];

            for r in &refs[other_vertex.tstart..other_vertex.tstart + other_vertex.tcount] {
                triangles[r.tid].v[r.tvertex] = my;
            }

            welded += 1;
        }
    }

    welded
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::MeshBuffers;
    use crate::simplify::test::grid;

    /// 3 x 2 quad strip split in two along x = 1, with the seam vertices duplicated.
    fn split_strip(seam_uv_offset: f32) -> MeshBuffers {
        #[rustfmt::skip]
        let positions = vec![
            // left half
            [0.0, 0.0, 0.0], [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0], [1.0, 1.0, 0.0],
            // right half
            [1.0, 0.0, 0.0], [2.0, 0.0, 0.0],
            [1.0, 1.0, 0.0], [2.0, 1.0, 0.0],
        ];

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 1, 3,
            4, 5, 6, 6, 5, 7,
        ];

        let uvs = positions
            .iter()
            .enumerate()
            .map(|(i, p)| if i >= 4 { [p[0] + seam_uv_offset, p[1]] } else { [p[0], p[1]] })
            .collect();

        MeshBuffers::new(positions, indices).with_uvs(uvs)
    }

    fn prepare(mesh: &MeshBuffers) -> MeshStore {
        let mut store = MeshStore::from_buffers(mesh);
        store.rebuild_references();
        store
    }

    #[test]
    fn test_classify_grid() {
        let mut store = prepare(&grid(3));

        assert_eq!(classify_borders(&mut store), 8);
        assert!(!store.vertices[4].border);
        assert!(store.vertices[0].border);
        assert!(store.vertices[7].border);
    }

    #[test]
    fn test_classify_closed() {
        #[rustfmt::skip]
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];

        let mesh = MeshBuffers::new(positions, vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]);
        let mut store = prepare(&mesh);

        assert_eq!(classify_borders(&mut store), 0);
    }

    #[test]
    fn test_link_seam() {
        let mut store = prepare(&split_strip(0.5));
        classify_borders(&mut store);

        assert_eq!(link_border_vertices(&mut store, f64::MIN_POSITIVE), 2);

        for v in [1, 3, 4, 6] {
            assert!(!store.vertices[v].border);
            assert!(store.vertices[v].uv_seam);
            assert!(!store.vertices[v].uv_foldover);
        }

        // the right half now shares topology with the left half but keeps its attribute slots
        store.rebuild_references();
        assert_eq!(store.triangles[2].v, [1, 5, 3]);
        assert_eq!(store.triangles[2].va, [4, 5, 6]);
        assert!(store.references(4).is_empty());
        assert_eq!(store.references(1).len(), 3);
        assert_eq!(store.triangles[3].v, [3, 5, 7]);

        // 4 and 6 are no longer referenced
        assert_eq!(classify_borders(&mut store), 6);
        assert!(!store.vertices[4].border);
    }

    #[test]
    fn test_link_foldover() {
        let mut store = prepare(&split_strip(0.0));
        classify_borders(&mut store);

        assert_eq!(link_border_vertices(&mut store, f64::MIN_POSITIVE), 2);

        for v in [1, 3, 4, 6] {
            assert!(store.vertices[v].uv_foldover);
            assert!(!store.vertices[v].uv_seam);
        }
    }

    #[test]
    fn test_link_distance() {
        let mut mesh = split_strip(0.0);
        mesh.positions[4][0] = 1.01;
        mesh.positions[6][0] = 1.01;

        let mut store = prepare(&mesh);
        classify_borders(&mut store);
        assert_eq!(link_border_vertices(&mut store, f64::MIN_POSITIVE), 0);

        let mut store = prepare(&mesh);
        classify_borders(&mut store);
        assert_eq!(link_border_vertices(&mut store, 0.05), 2);
    }
}
