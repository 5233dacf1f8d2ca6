//! Iterative edge collapse simplification

// This work is based on:
// Michael Garland and Paul S. Heckbert. Surface simplification using quadric error metrics. 1997
// Sven Forstmann. Fast Quadric Mesh Simplification. 2014

mod border;
mod collapse;
mod metric;
mod options;

pub use self::options::{Preserve, SimplificationOptions};

use crate::error::{SimplifyError, SimplifyResult};
use crate::mesh::{MeshBuffers, MeshStore};

use self::border::{classify_borders, link_border_vertices};
use self::collapse::{can_collapse, collapse_edge, flipped};
use self::metric::{calculate_error, fill_edge_errors, fill_quadrics};

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

/// Quadrics, references and borders are rebuilt from scratch every this many iterations.
const REBUILD_INTERVAL: usize = 5;

/// Counters collected during a simplification run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimplificationStats {
    pub initial_triangles: usize,
    pub final_triangles: usize,
    pub initial_vertices: usize,
    pub final_vertices: usize,
    /// Number of collapse passes run
    pub iterations: usize,
    /// Number of edge collapses performed
    pub collapses: usize,
    /// Number of border vertices welded onto another one
    pub welded_vertices: usize,
}

impl SimplificationStats {
    /// Ratio of final to initial triangle count.
    pub fn reduction_ratio(&self) -> f64 {
        if self.initial_triangles == 0 {
            1.0
        } else {
            self.final_triangles as f64 / self.initial_triangles as f64
        }
    }
}

impl fmt::Display for SimplificationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} triangles, {} -> {} vertices ({} iterations, {} collapses, {} welded)",
            self.initial_triangles,
            self.final_triangles,
            self.initial_vertices,
            self.final_vertices,
            self.iterations,
            self.collapses,
            self.welded_vertices
        )
    }
}

/// Simplified mesh along with the statistics of the run producing it.
#[derive(Clone, Debug)]
pub struct Simplification {
    pub mesh: MeshBuffers,
    pub stats: SimplificationStats,
}

/// Working state of one simplification run.
///
/// All buffers are owned by the simplifier, so independent runs never share state.
pub struct Simplifier {
    options: SimplificationOptions,
    mesh: MeshStore,
    deleted0: Vec<bool>,
    deleted1: Vec<bool>,
    stats: SimplificationStats,
}

impl Simplifier {
    /// Validates and ingests `mesh`.
    pub fn new(mesh: &MeshBuffers, options: SimplificationOptions) -> SimplifyResult<Self> {
        mesh.validate()?;
        options.validate()?;

        Ok(Self {
            options,
            mesh: MeshStore::from_buffers(mesh),
            deleted0: Vec::new(),
            deleted1: Vec::new(),
            stats: SimplificationStats {
                initial_triangles: mesh.triangle_count(),
                initial_vertices: mesh.vertex_count(),
                ..Default::default()
            },
        })
    }

    /// Collapses edges until at most `target_count` triangles remain or the iteration budget runs out.
    ///
    /// Each iteration accepts collapses whose error is below a threshold growing with the iteration number, so cheap
    /// collapses happen first. The triangle count can stay above the target when the remaining collapses are blocked by
    /// the preservation options or would flip triangles.
    pub fn simplify(mut self, target_count: usize) -> Simplification {
        let start_count = self.mesh.triangles.len();

        info!(
            triangles = start_count,
            vertices = self.mesh.vertices.len(),
            target = target_count,
            "Starting mesh simplification"
        );

        let mut deleted_triangles = 0;

        if start_count > target_count {
            for iteration in 0..self.options.max_iteration_count {
                if start_count - deleted_triangles <= target_count {
                    break;
                }

                if iteration % REBUILD_INTERVAL == 0 {
                    self.update_mesh(iteration);
                }

                for triangle in self.mesh.triangles.iter_mut() {
                    triangle.dirty = false;
                }

                // edges with an error below the threshold get removed; it grows quickly with the iteration number
                let threshold = 1e-13 * ((iteration + 3) as f64).powf(self.options.aggressiveness);

                if iteration % REBUILD_INTERVAL == 0 {
                    debug!(
                        iteration,
                        triangles = start_count - deleted_triangles,
                        threshold,
                        "Simplification iteration"
                    );
                }

                self.remove_vertex_pass(start_count, target_count, threshold, &mut deleted_triangles);
                self.stats.iterations = iteration + 1;
            }
        }

        self.mesh.compact();

        self.stats.final_triangles = self.mesh.triangles.len();
        self.stats.final_vertices = self.mesh.vertices.len();

        info!(
            triangles = self.stats.final_triangles,
            vertices = self.stats.final_vertices,
            collapses = self.stats.collapses,
            "Mesh simplification complete"
        );

        Simplification {
            mesh: self.mesh.into_buffers(),
            stats: self.stats,
        }
    }

    /// Drops deleted triangles and rebuilds references, border flags, quadrics and edge errors.
    ///
    /// Border vertices get welded on the first call only.
    fn update_mesh(&mut self, iteration: usize) {
        if iteration > 0 {
            self.mesh.compact_triangles();
        }

        self.mesh.rebuild_references();

        let border_vertices = classify_borders(&mut self.mesh);

        if iteration == 0 && self.options.enable_smart_link {
            let welded = link_border_vertices(&mut self.mesh, self.options.vertex_link_distance);

            if welded > 0 {
                self.mesh.rebuild_references();
            }

            self.stats.welded_vertices = welded;

            debug!(border_vertices, welded, "Linked border vertices");
        }

        fill_quadrics(&mut self.mesh);
        fill_edge_errors(&mut self.mesh, self.options.preserve_surface_curvature());
    }

    /// Performs at most one collapse per triangle whose cheapest edge is below `threshold`.
    fn remove_vertex_pass(
        &mut self,
        start_count: usize,
        target_count: usize,
        threshold: f64,
        deleted_triangles: &mut usize,
    ) {
        let preserve_curvature = self.options.preserve_surface_curvature();

        for tid in 0..self.mesh.triangles.len() {
            let triangle = self.mesh.triangles[tid];

            if triangle.dirty || triangle.deleted || triangle.err[3] > threshold {
                continue;
            }

            for edge in 0..3 {
                if triangle.err[edge] > threshold {
                    continue;
                }

                let i0 = triangle.v[edge];
                let i1 = triangle.v[(edge + 1) % 3];

                if !can_collapse(&self.mesh.vertices[i0], &self.mesh.vertices[i1], &self.options) {
                    continue;
                }

                let (_, p) = calculate_error(&self.mesh, i0, i1, preserve_curvature);

                if flipped(&self.mesh, &p, i0, i1, &mut self.deleted0)
                    || flipped(&self.mesh, &p, i1, i0, &mut self.deleted1)
                {
                    continue;
                }

                collapse_edge(
                    &mut self.mesh,
                    tid,
                    edge,
                    p,
                    &self.deleted0,
                    &self.deleted1,
                    deleted_triangles,
                    preserve_curvature,
                );

                self.stats.collapses += 1;
                break;
            }

            if start_count - *deleted_triangles <= target_count {
                break;
            }
        }
    }
}

/// Reduces the number of triangles in the mesh towards `target_count`, attempting to preserve its appearance.
///
/// The result is a new, compacted mesh carrying the same attribute streams as the input. Its triangle count never
/// exceeds the input's and can stay above the target when the topology or the preservation options don't allow
/// further collapses.
///
/// # Arguments
///
/// * `target_count`: desired triangle count; values at or above the input triangle count leave the mesh untouched
///   apart from dropping unreferenced vertices
pub fn simplify_mesh(
    mesh: &MeshBuffers,
    target_count: usize,
    options: &SimplificationOptions,
) -> SimplifyResult<Simplification> {
    Ok(Simplifier::new(mesh, *options)?.simplify(target_count))
}

/// Like [simplify_mesh], but returns a copy of the input mesh if simplification fails or panics.
///
/// The failure is logged; a partially simplified mesh is never returned.
pub fn simplify_mesh_or_original(
    mesh: &MeshBuffers,
    target_count: usize,
    options: &SimplificationOptions,
) -> MeshBuffers {
    match catch_simplify(mesh, target_count, options) {
        Ok(simplification) => simplification.mesh,
        Err(err @ SimplifyError::Panicked(_)) => {
            error!(%err, "Mesh simplification failed, keeping the original mesh");
            mesh.clone()
        }
        Err(err) => {
            warn!(%err, "Mesh rejected by the simplifier, keeping the original mesh");
            mesh.clone()
        }
    }
}

fn catch_simplify(
    mesh: &MeshBuffers,
    target_count: usize,
    options: &SimplificationOptions,
) -> SimplifyResult<Simplification> {
    panic::catch_unwind(AssertUnwindSafe(|| simplify_mesh(mesh, target_count, options)))
        .unwrap_or_else(|payload| Err(SimplifyError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
