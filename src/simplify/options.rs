//! Simplification options

use bitflags::bitflags;

use crate::error::{SimplifyError, SimplifyResult};

bitflags! {
    /// Features the simplifier should keep intact.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Preserve: u32 {
        /// Penalize collapses across curved regions using the normals of the surrounding triangles.
        const SurfaceCurvature = 1 << 0;
        /// Do not collapse edges touching vertices on the topological border (edges that don't have a paired triangle).
        const BorderEdges = 1 << 1;
        /// Do not collapse edges touching welded border vertices whose UVs differ.
        const UvSeamEdges = 1 << 2;
        /// Do not collapse edges touching welded border vertices whose UVs are identical.
        const UvFoldoverEdges = 1 << 3;
    }
}

/// Options controlling a simplification run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplificationOptions {
    pub preserve: Preserve,
    /// Weld border vertices closer than `vertex_link_distance` before simplifying. Default: true
    pub enable_smart_link: bool,
    /// Maximum distance between two border vertices for them to be welded. Default: `f64::MIN_POSITIVE`, welding only
    /// coincident vertices
    pub vertex_link_distance: f64,
    /// Upper bound on collapse passes. Default: 100
    pub max_iteration_count: usize,
    /// Exponent of the per-iteration error threshold growth; higher values trade quality for speed. Default: 7.0
    pub aggressiveness: f64,
}

impl Default for SimplificationOptions {
    fn default() -> Self {
        Self {
            preserve: Preserve::empty(),
            enable_smart_link: true,
            vertex_link_distance: f64::MIN_POSITIVE,
            max_iteration_count: 100,
            aggressiveness: 7.0,
        }
    }
}

impl SimplificationOptions {
    /// Options preserving borders, UV seams, UV foldovers and surface curvature.
    #[must_use]
    pub fn lossless() -> Self {
        Self {
            preserve: Preserve::all(),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_preserve(mut self, preserve: Preserve) -> Self {
        self.preserve = preserve;
        self
    }

    #[must_use]
    pub const fn with_smart_link(mut self, enable: bool) -> Self {
        self.enable_smart_link = enable;
        self
    }

    #[must_use]
    pub const fn with_vertex_link_distance(mut self, distance: f64) -> Self {
        self.vertex_link_distance = distance;
        self
    }

    #[must_use]
    pub const fn with_max_iteration_count(mut self, count: usize) -> Self {
        self.max_iteration_count = count;
        self
    }

    #[must_use]
    pub const fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    pub fn preserve_surface_curvature(&self) -> bool {
        self.preserve.contains(Preserve::SurfaceCurvature)
    }

    pub fn preserve_border_edges(&self) -> bool {
        self.preserve.contains(Preserve::BorderEdges)
    }

    pub fn preserve_uv_seam_edges(&self) -> bool {
        self.preserve.contains(Preserve::UvSeamEdges)
    }

    pub fn preserve_uv_foldover_edges(&self) -> bool {
        self.preserve.contains(Preserve::UvFoldoverEdges)
    }

    pub(crate) fn validate(&self) -> SimplifyResult<()> {
        if !self.aggressiveness.is_finite() {
            return Err(SimplifyError::InvalidAggressiveness(self.aggressiveness));
        }

        if !self.vertex_link_distance.is_finite() || self.vertex_link_distance < 0.0 {
            return Err(SimplifyError::InvalidLinkDistance(self.vertex_link_distance));
        }

        Ok(())
    }
}
