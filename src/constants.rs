//! Fixed, compile-time numerical tolerances.
//!
//! None of these are exposed as query-time policy: they are constants of
//! the geometric kernels, not per-call parameters.

/// Clamp threshold below which a Plücker coordinate is treated as exactly
/// zero, to make two triangles sharing an edge agree bit-exactly.
pub const ZERO_TOL: f64 = 20.0 * f64::EPSILON;

/// Minimum per-volume bounding-box dilation applied to primitive AABBs
/// during BVH construction, for traversal robustness against float error.
pub const MIN_BOX_BUMP: f64 = 1e-3;

/// Small bump distance used to cross a surface after a hit, so a
/// re-fired ray does not immediately re-intersect the boundary it just
/// crossed.
pub const TINY_BIT: f64 = 1e-12;

/// Default probe direction used by `point_in_volume` when the caller
/// supplies none: an arbitrary non-axial direction. Axis-aligned probes
/// risk tangency on meshes with axis-planar triangles.
pub const DEFAULT_PROBE_DIRECTION: crate::Vec3 = crate::Vec3::new(
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
    0.0,
);

/// Stand-in for the mathematical "infinity" used throughout the original
/// implementation for "no limit"/"no hit" distances.
pub const INFTY: f64 = f64::INFINITY;
