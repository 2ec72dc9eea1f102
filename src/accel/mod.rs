//! Acceleration structure boundary.
//!
//! The ray-tracing backend is an external component the core consumes
//! rather than owns — in the original C++ source this is Embree. Here it
//! is the [`AccelBackend`] trait: a scene built once over a
//! [`PrimitiveGeometry`] and queried many times by [`crate::RayTracer`].
//! [`bvh::Bvh`] is the production backend; [`linear::LinearScan`] is a
//! brute-force backend used as a correctness oracle in tests and as the
//! default for meshes too small to be worth building a tree over.
//!
//! `PrimitiveGeometry` plays the role an Embree wrapper's `UserGeometry`
//! callback trio (`set_bounds_function`/`set_intersect_function`/
//! `set_occluded_function`) plays against the real library: per-primitive
//! bounds/intersect/occlude behavior supplied by the caller, dispatched by
//! the backend during traversal. There is no FFI boundary here, so it is
//! expressed as a trait object instead of boxed `extern "C"` trampolines.

pub mod bvh;
pub mod linear;

use crate::Vec3;
use crate::{BoundingBox, FireType, HitOrientation, MeshID};
use std::sync::Arc;

/// A ray in the accelerator's coordinate space. `t_near`/`t_far` bound the
/// accepted hit distance; callers wanting hits behind the origin (occlusion
/// probes standing exactly on a boundary) set `t_near` negative.
///
/// `orientation`, `exclude_primitives`, and `fire_type` carry the same
/// per-query filter state the original ray struct threads through Embree's
/// intersect/occlude callback (`RTCSurfaceDualRay` in
/// `triangle_intersect.cpp`): a [`PrimitiveGeometry`] reads them back out of
/// the ray it was handed rather than receiving them as separate arguments.
#[derive(Debug, Clone)]
pub struct AccelRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_near: f64,
    pub t_far: f64,
    pub orientation: HitOrientation,
    pub exclude_primitives: Option<Arc<[MeshID]>>,
    pub fire_type: FireType,
}

impl AccelRay {
    pub fn new(origin: Vec3, direction: Vec3, t_near: f64, t_far: f64) -> Self {
        AccelRay {
            origin,
            direction,
            t_near,
            t_far,
            orientation: HitOrientation::Any,
            exclude_primitives: None,
            fire_type: FireType::Volume,
        }
    }
}

/// A successful intersection, identified by the primitive's index within
/// the scene's [`PrimitiveGeometry`] (not a [`MeshID`] — the caller maps
/// that back through its own `PrimitiveRef` buffer).
#[derive(Debug, Clone, Copy)]
pub struct AccelHit {
    pub prim_index: u32,
    pub t: f64,
}

/// Per-primitive geometry a scene is built over. One implementor typically
/// backs one surface tree or one element tree; `user_data` is whatever the
/// caller's callback needs to resolve sense/orientation (a [`crate::SurfaceBatch`]
/// or [`crate::ElementBatch`]), opaque to the accelerator itself.
pub trait PrimitiveGeometry: Send + Sync {
    fn primitive_count(&self) -> u32;

    /// World-space bounds of primitive `prim_index`, already dilated by
    /// whatever box-bump policy the caller wants baked in.
    fn bounds(&self, prim_index: u32) -> BoundingBox;

    /// Ray/primitive intersection. Implementations apply their own
    /// orientation/exclusion filters before returning `Some`; a backend
    /// never second-guesses a `None`.
    fn intersect(&self, prim_index: u32, ray: &AccelRay) -> Option<AccelHit>;

    /// Cheaper yes/no form of [`PrimitiveGeometry::intersect`] used for
    /// occlusion-only queries.
    fn occluded(&self, prim_index: u32, ray: &AccelRay) -> bool {
        self.intersect(prim_index, ray).is_some()
    }

    /// Closest point on primitive `prim_index` to `point`, used by
    /// `closest`/`closest_distance` queries.
    fn closest_point(&self, prim_index: u32, point: Vec3) -> Vec3;

    /// The [`MeshID`] the caller's `PrimitiveRef` buffer associates with
    /// `prim_index`, exposed so callback-free generic code (overlap
    /// checking, diagnostics) can report which mesh entity was hit.
    fn mesh_id(&self, prim_index: u32) -> MeshID;
}

/// A built acceleration scene. Construction is a one-shot commit: backends
/// are built once from a fixed [`PrimitiveGeometry`] and never mutated, so a
/// volume's re-tessellation requires rebuilding its tree rather than
/// updating it in place.
pub trait AccelBackend: Send + Sync {
    fn build(geometry: Arc<dyn PrimitiveGeometry>) -> Self
    where
        Self: Sized;

    /// Nearest intersection along the ray within `[ray.t_near, ray.t_far]`,
    /// or `None` if nothing was hit.
    fn intersect_nearest(&self, ray: &AccelRay) -> Option<AccelHit>;

    /// Whether anything occludes the ray within its distance range. May
    /// return as soon as one hit is found, unlike `intersect_nearest`.
    fn intersect_any(&self, ray: &AccelRay) -> bool;

    /// Nearest primitive to `point` within `max_radius`, and the point on
    /// it closest to `point`.
    fn closest(&self, point: Vec3, max_radius: f64) -> Option<(AccelHit, Vec3)>;
}

static_assertions::assert_obj_safe!(AccelBackend);
static_assertions::assert_obj_safe!(PrimitiveGeometry);
