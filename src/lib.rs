//! XDG: a discrete-geometry ray-tracing core for unstructured-mesh particle
//! transport.
//!
//! Four geometric queries — ray fire, point-in-volume, closest surface, and
//! element location — answered against a CAD-like topology (volumes bounded
//! by surfaces with a sense, surfaces made of triangles, volumes optionally
//! decomposed into tetrahedra) stamped onto a mesh owned by whatever
//! implements [`MeshProvider`]. The acceleration structure is pluggable via
//! [`AccelBackend`]; [`Bvh`] is the default.
//!
//! ```text
//! caller -> Xdg -> RayTracer (looks up the scene bound to a volume)
//!        -> AccelBackend (traverses the tree, calling back into geometry)
//!        -> Plücker / tetrahedron-containment kernel -> filters -> Hit
//! ```

mod accel;
mod block_map;
mod config;
mod constants;
mod error;
mod filters;
mod geometry;
mod ids;
mod mesh_provider;
#[cfg(any(test, feature = "test-util"))]
mod mock;
mod overlap;
mod primitive;
mod ray_tracer;
mod vec3;
mod walker;
mod xdg;

pub use accel::bvh::Bvh;
pub use accel::linear::LinearScan;
pub use accel::{AccelBackend, AccelHit, AccelRay, PrimitiveGeometry};
pub use block_map::BlockMapping;
pub use config::{config, set_n_threads, Config};
pub use constants::{DEFAULT_PROBE_DIRECTION, INFTY, MIN_BOX_BUMP, TINY_BIT, ZERO_TOL};
pub use error::{fatal_error, warning, XdgError, XdgResult};
pub use filters::{orientation_cull, primitive_mask_cull};
pub use geometry::{
    closest_point_on_triangle, orientation_sign, plucker_ray_tri_intersect, tetrahedron_contains_point,
    tetrahedron_volume, triangle_area, triangle_volume_contribution,
};
pub use ids::{FireType, HitOrientation, MeshID, Sense, TreeID, ID_NONE};
pub use mesh_provider::MeshProvider;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MeshMock;
pub use overlap::{
    check_along_edge, check_instance_for_overlaps, check_location_for_overlap, report_overlaps,
    return_ray_queries, EdgeRayQuery, OverlapMap,
};
pub use primitive::{ElementBatch, PrimitiveRef, SurfaceBatch};
pub use ray_tracer::{Hit, RayTracer};
pub use vec3::{BoundingBox, Vec3};
pub use walker::{
    random_direction, sample_box_location, summarize, walk_particle, walk_particles, ParticleTrack,
    TerminationReason, WalkConfig,
};
pub use xdg::Xdg;
