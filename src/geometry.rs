//! Pure geometric kernels: no mesh ownership, no acceleration structure, no
//! sense/orientation policy. Everything here takes vertices in and returns
//! numbers or points out, so it is trivially unit-testable in isolation from
//! the rest of the crate.

pub mod closest_point;
pub mod measure;
pub mod plucker;
pub mod tetrahedron;

pub use closest_point::closest_point_on_triangle;
pub use measure::{tetrahedron_volume, triangle_area, triangle_volume_contribution};
pub use plucker::{orientation_sign, plucker_ray_tri_intersect};
pub use tetrahedron::tetrahedron_contains_point;
