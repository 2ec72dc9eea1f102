//! Volume/area contributions used by [`crate::xdg::Xdg::measure_volume`] and
//! [`crate::xdg::Xdg::measure_surface_area`].

use crate::Vec3;

/// Signed contribution of one triangle to the divergence-theorem volume sum
/// over a closed surface. Summing this over every triangle of a watertight
/// surface and dividing by six gives the enclosed volume.
pub fn triangle_volume_contribution(v0: &Vec3, v1: &Vec3, v2: &Vec3) -> f64 {
    v0.dot(&(*v1 - *v0).cross(&(*v2 - *v0)))
}

pub fn triangle_area(v0: &Vec3, v1: &Vec3, v2: &Vec3) -> f64 {
    0.5 * (*v1 - *v0).cross(&(*v2 - *v0)).length()
}

pub fn tetrahedron_volume(v0: &Vec3, v1: &Vec3, v2: &Vec3, v3: &Vec3) -> f64 {
    ((*v1 - *v0).cross(&(*v2 - *v0))).dot(&(*v3 - *v0)).abs() / 6.0
}
