//! Plücker-coordinate ray/triangle intersection.
//!
//! Triangle vertices are ordered counter-clockwise when viewed from the
//! front face (normal pointing out of the plane), per
//! <https://doi.org/10.1002/cnm.1237>.
//!
//! ```text
//!      v2
//!     /  \
//!    /    \
//!   /      \
//!  /        \
//! v0--------v1
//! ```
//!
//! The edge test below orders each edge's endpoints with [`first`] before
//! computing its Plücker coordinate. Two triangles that share an edge will
//! then evaluate that edge identically regardless of which triangle's
//! winding visits it first, which is what makes shared-edge hits agree
//! bit-for-bit between neighboring triangles (a watertight mesh never lets
//! a ray slip through a shared edge due to rounding).

use crate::constants::ZERO_TOL;
use crate::Vec3;

/// Returns whether `a` sorts before `b` in the fixed lexicographic vertex
/// order used to canonicalize an edge's endpoints.
fn first(a: &Vec3, b: &Vec3) -> bool {
    if a.x < b.x {
        return true;
    }
    if a.x > b.x {
        return false;
    }
    if a.y < b.y {
        return true;
    }
    if a.y > b.y {
        return false;
    }
    a.z < b.z
}

/// Plücker coordinate of one triangle edge against the ray `(ray, ray_normal)`
/// (the ray's direction and moment, respectively). Values smaller than
/// [`ZERO_TOL`] in magnitude are clamped to exactly zero.
pub(crate) fn plucker_edge_test(vertex_a: &Vec3, vertex_b: &Vec3, ray: &Vec3, ray_normal: &Vec3) -> f64 {
    let mut pip;
    if first(vertex_a, vertex_b) {
        let edge = *vertex_b - *vertex_a;
        let edge_normal = edge.cross(vertex_a);
        pip = ray.dot(&edge_normal) + ray_normal.dot(&edge);
    } else {
        let edge = *vertex_a - *vertex_b;
        let edge_normal = edge.cross(vertex_b);
        pip = ray.dot(&edge_normal) + ray_normal.dot(&edge);
        pip = -pip;
    }
    if pip.abs() < ZERO_TOL {
        pip = 0.0;
    }
    pip
}

/// Sign of an orientation-filtered hit. A ray fire with
/// [`crate::HitOrientation::Entering`]/[`crate::HitOrientation::Exiting`]
/// narrows to one sign here; `Any` leaves this `None` and falls back to the
/// plain same-sign-or-zero rule among the three Plücker coordinates.
pub fn orientation_sign(orientation: crate::HitOrientation) -> Option<i32> {
    match orientation {
        crate::HitOrientation::Entering => Some(-1),
        crate::HitOrientation::Exiting => Some(1),
        crate::HitOrientation::Any => None,
    }
}

/// Ray/triangle intersection distance, or `None` if the ray misses the
/// triangle or falls outside `[neg_ray_len, nonneg_ray_len]`.
///
/// `neg_ray_len`, when given, allows hits behind the ray origin down to that
/// (negative) distance — used for occlusion-style queries that must not miss
/// a surface the ray origin sits exactly on. Without it, negative distances
/// are always rejected.
pub fn plucker_ray_tri_intersect(
    vertices: &[Vec3; 3],
    origin: &Vec3,
    direction: &Vec3,
    nonneg_ray_len: f64,
    neg_ray_len: Option<f64>,
    orientation: Option<i32>,
) -> Option<f64> {
    let raya = *direction;
    let rayb = direction.cross(origin);

    let coord0 = plucker_edge_test(&vertices[0], &vertices[1], &raya, &rayb);
    if let Some(o) = orientation {
        if (o as f64) * coord0 > 0.0 {
            return None;
        }
    }

    let coord1 = plucker_edge_test(&vertices[1], &vertices[2], &raya, &rayb);
    if let Some(o) = orientation {
        if (o as f64) * coord1 > 0.0 {
            return None;
        }
    } else if (coord0 > 0.0 && coord1 < 0.0) || (coord0 < 0.0 && coord1 > 0.0) {
        return None;
    }

    let coord2 = plucker_edge_test(&vertices[2], &vertices[0], &raya, &rayb);
    if let Some(o) = orientation {
        if (o as f64) * coord2 > 0.0 {
            return None;
        }
    } else if (coord1 > 0.0 && coord2 < 0.0)
        || (coord1 < 0.0 && coord2 > 0.0)
        || (coord0 > 0.0 && coord2 < 0.0)
        || (coord0 < 0.0 && coord2 > 0.0)
    {
        return None;
    }

    if coord0 == 0.0 && coord1 == 0.0 && coord2 == 0.0 {
        // Coplanar ray and triangle: no well-defined single intersection.
        return None;
    }

    let inverse_sum = 1.0 / (coord0 + coord1 + coord2);
    let intersection = vertices[2] * (coord0 * inverse_sum)
        + vertices[0] * (coord1 * inverse_sum)
        + vertices[1] * (coord2 * inverse_sum);

    // Divide along the direction's dominant axis to minimize cancellation error.
    let idx = direction.dominant_axis();
    let dist = (intersection[idx] - origin[idx]) / direction[idx];

    if dist > nonneg_ray_len {
        return None;
    }
    match neg_ray_len {
        Some(limit) => {
            if dist < limit {
                return None;
            }
        }
        None => {
            if dist < 0.0 {
                return None;
            }
        }
    }

    Some(dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Vec3; 3] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn straight_down_hits_triangle_center_of_mass() {
        let tri = unit_triangle();
        let origin = Vec3::new(0.2, 0.2, 1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        let dist =
            plucker_ray_tri_intersect(&tri, &origin, &dir, f64::INFINITY, None, None).unwrap();
        assert!((dist - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ray_outside_triangle_footprint_misses() {
        let tri = unit_triangle();
        let origin = Vec3::new(5.0, 5.0, 1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        assert!(plucker_ray_tri_intersect(&tri, &origin, &dir, f64::INFINITY, None, None).is_none());
    }

    #[test]
    fn shared_edge_test_is_winding_independent() {
        // The edge test must depend only on the unordered pair of endpoints,
        // not on which triangle visits them in which order — this is what
        // lets two triangles sharing an edge agree on a ray passing through
        // it, regardless of each triangle's own winding.
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let ray = Vec3::new(0.0, 0.0, -1.0);
        let ray_normal = ray.cross(&Vec3::new(0.5, 0.0, 1.0));

        let forward = plucker_edge_test(&a, &b, &ray, &ray_normal);
        let reversed = plucker_edge_test(&b, &a, &ray, &ray_normal);
        assert!((forward + reversed).abs() < 1e-12);
    }

    #[test]
    fn negative_distance_rejected_without_neg_ray_len() {
        let tri = unit_triangle();
        let origin = Vec3::new(0.2, 0.2, -1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        assert!(plucker_ray_tri_intersect(&tri, &origin, &dir, f64::INFINITY, None, None).is_none());
    }

    #[test]
    fn negative_distance_accepted_within_neg_ray_len() {
        let tri = unit_triangle();
        let origin = Vec3::new(0.2, 0.2, -1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        let dist =
            plucker_ray_tri_intersect(&tri, &origin, &dir, f64::INFINITY, Some(-10.0), None)
                .unwrap();
        assert!((dist + 1.0).abs() < 1e-12);
    }
}
