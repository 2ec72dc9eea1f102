//! Signed-face-test point-in-tetrahedron containment, with the "exactly on a
//! face counts as inside" convention the ray-tracing layer relies on for
//! element-walk re-entry (a particle landing exactly on a shared tet face
//! must be considered inside both the tet it came from and the one it is
//! stepping into, until the walker explicitly steps across).

use crate::Vec3;

/// Signed distance of `point` from the plane through `(v0, v1, v2)`, along
/// that plane's normal. Zero means the point lies exactly on the plane.
fn face_side_test(point: &Vec3, v0: &Vec3, v1: &Vec3, v2: &Vec3) -> f64 {
    let face_normal = (*v1 - *v0).cross(&(*v2 - *v0)).normalized();

    let vec_a = *v0 - *point;
    let vec_b = *v1 - *point;
    let vec_c = *v2 - *point;

    let cross_product = vec_a.cross(&vec_b).normalized();
    cross_product.dot(&vec_c)
}

/// Fixed face winding used to test all four faces of the tetrahedron
/// `(v0, v1, v2, v3)` with outward-consistent normals.
pub fn tetrahedron_contains_point(point: &Vec3, v0: &Vec3, v1: &Vec3, v2: &Vec3, v3: &Vec3) -> bool {
    let sv0 = face_side_test(point, v0, v2, v1);
    if sv0 == 0.0 {
        return true;
    }
    let is_positive = sv0 > 0.0;

    let sv1 = face_side_test(point, v0, v1, v3);
    if sv1 == 0.0 {
        return true;
    }
    if (sv1 > 0.0) != is_positive {
        return false;
    }

    let sv2 = face_side_test(point, v0, v3, v2);
    if sv2 == 0.0 {
        return true;
    }
    if (sv2 > 0.0) != is_positive {
        return false;
    }

    let sv3 = face_side_test(point, v1, v2, v3);
    if sv3 == 0.0 {
        return true;
    }
    (sv3 > 0.0) == is_positive
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> (Vec3, Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn centroid_is_inside() {
        let (v0, v1, v2, v3) = unit_tet();
        let centroid = (v0 + v1 + v2 + v3) * 0.25;
        assert!(tetrahedron_contains_point(&centroid, &v0, &v1, &v2, &v3));
    }

    #[test]
    fn point_far_outside_is_rejected() {
        let (v0, v1, v2, v3) = unit_tet();
        let p = Vec3::new(10.0, 10.0, 10.0);
        assert!(!tetrahedron_contains_point(&p, &v0, &v1, &v2, &v3));
    }

    #[test]
    fn vertex_counts_as_inside() {
        let (v0, v1, v2, v3) = unit_tet();
        assert!(tetrahedron_contains_point(&v0, &v0, &v1, &v2, &v3));
    }
}
