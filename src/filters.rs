//! Ray-fire filters applied inside a surface geometry's intersect callback,
//! ported from `orientation_cull`/`primitive_mask_cull` in
//! `triangle_intersect.cpp`.

use crate::{HitOrientation, MeshID, Vec3};

/// Whether a hit with the given ray direction and (already sense-resolved)
/// surface normal should be culled for not matching the requested
/// orientation.
pub fn orientation_cull(ray_dir: &Vec3, normal: &Vec3, orientation: HitOrientation) -> bool {
    if orientation == HitOrientation::Any {
        return false;
    }

    let dot_prod = ray_dir.dot(normal);
    match orientation {
        HitOrientation::Exiting => dot_prod < 0.0,
        HitOrientation::Entering => dot_prod >= 0.0,
        HitOrientation::Any => unreachable!(),
    }
}

/// Whether `mesh_id` is in the caller's exclusion list for this query.
pub fn primitive_mask_cull(excluded: &[MeshID], mesh_id: MeshID) -> bool {
    excluded.contains(&mesh_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_rejects_exiting_hit() {
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let normal = Vec3::new(0.0, 0.0, -1.0); // ray . normal >= 0 -> exiting
        assert!(orientation_cull(&ray_dir, &normal, HitOrientation::Entering));
    }

    #[test]
    fn entering_accepts_entering_hit() {
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let normal = Vec3::new(0.0, 0.0, 1.0); // ray . normal < 0 -> entering
        assert!(!orientation_cull(&ray_dir, &normal, HitOrientation::Entering));
    }

    #[test]
    fn any_never_culls() {
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let normal = Vec3::new(0.0, 0.0, 1.0);
        assert!(!orientation_cull(&ray_dir, &normal, HitOrientation::Any));
    }

    #[test]
    fn mask_culls_listed_primitives_only() {
        assert!(primitive_mask_cull(&[1, 2, 3], 2));
        assert!(!primitive_mask_cull(&[1, 2, 3], 4));
        assert!(!primitive_mask_cull(&[], 4));
    }
}
