//! Brute-force scene: checks every primitive, no tree. Used as the
//! default for tiny meshes and as a correctness oracle the BVH is tested
//! against.

use super::{AccelBackend, AccelHit, AccelRay, PrimitiveGeometry};
use crate::Vec3;
use std::sync::Arc;

pub struct LinearScan {
    geometry: Arc<dyn PrimitiveGeometry>,
}

impl AccelBackend for LinearScan {
    fn build(geometry: Arc<dyn PrimitiveGeometry>) -> Self {
        LinearScan { geometry }
    }

    fn intersect_nearest(&self, ray: &AccelRay) -> Option<AccelHit> {
        let mut probe = ray.clone();
        let mut closest = None;
        for i in 0..self.geometry.primitive_count() {
            if let Some(hit) = self.geometry.intersect(i, &probe) {
                if hit.t <= probe.t_far {
                    probe.t_far = hit.t;
                    closest = Some(hit);
                }
            }
        }
        closest
    }

    fn intersect_any(&self, ray: &AccelRay) -> bool {
        (0..self.geometry.primitive_count()).any(|i| self.geometry.occluded(i, ray))
    }

    fn closest(&self, point: Vec3, max_radius: f64) -> Option<(AccelHit, Vec3)> {
        let mut best_dist = max_radius;
        let mut best = None;
        for i in 0..self.geometry.primitive_count() {
            let p = self.geometry.closest_point(i, point);
            let dist = (p - point).length();
            if dist < best_dist {
                best_dist = dist;
                best = Some((
                    AccelHit {
                        prim_index: i,
                        t: dist,
                    },
                    p,
                ));
            }
        }
        best
    }
}
