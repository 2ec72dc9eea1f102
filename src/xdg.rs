//! `Xdg`: the top-level service facade combining a [`MeshProvider`] with a
//! [`RayTracer`] over every volume the provider knows about. Grounded in
//! `include/xdg/xdg.h` / `src/xdg.cpp`, generalized from "one Embree
//! `RayTracer`" to "any `AccelBackend`".

use std::sync::Arc;

use crate::accel::AccelBackend;
use crate::error::{XdgError, XdgResult};
use crate::mesh_provider::MeshProvider;
use crate::ray_tracer::{Hit, RayTracer};
use crate::{HitOrientation, MeshID, Sense, Vec3, ID_NONE};

pub struct Xdg<B: AccelBackend> {
    mesh: Arc<dyn MeshProvider>,
    ray_tracer: RayTracer<B>,
}

impl<B: AccelBackend> Xdg<B> {
    pub fn new(mesh: Arc<dyn MeshProvider>) -> Self {
        let ray_tracer = RayTracer::new(Arc::clone(&mesh));
        Xdg { mesh, ray_tracer }
    }

    /// Builds surface and element trees for every volume the provider
    /// reports. Mirrors `XDG::prepare_raytracer`.
    pub fn prepare_raytracer(&mut self) {
        for volume in self.mesh.volumes() {
            self.ray_tracer.register_volume(volume);
        }
    }

    pub fn prepare_volume_for_raytracing(&mut self, volume: MeshID) {
        self.ray_tracer.register_volume(volume);
    }

    /// The volume containing `point`, found by probing each registered
    /// volume's surface tree in turn and returning the first that reports
    /// the point inside. Mirrors `XDG::find_volume`'s linear scan over
    /// `volume_to_surface_tree_map_`.
    pub fn find_volume(&self, point: Vec3, direction: Vec3) -> MeshID {
        self.mesh
            .volumes()
            .into_iter()
            .find(|&volume| {
                self.ray_tracer
                    .point_in_volume(volume, point, Some(direction))
                    .unwrap_or(false)
            })
            .unwrap_or(ID_NONE)
    }

    /// The element (of any registered volume) containing `point`.
    pub fn find_element(&self, point: Vec3) -> MeshID {
        for volume in self.mesh.volumes() {
            if let Ok(Some(element)) = self.ray_tracer.find_element(volume, point) {
                return element;
            }
        }
        ID_NONE
    }

    /// The element of `volume` containing `point`.
    pub fn find_element_in_volume(&self, volume: MeshID, point: Vec3) -> XdgResult<Option<MeshID>> {
        self.ray_tracer.find_element(volume, point)
    }

    /// The neighboring element across the exit face of `element` in
    /// direction `u` from `r`, and the distance to that face.
    pub fn next_element(&self, element: MeshID, r: Vec3, u: Vec3) -> (MeshID, f64) {
        self.mesh.next_element(element, &r, &u)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ray_fire(
        &self,
        volume: MeshID,
        origin: Vec3,
        direction: Vec3,
        dist_limit: f64,
        orientation: HitOrientation,
        exclude_primitives: Option<Arc<[MeshID]>>,
    ) -> XdgResult<Option<Hit>> {
        self.ray_tracer
            .ray_fire(volume, origin, direction, dist_limit, orientation, exclude_primitives)
    }

    pub fn point_in_volume(
        &self,
        volume: MeshID,
        point: Vec3,
        direction: Option<Vec3>,
    ) -> XdgResult<bool> {
        self.ray_tracer.point_in_volume(volume, point, direction)
    }

    pub fn occluded(
        &self,
        volume: MeshID,
        origin: Vec3,
        direction: Vec3,
        dist_limit: f64,
    ) -> XdgResult<bool> {
        self.ray_tracer.occluded(volume, origin, direction, dist_limit)
    }

    pub fn closest(&self, volume: MeshID, origin: Vec3) -> XdgResult<Option<(MeshID, Vec3, f64)>> {
        self.ray_tracer.closest(volume, origin, f64::INFINITY)
    }

    pub fn closest_distance(&self, volume: MeshID, origin: Vec3) -> XdgResult<Option<f64>> {
        Ok(self.closest(volume, origin)?.map(|(_, _, dist)| dist))
    }

    /// Outward normal of `surface` at `point`. If `exclude_primitives` is
    /// non-empty, its last entry is taken directly as the triangle to use
    /// (mirrors the original's "caller already knows which triangle it hit"
    /// shortcut); otherwise the closest triangle of `surface`'s first
    /// parent volume is looked up fresh.
    pub fn surface_normal(
        &self,
        surface: MeshID,
        point: Vec3,
        exclude_primitives: Option<&[MeshID]>,
    ) -> XdgResult<Vec3> {
        if let Some(&triangle) = exclude_primitives.and_then(|ex| ex.last()) {
            return Ok(self.mesh.face_normal(triangle));
        }

        let parents = self.mesh.surface_parent_volumes(surface);
        let volume = *parents
            .first()
            .ok_or(XdgError::UnknownSurface(surface))?;
        let (triangle, _, _) = self
            .ray_tracer
            .closest(volume, point, f64::INFINITY)?
            .ok_or(XdgError::UnknownSurface(surface))?;
        Ok(self.mesh.face_normal(triangle))
    }

    /// Signed volume enclosed by `volume`'s surfaces, by divergence-theorem
    /// accumulation over every triangle, sign-flipped per reversed surface.
    /// Mirrors `XDG::measure_volume`.
    pub fn measure_volume(&self, volume: MeshID) -> f64 {
        let mut total = 0.0;
        for (surface, sense) in self.mesh.volume_surfaces(volume) {
            let mut contribution = 0.0;
            for triangle in self.mesh.surface_faces(surface) {
                let v = self.mesh.face_vertices(triangle);
                contribution += crate::geometry::triangle_volume_contribution(&v[0], &v[1], &v[2]);
            }
            if sense == Sense::Reverse {
                contribution = -contribution;
            }
            total += contribution;
        }
        total / 6.0
    }

    pub fn measure_surface_area(&self, surface: MeshID) -> f64 {
        self.mesh
            .surface_faces(surface)
            .into_iter()
            .map(|triangle| {
                let v = self.mesh.face_vertices(triangle);
                crate::geometry::triangle_area(&v[0], &v[1], &v[2])
            })
            .sum()
    }

    pub fn measure_volume_area(&self, volume: MeshID) -> f64 {
        self.mesh
            .volume_surfaces(volume)
            .into_iter()
            .map(|(surface, _)| self.measure_surface_area(surface))
            .sum()
    }

    /// Walks `start` to `end` against `volume`'s surface tree, firing
    /// repeatedly with [`HitOrientation::Exiting`] and bumping past each
    /// crossing by [`crate::constants::TINY_BIT`] so the next fire does not
    /// immediately re-hit the surface it just crossed. Each returned pair is
    /// `(volume, sub_length)` for the stretch of the ray between two
    /// consecutive boundary crossings (or between `start` and the first
    /// crossing). Stops once the accumulated length reaches
    /// `|end - start|` or a fire comes back empty.
    pub fn segments_in_volume(&self, volume: MeshID, start: Vec3, end: Vec3) -> Vec<(MeshID, f64)> {
        let total = (end - start).length();
        if total < crate::constants::ZERO_TOL {
            return Vec::new();
        }
        let direction = (end - start) / total;

        let mut out = Vec::new();
        let mut traveled = 0.0;
        let mut r = start;
        let mut excluded: Vec<MeshID> = Vec::new();

        while traveled < total {
            let remaining = total - traveled;
            let exclude = if excluded.is_empty() {
                None
            } else {
                Some(Arc::from(excluded.as_slice()))
            };
            let hit = match self.ray_fire(volume, r, direction, remaining, HitOrientation::Exiting, exclude) {
                Ok(Some(hit)) => hit,
                _ => break,
            };

            out.push((volume, hit.distance));
            traveled += hit.distance;
            r = r + direction * (hit.distance + crate::constants::TINY_BIT);
            excluded.push(hit.triangle);
        }

        out
    }

    /// Walks `start` to `end`, switching volumes at every boundary crossing.
    /// Locates the starting volume with [`find_volume`](Self::find_volume),
    /// delegates each leg to [`segments_in_volume`](Self::segments_in_volume),
    /// then re-locates the volume just past the exit point (`exit + TINY *
    /// direction`) to continue into whatever volume was re-entered. Stops
    /// when the requested length is covered or no volume claims the point
    /// past an exit.
    pub fn segments(&self, start: Vec3, end: Vec3) -> Vec<(MeshID, f64)> {
        let total = (end - start).length();
        if total < crate::constants::ZERO_TOL {
            return Vec::new();
        }
        let direction = (end - start) / total;

        let mut out = Vec::new();
        let mut traveled = 0.0;
        let mut r = start;
        let mut volume = self.find_volume(r, direction);

        while volume != ID_NONE && traveled < total - crate::constants::ZERO_TOL {
            let leg_end = r + direction * (total - traveled);
            let leg = self.segments_in_volume(volume, r, leg_end);
            if leg.is_empty() {
                break;
            }

            let leg_len: f64 = leg.iter().map(|(_, len)| len).sum();
            out.extend(leg);
            traveled += leg_len;
            r = r + direction * (leg_len + crate::constants::TINY_BIT);

            if traveled >= total - crate::constants::ZERO_TOL {
                break;
            }
            volume = self.find_volume(r, direction);
        }

        out
    }

    pub fn mesh(&self) -> &Arc<dyn MeshProvider> {
        &self.mesh
    }

    pub fn ray_tracer(&self) -> &RayTracer<B> {
        &self.ray_tracer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::bvh::Bvh;
    use crate::mock::MeshMock;

    #[test]
    fn find_volume_locates_the_only_volume() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut xdg: Xdg<Bvh> = Xdg::new(mesh);
        xdg.prepare_raytracer();

        assert_eq!(xdg.find_volume(center, Vec3::new(1.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn find_volume_outside_every_volume_returns_id_none() {
        let mesh = MeshMock::unit_cube();
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut xdg: Xdg<Bvh> = Xdg::new(mesh);
        xdg.prepare_raytracer();

        let far = Vec3::new(1.0e6, 1.0e6, 1.0e6);
        assert_eq!(xdg.find_volume(far, Vec3::new(1.0, 0.0, 0.0)), ID_NONE);
    }

    #[test]
    fn measure_volume_matches_box_volume() {
        let mesh = MeshMock::unit_cube();
        let bbox = mesh.bounding_box();
        let expected = (bbox.upper.x - bbox.lower.x)
            * (bbox.upper.y - bbox.lower.y)
            * (bbox.upper.z - bbox.lower.z);
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut xdg: Xdg<Bvh> = Xdg::new(mesh);
        xdg.prepare_raytracer();

        assert!((xdg.measure_volume(0) - expected).abs() < 1e-6);
    }

    #[test]
    fn segments_cover_the_full_requested_distance() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let top = Vec3::new(center.x, center.y, mesh.bounding_box().upper.z);
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut xdg: Xdg<Bvh> = Xdg::new(mesh);
        xdg.prepare_raytracer();

        let segs = xdg.segments(center, top);
        assert!(!segs.is_empty());
        let total: f64 = segs.iter().map(|(_, len)| len).sum();
        assert!((total - (top - center).length()).abs() < 1e-6);
    }

    #[test]
    fn segments_in_volume_reports_the_owning_volume_for_every_leg() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let top = Vec3::new(center.x, center.y, mesh.bounding_box().upper.z);
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut xdg: Xdg<Bvh> = Xdg::new(mesh);
        xdg.prepare_raytracer();

        let segs = xdg.segments_in_volume(0, center, top);
        assert!(!segs.is_empty());
        assert!(segs.iter().all(|&(volume, _)| volume == 0));
    }
}
