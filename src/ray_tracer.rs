//! The `RayTracer` facade: per-volume surface and element trees, built over
//! a [`MeshProvider`] and queried through [`AccelBackend`]. Grounded in
//! `ray_tracing_interface.h` / `src/embree/ray_tracer.cpp`, generalized from
//! "the Embree backend" to "any `AccelBackend`".

use std::collections::HashMap;
use std::sync::Arc;

use crate::accel::{AccelBackend, AccelHit, AccelRay, PrimitiveGeometry};
use crate::constants::{DEFAULT_PROBE_DIRECTION, MIN_BOX_BUMP};
use crate::error::{fatal_error, XdgError, XdgResult};
use crate::mesh_provider::MeshProvider;
use crate::primitive::PrimitiveRef;
use crate::{BoundingBox, FireType, HitOrientation, MeshID, Sense, Vec3};

/// One per-volume surface tree's geometry: every triangle of every surface
/// bounding the volume, flattened into one buffer the scene indexes by
/// primitive index.
struct SurfaceTreeGeometry {
    mesh: Arc<dyn MeshProvider>,
    prim_refs: Vec<PrimitiveRef>,
    surface_ids: Vec<MeshID>,
    flip_normal: Vec<bool>,
    box_bump: f64,
}

impl PrimitiveGeometry for SurfaceTreeGeometry {
    fn primitive_count(&self) -> u32 {
        self.prim_refs.len() as u32
    }

    fn bounds(&self, prim_index: u32) -> BoundingBox {
        let face = self.prim_refs[prim_index as usize].primitive_id;
        self.mesh.face_bounding_box(face).dilated(self.box_bump)
    }

    fn intersect(&self, prim_index: u32, ray: &AccelRay) -> Option<AccelHit> {
        let i = prim_index as usize;
        let face = self.prim_refs[i].primitive_id;
        let vertices = self.mesh.face_vertices(face);

        let dist = crate::geometry::plucker_ray_tri_intersect(
            &vertices,
            &ray.origin,
            &ray.direction,
            ray.t_far,
            Some(ray.t_near),
            None,
        )?;

        let mut normal = self.mesh.face_normal(face);
        if self.flip_normal[i] && ray.fire_type != FireType::FindVolume {
            normal = -normal;
        }

        if ray.fire_type == FireType::Volume {
            if crate::filters::orientation_cull(&ray.direction, &normal, ray.orientation) {
                return None;
            }
            if let Some(excluded) = &ray.exclude_primitives {
                if crate::filters::primitive_mask_cull(excluded, face) {
                    return None;
                }
            }
        }

        Some(AccelHit {
            prim_index,
            t: dist,
        })
    }

    fn closest_point(&self, prim_index: u32, point: Vec3) -> Vec3 {
        let face = self.prim_refs[prim_index as usize].primitive_id;
        let v = self.mesh.face_vertices(face);
        crate::geometry::closest_point_on_triangle(&v[0], &v[1], &v[2], &point)
    }

    fn mesh_id(&self, prim_index: u32) -> MeshID {
        self.prim_refs[prim_index as usize].primitive_id
    }
}

/// One per-volume element tree's geometry: every tetrahedron of the
/// volume, all Forward sense (tets have no orientation concept).
struct ElementTreeGeometry {
    mesh: Arc<dyn MeshProvider>,
    elements: Vec<MeshID>,
}

impl PrimitiveGeometry for ElementTreeGeometry {
    fn primitive_count(&self) -> u32 {
        self.elements.len() as u32
    }

    fn bounds(&self, prim_index: u32) -> BoundingBox {
        self.mesh
            .element_bounding_box(self.elements[prim_index as usize])
    }

    fn intersect(&self, _prim_index: u32, _ray: &AccelRay) -> Option<AccelHit> {
        // Element trees are only ever queried by `find_element`'s point
        // containment test, never by a ray fire.
        None
    }

    fn closest_point(&self, prim_index: u32, point: Vec3) -> Vec3 {
        // Not a meaningful operation for a volumetric primitive; return the
        // query point itself if it's inside, else its nearest vertex.
        let v = self.mesh.element_vertices(self.elements[prim_index as usize]);
        if crate::geometry::tetrahedron_contains_point(&point, &v[0], &v[1], &v[2], &v[3]) {
            return point;
        }
        v.iter()
            .copied()
            .min_by(|a, b| (*a - point).length().total_cmp(&(*b - point).length()))
            .unwrap()
    }

    fn mesh_id(&self, prim_index: u32) -> MeshID {
        self.elements[prim_index as usize]
    }
}

impl ElementTreeGeometry {
    fn find_containing(&self, point: &Vec3) -> Option<MeshID> {
        self.elements.iter().copied().find(|&e| {
            let v = self.mesh.element_vertices(e);
            crate::geometry::tetrahedron_contains_point(point, &v[0], &v[1], &v[2], &v[3])
        })
    }
}

/// A single ray-tracing hit result, surfaced back to the caller with the
/// mesh IDs it needs rather than raw primitive indices.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub distance: f64,
    pub surface: MeshID,
    pub triangle: MeshID,
    pub normal: Vec3,
}

/// Registers per-volume surface/element trees over a [`MeshProvider`] and
/// answers ray-fire, point-in-volume, closest-surface, and element-location
/// queries against them. Generic over the acceleration backend so the BVH
/// backend and the brute-force oracle can share every call site.
pub struct RayTracer<B: AccelBackend> {
    mesh: Arc<dyn MeshProvider>,
    surface_trees: HashMap<MeshID, B>,
    surface_geometries: HashMap<MeshID, Arc<SurfaceTreeGeometry>>,
    element_trees: HashMap<MeshID, B>,
    element_geometries: HashMap<MeshID, Arc<ElementTreeGeometry>>,
    bounding_box_bump: f64,
}

impl<B: AccelBackend> RayTracer<B> {
    pub fn new(mesh: Arc<dyn MeshProvider>) -> Self {
        RayTracer {
            mesh,
            surface_trees: HashMap::new(),
            surface_geometries: HashMap::new(),
            element_trees: HashMap::new(),
            element_geometries: HashMap::new(),
            bounding_box_bump: MIN_BOX_BUMP,
        }
    }

    pub fn set_bounding_box_bump(&mut self, bump: f64) {
        self.bounding_box_bump = bump;
    }

    /// Builds the surface tree for `volume`: every triangle of every
    /// surface bounding it, with sense resolved per-surface so a reversed
    /// surface's normal gets flipped at query time.
    ///
    /// Panics (via [`fatal_error`]) if a surface claimed by `volume` does
    /// not actually list `volume` as a parent — a mesh-provider consistency
    /// bug, not a condition a caller can recover from.
    pub fn create_surface_tree(&mut self, volume: MeshID) {
        let mut prim_refs = Vec::new();
        let mut surface_ids = Vec::new();
        let mut flip_normal = Vec::new();

        for (surface, sense) in self.mesh.volume_surfaces(volume) {
            let parents = self.mesh.surface_parent_volumes(surface);
            if !parents.contains(&volume) {
                fatal_error(format!(
                    "surface {surface} claims volume {volume} but does not list it as a parent"
                ));
            }

            let flip = sense == Sense::Reverse;
            for face in self.mesh.surface_faces(surface) {
                prim_refs.push(PrimitiveRef {
                    primitive_id: face,
                    sense,
                });
                surface_ids.push(surface);
                flip_normal.push(flip);
            }
        }

        let geometry = Arc::new(SurfaceTreeGeometry {
            mesh: Arc::clone(&self.mesh),
            prim_refs,
            surface_ids,
            flip_normal,
            box_bump: self.bounding_box_bump,
        });

        let scene = B::build(geometry.clone() as Arc<dyn PrimitiveGeometry>);
        self.surface_trees.insert(volume, scene);
        self.surface_geometries.insert(volume, geometry);
    }

    /// Builds the element tree for `volume`: every tetrahedron of the
    /// volume, all Forward sense.
    pub fn create_element_tree(&mut self, volume: MeshID) {
        let elements = self.mesh.volume_elements(volume);
        let geometry = Arc::new(ElementTreeGeometry {
            mesh: Arc::clone(&self.mesh),
            elements,
        });
        let scene = B::build(geometry.clone() as Arc<dyn PrimitiveGeometry>);
        self.element_trees.insert(volume, scene);
        self.element_geometries.insert(volume, geometry);
    }

    /// Builds both trees for `volume` in one call.
    pub fn register_volume(&mut self, volume: MeshID) {
        self.create_surface_tree(volume);
        self.create_element_tree(volume);
    }

    fn surface_tree(&self, volume: MeshID) -> XdgResult<&B> {
        self.surface_trees
            .get(&volume)
            .ok_or(XdgError::NoSurfaceTree(volume))
    }

    fn surface_geometry(&self, volume: MeshID) -> XdgResult<&Arc<SurfaceTreeGeometry>> {
        self.surface_geometries
            .get(&volume)
            .ok_or(XdgError::NoSurfaceTree(volume))
    }

    /// Fires a ray against `volume`'s surface tree, returning the nearest
    /// hit accepted by `orientation` and not excluded by `exclude`.
    #[allow(clippy::too_many_arguments)]
    pub fn ray_fire(
        &self,
        volume: MeshID,
        origin: Vec3,
        direction: Vec3,
        t_far: f64,
        orientation: HitOrientation,
        exclude: Option<Arc<[MeshID]>>,
    ) -> XdgResult<Option<Hit>> {
        let scene = self.surface_tree(volume)?;
        let geometry = self.surface_geometry(volume)?;

        let ray = AccelRay {
            origin,
            direction,
            t_near: 0.0,
            t_far,
            orientation,
            exclude_primitives: exclude,
            fire_type: FireType::Volume,
        };

        Ok(scene.intersect_nearest(&ray).map(|hit| {
            let i = hit.prim_index as usize;
            let face = geometry.prim_refs[i].primitive_id;
            let mut normal = geometry.mesh.face_normal(face);
            if geometry.flip_normal[i] {
                normal = -normal;
            }
            Hit {
                distance: hit.t,
                surface: geometry.surface_ids[i],
                triangle: face,
                normal,
            }
        }))
    }

    /// Whether `point` is inside `volume`, by firing a probe ray in an
    /// arbitrary fixed direction and counting entering/exiting crossings'
    /// parity. Mirrors `EmbreeRayTracer::point_in_volume`'s default probe
    /// direction and `Any`-orientation occlusion-style fire.
    pub fn point_in_volume(
        &self,
        volume: MeshID,
        point: Vec3,
        direction: Option<Vec3>,
    ) -> XdgResult<bool> {
        let scene = self.surface_tree(volume)?;
        let geometry = self.surface_geometry(volume)?;
        let dir = direction.unwrap_or(DEFAULT_PROBE_DIRECTION);

        let ray = AccelRay {
            origin: point,
            direction: dir,
            t_near: 0.0,
            t_far: f64::INFINITY,
            orientation: HitOrientation::Any,
            exclude_primitives: None,
            fire_type: FireType::Volume,
        };

        Ok(match scene.intersect_nearest(&ray) {
            None => false,
            Some(hit) => {
                let i = hit.prim_index as usize;
                let face = geometry.prim_refs[i].primitive_id;
                let mut normal = geometry.mesh.face_normal(face);
                if geometry.flip_normal[i] {
                    normal = -normal;
                }
                // Inside iff the nearest boundary crossing is one the probe
                // is exiting (normal matches the probe direction).
                dir.dot(&normal) > 0.0
            }
        })
    }

    /// Whether anything in `volume`'s surface tree occludes the segment
    /// `origin + t * direction`, `t` in `[0, t_far]`.
    pub fn occluded(
        &self,
        volume: MeshID,
        origin: Vec3,
        direction: Vec3,
        t_far: f64,
    ) -> XdgResult<bool> {
        let scene = self.surface_tree(volume)?;
        let ray = AccelRay {
            origin,
            direction,
            t_near: 0.0,
            t_far,
            orientation: HitOrientation::Any,
            exclude_primitives: None,
            fire_type: FireType::FindVolume,
        };
        Ok(scene.intersect_any(&ray))
    }

    /// Tetrahedron of `volume` containing `point`, if any.
    pub fn find_element(&self, volume: MeshID, point: Vec3) -> XdgResult<Option<MeshID>> {
        let geometry = self
            .element_geometries
            .get(&volume)
            .ok_or(XdgError::NoElementTree(volume))?;
        Ok(geometry.find_containing(&point))
    }

    /// Closest point on `volume`'s surface to `point`, within `max_distance`.
    pub fn closest(
        &self,
        volume: MeshID,
        point: Vec3,
        max_distance: f64,
    ) -> XdgResult<Option<(MeshID, Vec3, f64)>> {
        let scene = self.surface_tree(volume)?;
        let geometry = self.surface_geometry(volume)?;
        Ok(scene.closest(point, max_distance).map(|(hit, closest)| {
            let face = geometry.prim_refs[hit.prim_index as usize].primitive_id;
            (face, closest, hit.t)
        }))
    }

    /// Batch form of [`ray_fire`](Self::ray_fire): one call per ray. The
    /// default (and only) `AccelBackend` shipped here is a CPU/software
    /// BVH, so this is a loop over the scalar entry point rather than a
    /// separate code path — a GPU backend could override batch entry
    /// points for throughput, but `AccelBackend` does not require it.
    #[allow(clippy::too_many_arguments)]
    pub fn ray_fire_batch(
        &self,
        volume: MeshID,
        origins: &[Vec3],
        directions: &[Vec3],
        t_far: f64,
        orientation: HitOrientation,
        exclude: Option<Arc<[MeshID]>>,
    ) -> XdgResult<Vec<Option<Hit>>> {
        origins
            .iter()
            .zip(directions)
            .map(|(&origin, &direction)| {
                self.ray_fire(volume, origin, direction, t_far, orientation, exclude.clone())
            })
            .collect()
    }

    /// Batch form of [`point_in_volume`](Self::point_in_volume).
    pub fn point_in_volume_batch(
        &self,
        volume: MeshID,
        points: &[Vec3],
        directions: Option<&[Vec3]>,
    ) -> XdgResult<Vec<bool>> {
        points
            .iter()
            .enumerate()
            .map(|(i, &point)| {
                let direction = directions.map(|ds| ds[i]);
                self.point_in_volume(volume, point, direction)
            })
            .collect()
    }

    pub fn mesh(&self) -> &Arc<dyn MeshProvider> {
        &self.mesh
    }
}

static_assertions::assert_impl_all!(RayTracer<crate::accel::bvh::Bvh>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::bvh::Bvh;
    use crate::mock::MeshMock;

    #[test]
    fn ray_fired_straight_up_from_center_exits_through_top() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let top = mesh.bounding_box().upper.z;
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut rt: RayTracer<Bvh> = RayTracer::new(mesh);
        rt.register_volume(0);

        let hit = rt
            .ray_fire(
                0,
                center,
                Vec3::new(0.0, 0.0, 1.0),
                f64::INFINITY,
                HitOrientation::Any,
                None,
            )
            .unwrap()
            .unwrap();
        assert!((hit.distance - (top - center.z)).abs() < 1e-9);
    }

    #[test]
    fn point_at_center_is_inside_cube_volume() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut rt: RayTracer<Bvh> = RayTracer::new(mesh);
        rt.register_volume(0);

        assert!(rt.point_in_volume(0, center, None).unwrap());
        assert!(!rt
            .point_in_volume(0, Vec3::new(500.0, 500.0, 500.0), None)
            .unwrap());
    }

    #[test]
    fn find_element_locates_centroid_tet() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut rt: RayTracer<Bvh> = RayTracer::new(mesh);
        rt.register_volume(0);

        let found = rt.find_element(0, center).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn batch_queries_match_scalar_queries() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        let mesh: Arc<dyn MeshProvider> = Arc::new(mesh);
        let mut rt: RayTracer<Bvh> = RayTracer::new(mesh);
        rt.register_volume(0);

        let points = vec![center, Vec3::new(500.0, 500.0, 500.0)];
        let batch_results = rt.point_in_volume_batch(0, &points, None).unwrap();
        let scalar_results: Vec<bool> = points
            .iter()
            .map(|&p| rt.point_in_volume(0, p, None).unwrap())
            .collect();
        assert_eq!(batch_results, scalar_results);

        let origins = vec![center, center];
        let directions = vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)];
        let batch_hits = rt
            .ray_fire_batch(0, &origins, &directions, f64::INFINITY, HitOrientation::Any, None)
            .unwrap();
        for (i, (&origin, &direction)) in origins.iter().zip(&directions).enumerate() {
            let scalar = rt
                .ray_fire(0, origin, direction, f64::INFINITY, HitOrientation::Any, None)
                .unwrap();
            assert_eq!(batch_hits[i].map(|h| h.surface), scalar.map(|h| h.surface));
        }
    }
}
