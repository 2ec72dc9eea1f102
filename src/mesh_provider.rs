//! The boundary between "geometry core" and "mesh library". A real
//! deployment backs this with MOAB or LibMesh; the core never touches
//! either directly and instead talks to whatever implements
//! [`MeshProvider`]. `MeshMock` is the in-tree implementation used by
//! tests.

use crate::{MeshID, Sense, Vec3};

/// CAD-like topology stamped onto a triangle/tetrahedron mesh: volumes own
/// surfaces with a sense, surfaces own triangles, volumes (for element-level
/// queries) own tetrahedra.
///
/// All ID arguments and return values are in the provider's own ID space;
/// the accelerator layer never interprets a `MeshID`'s numeric value, only
/// its identity.
pub trait MeshProvider: Send + Sync {
    /// All volume IDs the provider knows about.
    fn volumes(&self) -> Vec<MeshID>;

    /// All surface IDs the provider knows about.
    fn surfaces(&self) -> Vec<MeshID>;

    /// Surfaces bounding `volume`, with this volume's sense on each.
    fn volume_surfaces(&self, volume: MeshID) -> Vec<(MeshID, Sense)>;

    /// The one or two volumes a surface separates, in the order the
    /// provider considers canonical. A surface with only one parent bounds
    /// the implicit complement on its other side.
    fn surface_parent_volumes(&self, surface: MeshID) -> Vec<MeshID>;

    /// Triangle IDs belonging to `surface`.
    fn surface_faces(&self, surface: MeshID) -> Vec<MeshID>;

    /// Tetrahedron IDs belonging to `volume`.
    fn volume_elements(&self, volume: MeshID) -> Vec<MeshID>;

    /// Bounding box of the entire mesh, across every volume the provider
    /// knows about. Used to sample a particle's starting location before
    /// any volume has been located.
    fn global_bounding_box(&self) -> crate::BoundingBox;

    /// `MeshID` standing in for "everything not covered by any volume this
    /// provider reports" — the region a particle re-enters when it exits
    /// the last volume on its track. Typically [`crate::ID_NONE`] for a
    /// mesh with a single enclosing volume.
    fn implicit_complement(&self) -> MeshID;

    /// The three vertices of triangle `face`, in the provider's fixed
    /// counter-clockwise winding (outward normal per §geometry/plucker.rs).
    fn face_vertices(&self, face: MeshID) -> [Vec3; 3];

    /// The four vertices of tetrahedron `element`, in the fixed winding
    /// [`crate::geometry::tetrahedron_contains_point`] expects.
    fn element_vertices(&self, element: MeshID) -> [Vec3; 4];

    /// Unnormalized/normalized outward normal of `face`, independent of any
    /// volume's sense (sense-relative flipping is the ray tracer's job, not
    /// the mesh provider's).
    fn face_normal(&self, face: MeshID) -> Vec3 {
        let v = self.face_vertices(face);
        (v[1] - v[0]).cross(&(v[2] - v[0])).normalized()
    }

    /// Axis-aligned bounding box of `face`'s three vertices.
    fn face_bounding_box(&self, face: MeshID) -> crate::BoundingBox {
        crate::BoundingBox::from_points(&self.face_vertices(face))
    }

    /// Axis-aligned bounding box of `element`'s four vertices.
    fn element_bounding_box(&self, element: MeshID) -> crate::BoundingBox {
        crate::BoundingBox::from_points(&self.element_vertices(element))
    }

    /// Neighbor across each of `element`'s four faces, in the fixed winding
    /// `{(v0,v1,v2), (v0,v2,v3), (v0,v3,v1), (v1,v3,v2)}`, or
    /// [`crate::ID_NONE`] where that face is a mesh boundary (no neighbor —
    /// the element walker treats this as "the implicit complement").
    fn element_adjacency(&self, element: MeshID) -> [MeshID; 4];

    /// Steps a particle out of `element` along `direction` from `origin`,
    /// returning the neighboring element and the distance to the exit
    /// face. Ported from `MeshMock::next_element`: walks the tet's four
    /// faces, keeps the ones the ray is exiting through (`normal . u >=
    /// 0`), and picks the nearest such exit.
    ///
    /// Panics via [`crate::fatal_error`] if no exit face is found — with a
    /// point already confirmed inside the element, this only happens if
    /// the mesh provider's connectivity is inconsistent.
    fn next_element(&self, element: MeshID, origin: &Vec3, direction: &Vec3) -> (MeshID, f64) {
        let v = self.element_vertices(element);
        let faces = [
            [v[0], v[1], v[2]],
            [v[0], v[2], v[3]],
            [v[0], v[3], v[1]],
            [v[1], v[3], v[2]],
        ];
        let adjacency = self.element_adjacency(element);

        let mut best: Option<(usize, f64)> = None;
        for (i, face) in faces.iter().enumerate() {
            let normal = (face[1] - face[0]).cross(&(face[2] - face[0])).normalized();
            if normal.dot(direction) < 0.0 {
                continue;
            }
            if let Some(dist) =
                crate::geometry::plucker_ray_tri_intersect(face, origin, direction, f64::INFINITY, None, None)
            {
                let better = match best {
                    Some((_, d)) => dist < d,
                    None => true,
                };
                if dist >= 0.0 && better {
                    best = Some((i, dist));
                }
            }
        }

        match best {
            Some((i, dist)) => (adjacency[i], dist),
            None => crate::error::fatal_error(format!("no exit found in element {element}")),
        }
    }
}
