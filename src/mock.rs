//! In-tree [`MeshProvider`] used by tests, ported from `tests/mesh_mock.h`:
//! a single volume bounded by a cuboid surface (6 quads, 2 triangles each)
//! with its interior decomposed into 12 tetrahedra fanning out from the
//! bounding box's center vertex.

use std::collections::HashMap;

use crate::error::fatal_error;
use crate::mesh_provider::MeshProvider;
use crate::{BoundingBox, MeshID, Sense, Vec3, ID_NONE};

/// Fixed triangle connectivity for the six exterior quads (12 triangles),
/// indexing into [`MeshMock::vertices`].
const TRIANGLE_CONNECTIVITY: [[usize; 3]; 12] = [
    [0, 1, 2],
    [0, 2, 3],
    [4, 6, 5],
    [4, 7, 6],
    [0, 5, 1],
    [0, 4, 5],
    [2, 6, 7],
    [2, 7, 3],
    [0, 7, 4],
    [0, 3, 7],
    [1, 5, 6],
    [1, 6, 2],
];

/// Fixed tetrahedron connectivity: every tet includes vertex 8, the
/// bounding box center.
const TETRAHEDRON_CONNECTIVITY: [[usize; 4]; 12] = [
    [0, 1, 2, 8],
    [0, 2, 3, 8],
    [4, 6, 5, 8],
    [4, 7, 6, 8],
    [0, 5, 1, 8],
    [0, 4, 5, 8],
    [2, 6, 7, 8],
    [2, 7, 3, 8],
    [0, 7, 4, 8],
    [0, 3, 7, 8],
    [1, 5, 6, 8],
    [1, 6, 2, 8],
];

/// Adjacency of each tetrahedron across its four faces, in the winding
/// `{(v0,v1,v2), (v0,v2,v3), (v0,v3,v1), (v1,v3,v2)}`. Face 0 is always
/// the exterior mesh boundary (`ID_NONE`).
const ELEMENT_ADJACENCY: [[MeshID; 4]; 12] = [
    [ID_NONE, 1, 4, 11],
    [ID_NONE, 9, 0, 7],
    [ID_NONE, 5, 3, 10],
    [ID_NONE, 2, 8, 6],
    [ID_NONE, 0, 5, 10],
    [ID_NONE, 4, 8, 2],
    [ID_NONE, 7, 11, 3],
    [ID_NONE, 1, 6, 9],
    [ID_NONE, 5, 9, 3],
    [ID_NONE, 8, 1, 7],
    [ID_NONE, 11, 4, 2],
    [ID_NONE, 0, 10, 6],
];

pub struct MeshMock {
    volumetric_elements: bool,
    vertices: [Vec3; 9],
    /// `(forward_volume, reverse_volume)` per surface, mirroring the
    /// original's `std::pair<MeshID, MeshID>` with `ID_NONE` standing in
    /// for "no volume on that side".
    surface_senses: HashMap<MeshID, (MeshID, MeshID)>,
}

impl MeshMock {
    /// A single volume (ID `0`) bounded by the box `(-2,-3,-4)..(5,6,7)`.
    pub fn unit_cube() -> Self {
        Self::with_bounds(
            BoundingBox::new(Vec3::new(-2.0, -3.0, -4.0), Vec3::new(5.0, 6.0, 7.0)),
            true,
        )
    }

    pub fn with_bounds(bbox: BoundingBox, volumetric_elements: bool) -> Self {
        let lo = bbox.lower;
        let hi = bbox.upper;
        let vertices = [
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, lo.z),
            bbox.center(),
        ];

        let mut surface_senses = HashMap::new();
        for surface in 0..6 {
            surface_senses.insert(surface as MeshID, (0, ID_NONE));
        }

        MeshMock {
            volumetric_elements,
            vertices,
            surface_senses,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices[0..8])
    }
}

impl MeshProvider for MeshMock {
    fn volumes(&self) -> Vec<MeshID> {
        vec![0]
    }

    fn surfaces(&self) -> Vec<MeshID> {
        (0..6).collect()
    }

    fn volume_surfaces(&self, volume: MeshID) -> Vec<(MeshID, Sense)> {
        if volume != 0 {
            return Vec::new();
        }
        (0..6)
            .map(|surface| (surface as MeshID, Sense::Forward))
            .collect()
    }

    fn surface_parent_volumes(&self, surface: MeshID) -> Vec<MeshID> {
        let Some(&(fwd, rev)) = self.surface_senses.get(&surface) else {
            fatal_error(format!("surface {surface} not found in mock mesh"));
        };
        [fwd, rev].into_iter().filter(|&v| v != ID_NONE).collect()
    }

    fn surface_faces(&self, surface: MeshID) -> Vec<MeshID> {
        let start = surface * 2;
        vec![start, start + 1]
    }

    fn volume_elements(&self, volume: MeshID) -> Vec<MeshID> {
        if !self.volumetric_elements || volume != 0 {
            return Vec::new();
        }
        (0..12).collect()
    }

    fn face_vertices(&self, face: MeshID) -> [Vec3; 3] {
        let conn = TRIANGLE_CONNECTIVITY[face as usize];
        [
            self.vertices[conn[0]],
            self.vertices[conn[1]],
            self.vertices[conn[2]],
        ]
    }

    fn element_vertices(&self, element: MeshID) -> [Vec3; 4] {
        let conn = TETRAHEDRON_CONNECTIVITY[element as usize];
        [
            self.vertices[conn[0]],
            self.vertices[conn[1]],
            self.vertices[conn[2]],
            self.vertices[conn[3]],
        ]
    }

    fn element_adjacency(&self, element: MeshID) -> [MeshID; 4] {
        ELEMENT_ADJACENCY[element as usize]
    }

    fn global_bounding_box(&self) -> BoundingBox {
        self.bounding_box()
    }

    fn implicit_complement(&self) -> MeshID {
        ID_NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_faces_are_contiguous_pairs() {
        let mesh = MeshMock::unit_cube();
        assert_eq!(mesh.surface_faces(0), vec![0, 1]);
        assert_eq!(mesh.surface_faces(5), vec![10, 11]);
    }

    #[test]
    fn volume_zero_owns_all_six_surfaces_forward() {
        let mesh = MeshMock::unit_cube();
        let vs = mesh.volume_surfaces(0);
        assert_eq!(vs.len(), 6);
        assert!(vs.iter().all(|(_, sense)| *sense == Sense::Forward));
    }

    #[test]
    fn every_tet_includes_the_box_center_vertex() {
        let mesh = MeshMock::unit_cube();
        let center = mesh.bounding_box().center();
        for element in 0..12 {
            let v = mesh.element_vertices(element);
            assert!(v.iter().any(|p| (*p - center).length() < 1e-9));
        }
    }

    #[test]
    fn boundary_face_of_every_element_has_no_neighbor() {
        let mesh = MeshMock::unit_cube();
        for element in 0..12 {
            assert_eq!(mesh.element_adjacency(element)[0], ID_NONE);
        }
    }
}
