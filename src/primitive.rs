//! Per-scene primitive bookkeeping attached to each registered BVH scene.
//!
//! A surface tree's geometry stores one [`PrimitiveRef`] per triangle (its
//! mesh-provider ID plus the sense that scene resolved for it), alongside a
//! single [`SurfaceBatch`] shared by every triangle of that surface. Element
//! trees are simpler: every tetrahedron is Forward by construction, so a
//! [`PrimitiveRef`] buffer of mesh IDs and one [`ElementBatch`] are enough.

use crate::{MeshID, Sense};

/// One triangle (or tetrahedron) as seen by an [`crate::AccelBackend`]
/// scene: the primitive's index in the scene maps to an entry in this
/// buffer, which in turn carries the mesh-provider ID the scene's user data
/// needs to look the actual geometry back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRef {
    pub primitive_id: MeshID,
    pub sense: Sense,
}

/// User data shared by every triangle of one surface's geometry inside a
/// volume's surface tree. Carries the information the intersect/occlude
/// callback needs to resolve orientation and apply the sense flip a
/// reversed surface requires.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceBatch {
    pub surface_id: MeshID,
    /// Volume ID for which this surface's normal must be flipped (the
    /// volume that sees the surface in `Reverse` sense).
    pub reverse_volume: Option<MeshID>,
    /// Per-volume AABB dilation applied to every triangle of this surface.
    pub box_bump: f64,
}

/// User data shared by every tetrahedron of one volume's element tree.
#[derive(Debug, Clone, Copy)]
pub struct ElementBatch {
    pub volume_id: MeshID,
}
