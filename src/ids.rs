//! Identifier types shared across the crate.

use std::fmt;

/// Identifier for a mesh entity (volume, surface, triangle, or tetrahedron)
/// as assigned by a [`MeshProvider`](crate::MeshProvider). Provider-scoped:
/// two different providers may reuse the same `MeshID` for unrelated
/// entities.
pub type MeshID = i64;

/// Sentinel `MeshID` meaning "no entity" (e.g. an unset surface parent, or
/// a query miss).
pub const ID_NONE: MeshID = -1;

/// Handle to a BVH scene owned by a [`RayTracer`](crate::RayTracer).
///
/// Surface trees and element trees are distinct namespaces: a `TreeID`
/// returned from [`RayTracer::create_surface_tree`](crate::RayTracer::create_surface_tree)
/// is never valid as an element tree and vice versa. This is enforced by
/// construction rather than by a shared integer sentinel space, which is
/// why there is no `TREE_NONE` constant — absence is `Option<TreeID>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeID {
    Surface(u32),
    Element(u32),
}

impl fmt::Display for TreeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeID::Surface(idx) => write!(f, "surface-tree#{idx}"),
            TreeID::Element(idx) => write!(f, "element-tree#{idx}"),
        }
    }
}

/// Orientation of a triangle with respect to the volume that owns the
/// enclosing scene. Fixed when the volume's surface tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// The triangle's intrinsic normal points outward from this volume.
    Forward,
    /// The triangle's intrinsic normal points inward to this volume.
    Reverse,
    /// Sense has not yet been resolved. Never valid on a committed scene.
    Unset,
}

/// Which hits an orientation-filtered ray-fire query will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOrientation {
    /// Accept only hits where the ray is entering the volume (`u . n < 0`).
    Entering,
    /// Accept only hits where the ray is exiting the volume (`u . n >= 0`).
    Exiting,
    /// Accept any hit regardless of orientation.
    Any,
}

/// Distinguishes the three query shapes dispatched through the same
/// intersect/occlude callback plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireType {
    /// A volume-surface ray fire or point-in-volume probe: orientation
    /// culling and sense flips apply.
    Volume,
    /// An occlusion-style query against the implicit complement or a
    /// global tree, used by `find_volume`/re-entry tracking: sense flips
    /// are suppressed.
    FindVolume,
    /// A point-in-element containment query against a tetrahedron tree.
    Element,
}
