//! Bounding volume hierarchy: naive bottom-up construction, stack-based
//! traversal.
//!
//! Construction pairs the two nodes whose combined bounding box has the
//! smallest surface area, repeatedly, until one root remains — the same
//! O(n^2) bottom-up strategy used for small-to-medium primitive counts
//! where a top-down median/SAH split is not worth the extra bookkeeping.
//! Traversal descends the resulting tree with an explicit stack rather than
//! recursion, to keep a predictable call depth independent of tree shape.

use super::{AccelBackend, AccelHit, AccelRay, PrimitiveGeometry};
use crate::{BoundingBox, Vec3};
use std::sync::Arc;

const PRIMITIVE_SENTINEL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct NodePayload {
    // `right == PRIMITIVE_SENTINEL` marks a leaf; `left` is then the
    // primitive index rather than a child node index. This avoids an extra
    // enum discriminant byte per node.
    left: u32,
    right: u32,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: BoundingBox,
    payload: NodePayload,
}

impl Node {
    fn leaf(bounds: BoundingBox, prim_index: u32) -> Self {
        Node {
            bounds,
            payload: NodePayload {
                left: prim_index,
                right: PRIMITIVE_SENTINEL,
            },
        }
    }

    fn interior(bounds: BoundingBox, left: u32, right: u32) -> Self {
        Node {
            bounds,
            payload: NodePayload { left, right },
        }
    }

    fn is_leaf(&self) -> bool {
        self.payload.right == PRIMITIVE_SENTINEL
    }
}

pub struct Bvh {
    geometry: Arc<dyn PrimitiveGeometry>,
    nodes: Vec<Node>,
    root: Option<u32>,
}

impl Bvh {
    fn build_nodes(geometry: &dyn PrimitiveGeometry) -> (Vec<Node>, Option<u32>) {
        let n = geometry.primitive_count();
        if n == 0 {
            return (Vec::new(), None);
        }

        let mut nodes = Vec::with_capacity(2 * n as usize);
        let mut uncombined: Vec<u32> = Vec::with_capacity(n as usize);

        for i in 0..n {
            nodes.push(Node::leaf(geometry.bounds(i), i));
            uncombined.push(i);
        }

        while uncombined.len() > 1 {
            let (best_i, best_j, combined) = Self::find_best_pair(&nodes, &uncombined);

            let left_id = uncombined[best_i];
            let right_id = uncombined[best_j];
            let combined_id = nodes.len() as u32;
            nodes.push(Node::interior(combined, left_id, right_id));

            uncombined[best_i] = combined_id;
            let last = uncombined.pop().unwrap();
            if right_id != last {
                uncombined[best_j] = last;
            }
        }

        let root = uncombined.pop();
        (nodes, root)
    }

    fn find_best_pair(nodes: &[Node], uncombined: &[u32]) -> (usize, usize, BoundingBox) {
        let n = uncombined.len();
        let mut best = (0usize, 1usize);
        let mut best_area = f64::INFINITY;
        let mut best_bounds = BoundingBox::empty();

        for i in 0..n - 1 {
            let bounds_i = &nodes[uncombined[i] as usize].bounds;
            for j in (i + 1)..n {
                let bounds_j = &nodes[uncombined[j] as usize].bounds;
                let combined = bounds_i.union(bounds_j);
                let area = combined.surface_area();
                if area < best_area {
                    best_area = area;
                    best = (i, j);
                    best_bounds = combined;
                }
            }
        }

        (best.0, best.1, best_bounds)
    }
}

impl AccelBackend for Bvh {
    fn build(geometry: Arc<dyn PrimitiveGeometry>) -> Self {
        let (nodes, root) = Self::build_nodes(geometry.as_ref());
        Bvh {
            geometry,
            nodes,
            root,
        }
    }

    fn intersect_nearest(&self, ray: &AccelRay) -> Option<AccelHit> {
        let root = self.root?;
        let mut stack = vec![root];
        let mut closest: Option<AccelHit> = None;
        let mut t_far = ray.t_far;

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if node
                .bounds
                .ray_intersect(&ray.origin, &ray.direction, t_far)
                .is_none()
            {
                continue;
            }

            if node.is_leaf() {
                let prim = node.payload.left;
                let mut probe = ray.clone();
                probe.t_far = t_far;
                if let Some(hit) = self.geometry.intersect(prim, &probe) {
                    if hit.t <= t_far {
                        t_far = hit.t;
                        closest = Some(hit);
                    }
                }
            } else {
                stack.push(node.payload.left);
                stack.push(node.payload.right);
            }
        }

        closest
    }

    fn intersect_any(&self, ray: &AccelRay) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut stack = vec![root];

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if node
                .bounds
                .ray_intersect(&ray.origin, &ray.direction, ray.t_far)
                .is_none()
            {
                continue;
            }

            if node.is_leaf() {
                if self.geometry.occluded(node.payload.left, ray) {
                    return true;
                }
            } else {
                stack.push(node.payload.left);
                stack.push(node.payload.right);
            }
        }

        false
    }

    fn closest(&self, point: Vec3, max_radius: f64) -> Option<(AccelHit, Vec3)> {
        let root = self.root?;
        let mut stack = vec![root];
        let mut best_dist = max_radius;
        let mut best: Option<(AccelHit, Vec3)> = None;

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if !bounds_within_radius(&node.bounds, point, best_dist) {
                continue;
            }

            if node.is_leaf() {
                let prim = node.payload.left;
                let closest_point = self.geometry.closest_point(prim, point);
                let dist = (closest_point - point).length();
                if dist < best_dist {
                    best_dist = dist;
                    best = Some((
                        AccelHit {
                            prim_index: prim,
                            t: dist,
                        },
                        closest_point,
                    ));
                }
            } else {
                stack.push(node.payload.left);
                stack.push(node.payload.right);
            }
        }

        best
    }
}

/// Whether `point` could possibly be within `radius` of `bounds` — a
/// conservative box-to-point distance check used to prune the closest-point
/// traversal without computing exact corner distances.
fn bounds_within_radius(bounds: &BoundingBox, point: Vec3, radius: f64) -> bool {
    let clamped = Vec3::new(
        point.x.clamp(bounds.lower.x, bounds.upper.x),
        point.y.clamp(bounds.lower.y, bounds.upper.y),
        point.z.clamp(bounds.lower.z, bounds.upper.z),
    );
    (clamped - point).length() <= radius
}
