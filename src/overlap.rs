//! Overlap checker: probes every triangle vertex (and, optionally, every
//! triangle edge) of a mesh against all registered volumes and reports any
//! location more than one volume claims as interior. Ported from
//! `src/overlap_check/overlap.cpp`; the OpenMP fan-out over vertices/edges
//! is dropped in favor of plain sequential iteration (parallelizing these
//! checks is the caller's responsibility, same as the element walker), and
//! the progress-bar/stdout reporting becomes `log` calls.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::accel::AccelBackend;
use crate::mesh_provider::MeshProvider;
use crate::xdg::Xdg;
use crate::{MeshID, Vec3};

/// Every set of two-or-more volumes found to simultaneously claim a
/// location, mapped to one representative point of overlap.
pub type OverlapMap = HashMap<BTreeSet<MeshID>, Vec3>;

/// One directed ray along a triangle edge, to be fired against every volume
/// other than the triangle's own parent surface's volumes.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRayQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub edge_length: f64,
}

const VERTEX_BUMP: f64 = 1e-9;

/// Probes both sides of `loc` (displaced slightly along `dir` and its
/// opposite) for volumes that consider the displaced point interior,
/// recording an overlap if more than one does. Mirrors
/// `check_location_for_overlap`.
pub fn check_location_for_overlap<B: AccelBackend>(
    xdg: &Xdg<B>,
    all_volumes: &[MeshID],
    loc: Vec3,
    dir: Vec3,
    overlap_map: &mut OverlapMap,
    verbose: bool,
    vertex_overlap_locs: &mut Vec<Vec3>,
) {
    let probe = |point: Vec3, direction: Vec3| -> BTreeSet<MeshID> {
        all_volumes
            .iter()
            .copied()
            .filter(|&volume| {
                xdg.point_in_volume(volume, point, Some(direction))
                    .unwrap_or(false)
            })
            .collect()
    };

    let forward_point = loc + dir * VERTEX_BUMP;
    let found = probe(forward_point, dir);
    if found.len() > 1 {
        overlap_map.insert(found, forward_point);
        if verbose {
            vertex_overlap_locs.push(forward_point);
        }
    }

    let reverse_dir = -dir;
    let reverse_point = loc + reverse_dir * (2.0 * VERTEX_BUMP);
    let found = probe(reverse_point, reverse_dir);
    if found.len() > 1 {
        overlap_map.insert(found, reverse_point);
        if verbose {
            vertex_overlap_locs.push(reverse_point);
        }
    }
}

/// Ray queries along every edge of a triangle, wrapping around to the first
/// vertex. Mirrors `return_ray_queries`.
pub fn return_ray_queries(triangle: &[Vec3; 3]) -> Vec<EdgeRayQuery> {
    (0..3)
        .map(|i| {
            let v1 = triangle[i];
            let v2 = triangle[(i + 1) % 3];
            let delta = v2 - v1;
            let edge_length = delta.length();
            EdgeRayQuery {
                origin: v1,
                direction: delta / edge_length,
                edge_length,
            }
        })
        .collect()
}

/// Fires a ray along a single edge against every volume in `vols_to_check`,
/// stopping at the first hit and returning the struck surface's forward
/// parent volume. Mirrors `check_along_edge`.
pub fn check_along_edge<B: AccelBackend>(
    xdg: &Xdg<B>,
    mesh: &Arc<dyn MeshProvider>,
    query: &EdgeRayQuery,
    vols_to_check: &[MeshID],
    edge_overlap_locs: &mut Vec<Vec3>,
) -> Option<MeshID> {
    for &test_volume in vols_to_check {
        let hit = xdg
            .ray_fire(
                test_volume,
                query.origin,
                query.direction,
                query.edge_length,
                crate::HitOrientation::Exiting,
                None,
            )
            .ok()
            .flatten();

        let Some(hit) = hit else { continue };

        let parents = mesh.surface_parent_volumes(hit.surface);
        let Some(&forward_parent) = parents.first() else {
            continue;
        };

        let collision_point = query.origin + query.direction * hit.distance;
        if !edge_overlap_locs.contains(&collision_point) {
            edge_overlap_locs.push(collision_point);
        }
        return Some(forward_parent);
    }
    None
}

/// Checks an entire mesh for overlapping volumes: every triangle vertex of
/// every surface, and (if `check_edges`) every triangle edge. Mirrors
/// `check_instance_for_overlaps`.
pub fn check_instance_for_overlaps<B: AccelBackend>(
    xdg: &Xdg<B>,
    check_edges: bool,
    verbose: bool,
) -> OverlapMap {
    let mesh = xdg.mesh();
    let all_volumes = mesh.volumes();
    let all_surfaces = mesh.surfaces();

    let mut overlap_map = OverlapMap::new();
    let mut all_verts = Vec::new();
    let mut total_elements = 0usize;

    for &surface in &all_surfaces {
        let faces = mesh.surface_faces(surface);
        total_elements += faces.len();
        for face in faces {
            let v = mesh.face_vertices(face);
            all_verts.extend_from_slice(&v);
        }
    }

    let dir = Vec3::new(0.1, 0.1, 0.1).normalized();
    let mut vertex_overlap_locs = Vec::new();

    log::info!("Checking {} vertices for overlaps", all_verts.len());
    for &vert in &all_verts {
        check_location_for_overlap(
            xdg,
            &all_volumes,
            vert,
            dir,
            &mut overlap_map,
            verbose,
            &mut vertex_overlap_locs,
        );
    }

    if overlap_map.is_empty() {
        log::info!("No overlaps found at vertices");
    }
    if verbose {
        for loc in &vertex_overlap_locs {
            log::info!("vertex overlap at {:?}", loc);
        }
    }

    if !check_edges {
        return overlap_map;
    }

    let total_edge_rays = total_elements * 3 * all_volumes.len().saturating_sub(2);
    log::info!("Checking {total_edge_rays} element edges for overlaps");
    let mut edge_overlap_locs = Vec::new();

    for &surface in &all_surfaces {
        let parents = mesh.surface_parent_volumes(surface);
        let vols_to_check: Vec<MeshID> = all_volumes
            .iter()
            .copied()
            .filter(|v| !parents.contains(v))
            .collect();

        for face in mesh.surface_faces(surface) {
            let tri = mesh.face_vertices(face);
            for query in return_ray_queries(&tri) {
                if let Some(hit_volume) =
                    check_along_edge(xdg, mesh, &query, &vols_to_check, &mut edge_overlap_locs)
                {
                    if let Some(&forward_parent) = parents.first() {
                        let key: BTreeSet<MeshID> = [hit_volume, forward_parent].into_iter().collect();
                        if let Some(&loc) = edge_overlap_locs.last() {
                            overlap_map.insert(key, loc);
                        }
                    }
                }
            }
        }
    }

    if overlap_map.is_empty() {
        log::info!("No overlaps found along edges");
    }
    if verbose {
        for loc in &edge_overlap_locs {
            log::info!("edge overlap at {:?}", loc);
        }
    }

    overlap_map
}

/// Logs a human-readable summary of every recorded overlap. Mirrors
/// `report_overlaps`.
pub fn report_overlaps(overlap_map: &OverlapMap) {
    log::info!("Overlap locations found: {}", overlap_map.len());
    for (volumes, loc) in overlap_map {
        log::info!(
            "overlap at {:?} between volumes {:?}",
            loc,
            volumes.iter().collect::<Vec<_>>()
        );
    }
}
