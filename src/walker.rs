//! Volumetric particle walker: advances particles through a mesh's elements,
//! sampling collisions by mean free path and isotropic scattering, crossing
//! back into the mesh through the implicit complement when a particle
//! leaves it. Ported from `tools/walk_elements.h`'s `walk_elements` main
//! loop, with the OpenMP fan-out and CLI/progress-bar plumbing dropped (this
//! crate has no OpenMP dependency; parallelizing per-particle walks is the
//! caller's responsibility) and the C library `drand48`/`srand48` RNG
//! replaced by an explicitly-seeded `rand::rngs::StdRng` per particle: each
//! particle's generator is seeded from `(seed, particle_index)`, so a given
//! pair reproduces a given trajectory regardless of how particles are
//! scheduled across threads, rather than depending on one shared generator's
//! draw order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accel::AccelBackend;
use crate::constants::{INFTY, TINY_BIT};
use crate::xdg::Xdg;
use crate::{BoundingBox, HitOrientation, MeshID, Vec3, ID_NONE};

/// A uniformly random point within `bbox`. Mirrors `sample_box_location`.
pub fn sample_box_location(bbox: &BoundingBox, rng: &mut impl Rng) -> Vec3 {
    let extent = bbox.upper - bbox.lower;
    bbox.lower
        + Vec3::new(
            extent.x * rng.gen::<f64>(),
            extent.y * rng.gen::<f64>(),
            extent.z * rng.gen::<f64>(),
        )
}

/// A uniformly random direction on the unit sphere. Mirrors `rand_dir`:
/// sample `cos(theta)` and `phi` uniformly and convert to Cartesian, which
/// (unlike sampling each Cartesian component uniformly) does not bias
/// toward the corners of the bounding cube.
pub fn random_direction(rng: &mut impl Rng) -> Vec3 {
    let cos_theta = rng.gen_range(-1.0..1.0f64);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = rng.gen_range(0.0..std::f64::consts::TAU);
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Why a particle's walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The particle crossed the mesh boundary and did not re-enter.
    Escaped,
    /// The walk hit `max_events` without escaping — a safety valve against
    /// an infinite loop on a mesh whose connectivity never terminates
    /// (e.g. a degenerate element cycling a ray between two faces).
    ExhaustedEvents,
}

/// Outcome of walking a single particle from birth to termination.
/// **(added)**: the original only accumulates `total_distance` for a summary
/// print; a library returns one record per particle so the walk is testable
/// without capturing stdout.
#[derive(Debug, Clone, Copy)]
pub struct ParticleTrack {
    pub path_length: f64,
    pub events: u32,
    pub termination: TerminationReason,
}

/// Configuration for a batch of particle walks. Mirrors `WalkElementsContext`
/// minus the fields that only drove CLI/progress-bar output.
#[derive(Debug, Clone, Copy)]
pub struct WalkConfig {
    pub n_particles: usize,
    pub mean_free_path: f64,
    pub seed: u64,
    pub max_events: u32,
}

/// Mixes a base seed with a particle index into an independent seed, so
/// every particle gets its own generator instead of sharing one sequential
/// stream. Splitmix64's constant, a standard way to decorrelate an
/// incrementing counter from a seed.
fn particle_seed(base_seed: u64, particle_index: u64) -> u64 {
    base_seed.wrapping_add(particle_index.wrapping_mul(0x9E3779B97F4A7C15))
}

/// Walks one particle from a random point in the mesh's global bounding box
/// until it exits through the implicit complement and does not re-enter, or
/// `max_events` collision/crossing events have elapsed. Returns `None` if no
/// starting element could be found after `max_sample_attempts` tries.
pub fn walk_particle<B: AccelBackend>(
    xdg: &Xdg<B>,
    mean_free_path: f64,
    max_events: u32,
    rng: &mut impl Rng,
    max_sample_attempts: u32,
) -> Option<ParticleTrack> {
    // Re-entry tracing only finds anything if the provider's implicit
    // complement is itself registered as a volume (reversed surfaces of the
    // same mesh); on a mesh with no such registration this ray_fire simply
    // reports no surface tree, the particle's walk ends, matching the
    // original's "no re-entry point" break.
    let implicit_complement = xdg.mesh().implicit_complement();
    let bbox = xdg.mesh().global_bounding_box();

    let mut element = ID_NONE;
    let mut r = Vec3::ZERO;
    let mut attempts = 0;
    while element == ID_NONE {
        attempts += 1;
        if attempts > max_sample_attempts {
            return None;
        }
        r = sample_box_location(&bbox, rng);
        element = xdg.find_element(r);
    }

    let mut u = random_direction(rng);
    let mut path_length = 0.0;
    let mut n_events = 0u32;

    while element != ID_NONE && n_events < max_events {
        let (next_element, exit_distance) = xdg.next_element(element, r, u);
        let collision_distance = -(1.0 - rng.gen::<f64>()).ln() * mean_free_path;

        if collision_distance < exit_distance {
            r = r + u * collision_distance;
            path_length += collision_distance;
            u = random_direction(rng);
        } else {
            r = r + u * exit_distance;
            path_length += exit_distance;
            element = next_element;
        }

        while element == ID_NONE {
            let hit = match xdg
                .ray_fire(
                    implicit_complement,
                    r,
                    u,
                    INFTY,
                    HitOrientation::Exiting,
                    None,
                )
                .ok()
                .flatten()
            {
                Some(hit) => hit,
                None => break,
            };

            r = r + u * hit.distance;
            path_length += hit.distance;
            element = xdg.find_element(r + u * TINY_BIT);
        }

        n_events += 1;
    }

    let termination = if element == ID_NONE {
        TerminationReason::Escaped
    } else {
        TerminationReason::ExhaustedEvents
    };

    Some(ParticleTrack {
        path_length,
        events: n_events,
        termination,
    })
}

/// Walks a full batch of particles, returning one [`ParticleTrack`] per
/// particle that found a starting element (entries are dropped rather than
/// padded with `None`, since a sampling failure here means the bounding box
/// and mesh disagree, not that the particle "had zero events").
pub fn walk_particles<B: AccelBackend>(xdg: &Xdg<B>, config: &WalkConfig) -> Vec<ParticleTrack> {
    let mut tracks = Vec::with_capacity(config.n_particles);
    for i in 0..config.n_particles {
        let mut rng = StdRng::seed_from_u64(particle_seed(config.seed, i as u64));
        if let Some(track) = walk_particle(xdg, config.mean_free_path, config.max_events, &mut rng, 10_000) {
            tracks.push(track);
        }
    }
    tracks
}

/// Total and mean path length traveled across a batch of tracks.
pub fn summarize(tracks: &[ParticleTrack]) -> (f64, f64) {
    let total: f64 = tracks.iter().map(|t| t.path_length).sum();
    let mean = if tracks.is_empty() {
        0.0
    } else {
        total / tracks.len() as f64
    };
    (total, mean)
}
