//! Error handling policy.
//!
//! Three distinct severities map onto three distinct Rust idioms:
//!
//! - A programmer error (a volume requested before its tree was built, a
//!   surface whose sense could not be resolved) is [`fatal_error`]: log at
//!   `error` level and panic. These are bugs in the caller's use of the API,
//!   not conditions a caller can recover from.
//! - A recoverable-but-noteworthy condition (a degenerate triangle skipped
//!   during tree construction) is [`warning`]: log at `warn` level and keep
//!   going.
//! - A normal query miss (`ray_fire` finds nothing, `find_volume` can't
//!   place a point) is never an error at all — it is `None`/`Option`, same
//!   as the rest of idiomatic Rust. [`XdgError`] exists only for conditions
//!   a caller legitimately needs to branch on, such as an unknown ID passed
//!   across the `MeshProvider` boundary.

use crate::MeshID;

#[derive(Debug, thiserror::Error)]
pub enum XdgError {
    #[error("unknown volume id {0}")]
    UnknownVolume(MeshID),

    #[error("unknown surface id {0}")]
    UnknownSurface(MeshID),

    #[error("surface {surface} is not bounded by volume {volume}")]
    NotAParentVolume { surface: MeshID, volume: MeshID },

    #[error("no surface tree has been built for volume {0}")]
    NoSurfaceTree(MeshID),

    #[error("no element tree has been built for volume {0}")]
    NoElementTree(MeshID),

    #[error("mesh provider returned degenerate geometry for {0}")]
    DegenerateGeometry(MeshID),
}

pub type XdgResult<T> = Result<T, XdgError>;

/// Logs `message` at `warn` level and returns control to the caller. Use
/// for conditions worth a human's attention that do not invalidate the
/// result of the current call.
pub fn warning(message: impl AsRef<str>) {
    log::warn!("{}", message.as_ref());
}

/// Logs `message` at `error` level, then panics. Use only for conditions
/// that indicate a logic error in how the API is being used — never for
/// conditions driven by mesh/query input, which should return [`XdgError`]
/// or `None` instead.
#[track_caller]
pub fn fatal_error(message: impl AsRef<str>) -> ! {
    log::error!("{}", message.as_ref());
    panic!("{}", message.as_ref());
}
