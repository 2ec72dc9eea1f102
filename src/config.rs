//! Process-wide configuration, replacing the C++ `XDGConfig` singleton.
//!
//! The original keeps one global `XDGConfig` instance reachable from
//! anywhere, used mainly so a mesh library initialized once (LibMesh's MPI
//! bring-up) stays consistent no matter which part of the program touches
//! it first. This port has no LibMesh/MPI dependency, so the only
//! surviving knob is the thread count a caller wants parallel mesh-library
//! operations to use; the singleton shape is kept because callers
//! (particularly the element walker, which is meant to run one instance per
//! thread) still need a single process-wide place to read it from.

use std::sync::{OnceLock, RwLock};

use crate::error::warning;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    n_threads: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config { n_threads: 1 }
    }
}

impl Config {
    pub fn n_threads(&self) -> i32 {
        self.n_threads
    }

    /// Sets the configured thread count. Non-positive values are coerced to
    /// 1 with a warning, mirroring `XDGConfig::set_n_threads`.
    pub fn set_n_threads(&mut self, n_threads: i32) {
        if n_threads <= 0 {
            warning("number of threads must be positive; using 1 thread");
        }
        self.n_threads = n_threads.max(1);
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn global() -> &'static RwLock<Config> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Reads the current process-wide configuration.
pub fn config() -> Config {
    *global().read().expect("config lock poisoned")
}

/// Replaces the process-wide configuration's thread count.
pub fn set_n_threads(n_threads: i32) {
    global()
        .write()
        .expect("config lock poisoned")
        .set_n_threads(n_threads);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_n_threads_coerces_and_keeps_positive_values() {
        // Single test function: the global config is process-wide, so
        // exercising both branches here avoids racing against other tests.
        set_n_threads(0);
        assert_eq!(config().n_threads(), 1);

        set_n_threads(-5);
        assert_eq!(config().n_threads(), 1);

        set_n_threads(4);
        assert_eq!(config().n_threads(), 4);
    }
}
