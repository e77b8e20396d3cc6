//! Worker pool sizing.

use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};

/// Configuration for the per-phase worker pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum number of threads per phase (0 = available parallelism).
    pub max_threads: usize,
}

impl WorkerConfig {
    /// Thread ceiling: `max_threads`, or the hardware parallelism.
    #[must_use]
    pub fn thread_limit(&self) -> usize {
        if self.max_threads > 0 {
            self.max_threads
        } else {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        }
    }

    /// Workers for a phase with `units` independent units of work.
    ///
    /// `min(thread_limit, units)`, never below one.
    #[must_use]
    pub fn workers_for(&self, units: usize) -> usize {
        self.thread_limit().min(units).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_capped_by_units() {
        let config = WorkerConfig { max_threads: 8 };
        assert_eq!(config.workers_for(3), 3);
        assert_eq!(config.workers_for(200), 8);
        assert_eq!(config.workers_for(0), 1);
    }

    #[test]
    fn test_default_uses_available_parallelism() {
        let config = WorkerConfig::default();
        assert!(config.thread_limit() >= 1);
        assert_eq!(config.workers_for(1), 1);
    }
}
