//! Loop-level scope.

use std::time::{Duration, Instant};

/// Progress of one diversification run, visible to terminations.
#[derive(Debug, Clone)]
pub struct LoopScope {
    start_time: Instant,
    accepted: usize,
    iterations: usize,
    oracle_time: Duration,
}

impl LoopScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            accepted: 0,
            iterations: 0,
            oracle_time: Duration::ZERO,
        }
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of accepted plans.
    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// Number of oracle calls made.
    pub fn iteration_count(&self) -> usize {
        self.iterations
    }

    pub fn oracle_time(&self) -> Duration {
        self.oracle_time
    }

    pub fn record_oracle_call(&mut self, elapsed: Duration) {
        self.iterations += 1;
        self.oracle_time += elapsed;
    }

    pub fn accept_plan(&mut self) {
        self.accepted += 1;
    }
}

impl Default for LoopScope {
    fn default() -> Self {
        Self::new()
    }
}
