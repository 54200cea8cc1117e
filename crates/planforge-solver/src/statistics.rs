//! Run statistics.

use std::time::Duration;

use crate::scope::LoopScope;

/// Counters for one diversification run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Number of oracle calls.
    pub oracle_calls: usize,
    /// Wall-clock time spent waiting on the oracle.
    pub total_oracle_time: Duration,
    /// Number of accepted plans.
    pub accepted_plans: usize,
    /// Wall-clock time of the whole run.
    pub total_duration: Duration,
}

impl RunStatistics {
    /// Snapshot of a finished run.
    pub fn from_scope(scope: &LoopScope) -> Self {
        Self {
            oracle_calls: scope.iteration_count(),
            total_oracle_time: scope.oracle_time(),
            accepted_plans: scope.accepted_count(),
            total_duration: scope.elapsed(),
        }
    }

    /// Average time per oracle call.
    pub fn avg_oracle_time(&self) -> Duration {
        if self.oracle_calls == 0 {
            Duration::ZERO
        } else {
            self.total_oracle_time / self.oracle_calls as u32
        }
    }

    /// Share of oracle calls that produced an accepted plan.
    pub fn acceptance_rate(&self) -> f64 {
        if self.oracle_calls == 0 {
            0.0
        } else {
            self.accepted_plans as f64 / self.oracle_calls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scope() {
        let mut scope = LoopScope::new();
        scope.record_oracle_call(Duration::from_millis(30));
        scope.accept_plan();
        scope.record_oracle_call(Duration::from_millis(10));

        let stats = RunStatistics::from_scope(&scope);
        assert_eq!(stats.oracle_calls, 2);
        assert_eq!(stats.accepted_plans, 1);
        assert_eq!(stats.total_oracle_time, Duration::from_millis(40));
        assert_eq!(stats.avg_oracle_time(), Duration::from_millis(20));
        assert_eq!(stats.acceptance_rate(), 0.5);
    }

    #[test]
    fn test_empty_run() {
        let stats = RunStatistics::default();
        assert_eq!(stats.avg_oracle_time(), Duration::ZERO);
        assert_eq!(stats.acceptance_rate(), 0.0);
    }
}
