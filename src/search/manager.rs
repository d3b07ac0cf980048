//! Node counting, limits and cooperative cancellation for one solve

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// The clock is read once per this many nodes.
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Budget for a single solve. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub max_nodes: Option<u64>,
    pub time_limit_ms: Option<u64>,
}

/// Counters and termination state for one `solve` call.
///
/// Termination latches: once a limit is hit or the cancel flag is raised,
/// every later [`SearchManager::visit`] reports it.
#[derive(Debug)]
pub struct SearchManager {
    nodes: u64,
    start: Instant,
    limits: SearchLimits,
    cancel: Option<Arc<AtomicBool>>,
    terminated: bool,
    proof_tree_count: u64,
    proof_tree_success: u64,
    simulation_count: u64,
    simulation_success: u64,
}

impl SearchManager {
    pub fn new(limits: SearchLimits, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self {
            nodes: 0,
            start: Instant::now(),
            limits,
            cancel,
            terminated: false,
            proof_tree_count: 0,
            proof_tree_success: 0,
            simulation_count: 0,
            simulation_success: 0,
        }
    }

    /// Reset counters and the clock for a new solve. Limits and the cancel
    /// flag are kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.limits, self.cancel.clone());
    }

    /// Count a node and poll the termination conditions.
    ///
    /// Returns `true` when the search must stop.
    #[inline]
    pub fn visit(&mut self) -> bool {
        self.nodes += 1;
        if self.terminated {
            return true;
        }
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                self.terminated = true;
            }
        }
        if let Some(max) = self.limits.max_nodes {
            if self.nodes > max {
                self.terminated = true;
            }
        }
        if let Some(ms) = self.limits.time_limit_ms {
            if self.nodes % TIME_CHECK_INTERVAL == 0
                && self.start.elapsed() >= Duration::from_millis(ms)
            {
                self.terminated = true;
            }
        }
        self.terminated
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn record_proof_tree(&mut self, success: bool) {
        self.proof_tree_count += 1;
        if success {
            self.proof_tree_success += 1;
        }
    }

    pub fn record_simulation(&mut self, success: bool) {
        self.simulation_count += 1;
        if success {
            self.simulation_success += 1;
        }
    }

    /// Snapshot of the counters for reporting.
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            nodes: self.nodes,
            elapsed: self.elapsed(),
            proof_tree_count: self.proof_tree_count,
            proof_tree_success: self.proof_tree_success,
            simulation_count: self.simulation_count,
            simulation_success: self.simulation_success,
        }
    }
}

/// Counters reported with a search result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub proof_tree_count: u64,
    pub proof_tree_success: u64,
    pub simulation_count: u64,
    pub simulation_success: u64,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl SearchStats {
    /// Nodes per second, `None` when no measurable time has passed.
    pub fn nps(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (self.elapsed.as_millis() > 0).then(|| self.nodes as f64 / secs)
    }

    pub fn proof_tree_rate(&self) -> f64 {
        rate(self.proof_tree_success, self.proof_tree_count)
    }

    pub fn simulation_rate(&self) -> f64 {
        rate(self.simulation_success, self.simulation_count)
    }
}

/// Success percentage rounded to one decimal.
fn rate(success: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        (1000.0 * success as f64 / count as f64).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_terminates() {
        let mut m = SearchManager::new(SearchLimits::default(), None);
        for _ in 0..5000 {
            assert!(!m.visit());
        }
        assert_eq!(m.nodes(), 5000);
    }

    #[test]
    fn test_node_limit_latches() {
        let limits = SearchLimits {
            max_nodes: Some(10),
            time_limit_ms: None,
        };
        let mut m = SearchManager::new(limits, None);
        for _ in 0..10 {
            assert!(!m.visit());
        }
        assert!(m.visit());
        assert!(m.is_terminated());
        assert!(m.visit());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut m = SearchManager::new(SearchLimits::default(), Some(flag.clone()));
        assert!(!m.visit());
        flag.store(true, Ordering::Relaxed);
        assert!(m.visit());
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut m = SearchManager::new(SearchLimits::default(), None);
        m.visit();
        m.record_proof_tree(true);
        m.record_simulation(false);
        m.reset();
        let stats = m.stats();
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.proof_tree_count, 0);
        assert_eq!(stats.simulation_count, 0);
    }

    #[test]
    fn test_rates() {
        let mut m = SearchManager::new(SearchLimits::default(), None);
        m.record_proof_tree(true);
        m.record_proof_tree(true);
        m.record_proof_tree(false);
        let stats = m.stats();
        assert_eq!(stats.proof_tree_success, 2);
        assert_eq!(stats.proof_tree_rate(), 66.7);
        assert_eq!(stats.simulation_rate(), 0.0);
    }
}
