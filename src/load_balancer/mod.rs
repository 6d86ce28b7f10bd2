//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver has N candidate bindings for a model
//!     → IndexSelector::select_index(strategy, key, N)
//!     → StrategySelector dispatches on the strategy name:
//!         - random.rs (uniform random pick)
//!         - round_robin.rs (rotate per selection key)
//!     → index in [0, N)
//! ```
//!
//! # Design Decisions
//! - Selectors only see a count, never the bindings themselves
//! - Round-robin state is keyed by selection key (usually the model name)
//! - Unknown strategy names fall back to random

use std::fmt::Debug;

pub mod random;
pub mod round_robin;

use random::RandomSelector;
use round_robin::RoundRobin;

/// Picks one candidate out of `count`.
pub trait IndexSelector: Send + Sync + Debug {
    /// Returns an index in `[0, count)`. Returns 0 when `count` is 0.
    fn select_index(&self, strategy: &str, key: &str, count: usize) -> usize;
}

/// Default selector: dispatches on the configured strategy name.
#[derive(Debug, Default)]
pub struct StrategySelector {
    random: RandomSelector,
    round_robin: RoundRobin,
}

impl StrategySelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexSelector for StrategySelector {
    fn select_index(&self, strategy: &str, key: &str, count: usize) -> usize {
        if count <= 1 {
            return 0;
        }
        match strategy {
            "random" => self.random.next_index(count),
            "round_robin" | "rr" => self.round_robin.next_index(key, count),
            "first" => 0,
            other => {
                tracing::debug!(strategy = %other, "Unknown load balancing strategy, using random");
                self.random.next_index(count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single_pool() {
        let selector = StrategySelector::new();
        assert_eq!(selector.select_index("random", "m", 0), 0);
        assert_eq!(selector.select_index("round_robin", "m", 1), 0);
    }

    #[test]
    fn test_first_strategy() {
        let selector = StrategySelector::new();
        for _ in 0..10 {
            assert_eq!(selector.select_index("first", "m", 5), 0);
        }
    }

    #[test]
    fn test_every_strategy_stays_in_range() {
        let selector = StrategySelector::new();
        for strategy in ["random", "round_robin", "rr", "first", "weighted?"] {
            for _ in 0..50 {
                assert!(selector.select_index(strategy, "m", 3) < 3);
            }
        }
    }
}
