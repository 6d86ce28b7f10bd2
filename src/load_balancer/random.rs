//! Uniform random load balancing strategy.

use rand::Rng;

/// Random selector. Stateless.
#[derive(Debug, Default)]
pub struct RandomSelector;

impl RandomSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn next_index(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..count)
    }
}
