//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

/// Round-robin selector.
/// Keeps one rotating counter per selection key so models rotate independently.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counters: DashMap<String, AtomicUsize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&self, key: &str, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        if let Some(counter) = self.counters.get(key) {
            return counter.fetch_add(1, Ordering::Relaxed) % count;
        }
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicUsize::new(0));
        counter.fetch_add(1, Ordering::Relaxed) % count
    }
}
