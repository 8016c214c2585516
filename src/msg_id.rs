//! Process-wide message-ID generation.
//!
//! IDs tag outbound commands and correlate their responses. The counter is
//! atomic and shared by every command-issuing call site; an ID still
//! pending a response anywhere in the process is skipped, so a wrapped
//! counter can never collide with an outstanding command. 0 is reserved
//! for sensor-stream frames and never handed out.

use dashmap::DashSet;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(1);

/// IDs of commands awaiting a response, across all devices.
static IN_FLIGHT: Lazy<DashSet<u32>> = Lazy::new(DashSet::new);

/// Returns a fresh message ID, unique among all currently pending commands.
pub fn next_msg_id() -> u32 {
    loop {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        if id != 0 && !IN_FLIGHT.contains(&id) {
            return id;
        }
    }
}

pub(crate) fn reserve(id: u32) {
    IN_FLIGHT.insert(id);
}

pub(crate) fn release(id: u32) {
    IN_FLIGHT.remove(&id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_msg_id()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert_ne!(id, 0);
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
    }

    #[test]
    fn reserved_ids_are_skipped() {
        let base = next_msg_id();
        let reserved: Vec<u32> = (1..=32).map(|i| base.wrapping_add(i)).collect();
        for &id in &reserved {
            reserve(id);
        }
        for _ in 0..64 {
            let id = next_msg_id();
            assert!(!reserved.contains(&id), "generator returned in-flight id {id}");
        }
        for &id in &reserved {
            release(id);
        }
    }
}
