// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Latency and failure injection applied to every store call.
///
/// Disabled by default; the server binary turns it on for demo realism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaosPolicy {
    pub mock_delay: Duration,
    /// 0..=100; the share of calls that fail with `StoreError::Injected`.
    pub failure_rate_pct: u8,
}

impl Default for ChaosPolicy {
    fn default() -> Self {
        Self {
            mock_delay: Duration::ZERO,
            failure_rate_pct: 0,
        }
    }
}

impl ChaosPolicy {
    #[must_use]
    pub fn new(mock_delay: Duration, failure_rate_pct: u8) -> Self {
        Self {
            mock_delay,
            failure_rate_pct: failure_rate_pct.min(100),
        }
    }
}

/// Deterministic stand-in for a random source.
///
/// A counter fed through a 64-bit mixer gives a repeatable sequence that is
/// uniform enough for a failure-rate gate while keeping tests replayable.
#[derive(Debug, Default)]
pub struct FailureSequence {
    counter: AtomicU64,
}

impl FailureSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_u64(&self) -> u64 {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        // splitmix64 finalizer.
        let mut z = n.wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// True when this call should fail under the given rate.
    #[must_use]
    pub fn should_fail(&self, rate_pct: u8) -> bool {
        if rate_pct == 0 {
            return false;
        }
        if rate_pct >= 100 {
            return true;
        }
        (self.next_u64() % 100) < u64::from(rate_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_fails() {
        let seq = FailureSequence::new();
        assert!((0..1000).all(|_| !seq.should_fail(0)));
    }

    #[test]
    fn full_rate_always_fails() {
        let seq = FailureSequence::new();
        assert!((0..100).all(|_| seq.should_fail(100)));
    }

    #[test]
    fn five_percent_rate_fails_roughly_one_in_twenty() {
        let seq = FailureSequence::new();
        let failures = (0..10_000).filter(|_| seq.should_fail(5)).count();
        assert!(
            (300..=700).contains(&failures),
            "failure count {failures} outside expected band"
        );
    }

    #[test]
    fn sequence_is_deterministic() {
        let a = FailureSequence::new();
        let b = FailureSequence::new();
        let run_a: Vec<bool> = (0..64).map(|_| a.should_fail(50)).collect();
        let run_b: Vec<bool> = (0..64).map(|_| b.should_fail(50)).collect();
        assert_eq!(run_a, run_b);
    }
}
