//! Seeded latency injection for race and timing tests

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws exponentially distributed delays, clamped to `max_delay_micros`.
///
/// The mean is a quarter of the maximum, so most delays are short with an
/// occasional long stall. Two injectors built from the same seed produce the
/// same sequence.
#[derive(Debug, Clone)]
pub struct DelayInjector {
    rng: StdRng,
    max_delay_micros: u64,
    seed: u64,
    draws: u64,
}

impl DelayInjector {
    pub fn new(max_delay_micros: u64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_delay_micros,
            seed,
            draws: 0,
        }
    }

    pub fn max_delay_micros(&self) -> u64 {
        self.max_delay_micros
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of delays drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn next_delay(&mut self) -> Duration {
        self.draws += 1;
        let u: f64 = self.rng.gen();
        if self.max_delay_micros == 0 {
            return Duration::ZERO;
        }

        let max = self.max_delay_micros as f64;
        let mean = max / 4.0;
        let sample = -(1.0 - u).ln() * mean;
        Duration::from_micros(sample.min(max) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DelayInjector::new(500, 42);
        let mut b = DelayInjector::new(500, 42);
        let first: Vec<_> = (0..64).map(|_| a.next_delay()).collect();
        let second: Vec<_> = (0..64).map(|_| b.next_delay()).collect();
        assert_eq!(first, second);
        assert_eq!(a.draws(), 64);
    }

    #[test]
    fn test_different_seed_differs() {
        let mut a = DelayInjector::new(10_000, 1);
        let mut b = DelayInjector::new(10_000, 2);
        let first: Vec<_> = (0..32).map(|_| a.next_delay()).collect();
        let second: Vec<_> = (0..32).map(|_| b.next_delay()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_delays_are_bounded() {
        let mut injector = DelayInjector::new(200, 7);
        for _ in 0..1_000 {
            assert!(injector.next_delay() <= Duration::from_micros(200));
        }
    }

    #[test]
    fn test_zero_max_means_no_delay() {
        let mut injector = DelayInjector::new(0, 9);
        assert_eq!(injector.next_delay(), Duration::ZERO);
        assert_eq!(injector.draws(), 1);
    }
}
