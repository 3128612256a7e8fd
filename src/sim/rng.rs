//! Injectable randomness
//!
//! All jitter, spawn timing and AI dice rolls go through [`SimRng`] so a run is
//! reproducible from its seed. Any `rand::Rng` implements it; the game itself
//! uses a seeded [`Pcg32`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Random source used by the simulation
pub trait SimRng {
    /// Uniform in [0, 1)
    fn unit(&mut self) -> f32;

    /// Uniform in [lo, hi); returns `lo` for an empty range
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Uniform in [-1, 1)
    fn signed(&mut self) -> f32 {
        self.unit() * 2.0 - 1.0
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Either 1.0 or -1.0
    fn sign(&mut self) -> f32 {
        if self.unit() < 0.5 { 1.0 } else { -1.0 }
    }

    /// Uniform index in [0, n); 0 when n == 0
    fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.unit() * n as f32) as usize).min(n - 1)
    }

    /// Random unit vector
    fn direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.range(0.0, std::f32::consts::TAU))
    }
}

impl<R: Rng> SimRng for R {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Scripted RNG that replays a fixed sequence of unit values (tests)
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl SimRng for SequenceRng {
    fn unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RngState::new(7).to_rng();
        let mut b = RngState::new(7).to_rng();
        for _ in 0..16 {
            assert_eq!(SimRng::unit(&mut a), SimRng::unit(&mut b));
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let v = rng.range(2.0, 5.0);
            assert!((2.0..5.0).contains(&v));
            assert!(rng.index(4) < 4);
        }
        assert_eq!(rng.range(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_sequence_rng_cycles() {
        let mut rng = SequenceRng::new(vec![0.1, 0.9]);
        assert_eq!(rng.unit(), 0.1);
        assert_eq!(rng.unit(), 0.9);
        assert_eq!(rng.unit(), 0.1);
        assert!(!rng.chance(0.05));
    }
}
