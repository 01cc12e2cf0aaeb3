use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)` for the reference strategies.
pub trait Sampler: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// `StdRng`-backed sampler; seeded for reproducible runs.
#[derive(Debug)]
pub struct SeededSampler {
    rng: Mutex<StdRng>,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Sampler for SeededSampler {
    fn next_unit(&self) -> f64 {
        let mut rng = self.rng.lock().expect("sampler mutex poisoned");
        rng.gen::<f64>()
    }
}

/// Always returns the same draw. Clamped into `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(f64);

impl FixedSampler {
    pub fn new(unit: f64) -> Self {
        Self(if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 })
    }
}

impl Sampler for FixedSampler {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Closed interval a sampled quantity must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn sample(&self, sampler: &dyn Sampler) -> f64 {
        self.at(sampler.next_unit())
    }

    /// Point at fraction `unit` of the way from `low` to `high`.
    pub fn at(&self, unit: f64) -> f64 {
        let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
        (self.low + unit * (self.high - self.low)).clamp(self.low, self.high)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_samplers_repeat() {
        let first = SeededSampler::new(7);
        let second = SeededSampler::new(7);
        for _ in 0..16 {
            assert_eq!(first.next_unit(), second.next_unit());
        }
    }

    #[test]
    fn band_sampling_stays_inside() {
        let band = Band::new(0.8, 1.0);
        let sampler = SeededSampler::new(99);
        for _ in 0..256 {
            assert!(band.contains(band.sample(&sampler)));
        }
        assert_eq!(band.sample(&FixedSampler::new(1.7)), 1.0);
        assert_eq!(band.at(f64::NAN), 0.8);
    }
}
