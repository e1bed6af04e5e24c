// fusion_sim/src/simulation/core/prng.rs

use crate::error::SimError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

/// A newtype wrapper around `ChaCha8Rng`.
/// This is the central, deterministic pseudo-random number generator of a run:
/// the same seed always produces the same trajectory and measurements.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// A zero-mean Gaussian with standard deviation `std`.
///
/// `std` must be finite and non-negative; zero gives a noiseless source.
/// `name` labels the offending scenario field in the error.
pub fn zero_mean_noise(name: &str, std: f64) -> Result<Normal<f64>, SimError> {
    if !std.is_finite() || std < 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "{} must be a finite, non-negative standard deviation, got {}",
            name, std
        )));
    }
    Normal::new(0.0, std).map_err(|e| SimError::InvalidScenario(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_distr::Distribution;

    #[test]
    fn test_noise_rejects_bad_deviations() {
        assert!(zero_mean_noise("std_a", -0.1).is_err());
        assert!(zero_mean_noise("std_a", f64::NAN).is_err());
        assert!(zero_mean_noise("std_a", f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_deviation_is_noiseless() {
        let noise = zero_mean_noise("std_a", 0.0).unwrap();
        let mut rng = SimulationRng::from_seed(1);
        assert_eq!(noise.sample(&mut rng.0), 0.0);
    }
}
