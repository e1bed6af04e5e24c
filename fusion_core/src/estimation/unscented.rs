// fusion_core/src/estimation/unscented.rs

//! Unscented transform building blocks.
//!
//! Sigma points are stored one per column. Every function here is pure: it
//! reads its inputs and returns fresh values, so the filter can run a whole
//! cycle on locals and commit only once everything succeeded.

use crate::error::EstimationError;
use crate::types::{sigma_spread, Covariance, SigmaPoints, State};
use crate::utils::angles::{normalize_angle, normalize_component};
use nalgebra::{Cholesky, DMatrix, DVector};

/// Mean and covariance of a (approximately) Gaussian distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments {
    pub mean: DVector<f64>,
    pub covariance: DMatrix<f64>,
}

/// Result of fusing one measurement into a prior.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub mean: State,
    pub covariance: Covariance,
    /// Normalized innovation squared of the fused measurement.
    pub nis: f64,
}

/// The `2n+1` weights for a distribution of dimension `n`, with
/// `lambda = 3 - n`. They always sum to one.
pub fn sigma_weights(n: usize) -> DVector<f64> {
    let lambda = sigma_spread(n);
    let c = lambda + n as f64;

    let mut weights = DVector::from_element(2 * n + 1, 0.5 / c);
    weights[0] = lambda / c;
    weights
}

/// Generates the `2n+1` sigma points of `moments` with spreading `lambda`.
///
/// Column 0 is the mean, column `i + 1` adds and column `i + n + 1` subtracts
/// the `i`-th column of `sqrt(lambda + n) * L`, where `P = L * L^T`.
pub fn sigma_points(moments: &Moments, lambda: f64) -> Result<SigmaPoints, EstimationError> {
    let n = moments.mean.nrows();
    let chol = Cholesky::new(moments.covariance.clone()).ok_or(EstimationError::NotPositiveDefinite)?;
    let scaled_l = chol.l() * (lambda + n as f64).sqrt();

    let mut points = DMatrix::zeros(n, 2 * n + 1);
    points.column_mut(0).copy_from(&moments.mean);
    for i in 0..n {
        let offset = scaled_l.column(i);
        points.column_mut(i + 1).copy_from(&(&moments.mean + offset));
        points.column_mut(i + n + 1).copy_from(&(&moments.mean - offset));
    }
    Ok(points)
}

/// Appends zero-mean process noise terms to the kinematic state.
///
/// The augmented covariance is block diagonal: `P` on top, then the
/// variance of each noise term (`std_a^2` and `std_yawdd^2` for CTRV).
pub fn augment(state: &State, covariance: &Covariance, noise_std: &[f64]) -> Moments {
    let n_x = state.len();
    let n_aug = n_x + noise_std.len();

    let mut mean = DVector::zeros(n_aug);
    mean.rows_mut(0, n_x).copy_from(state);

    let mut aug_cov = DMatrix::zeros(n_aug, n_aug);
    aug_cov.view_mut((0, 0), (n_x, n_x)).copy_from(covariance);
    for (i, std) in noise_std.iter().enumerate() {
        aug_cov[(n_x + i, n_x + i)] = std * std;
    }

    Moments {
        mean,
        covariance: aug_cov,
    }
}

/// The `2 * n_aug + 1` augmented sigma points of the current belief.
pub fn augmented_sigma_points(
    state: &State,
    covariance: &Covariance,
    noise_std: &[f64],
) -> Result<SigmaPoints, EstimationError> {
    let moments = augment(state, covariance, noise_std);
    let n_aug = moments.mean.len();
    sigma_points(&moments, sigma_spread(n_aug))
}

/// Deviation of one sigma column from a mean, with the angular row wrapped.
fn deviation(
    points: &SigmaPoints,
    column: usize,
    mean: &DVector<f64>,
    angle_index: Option<usize>,
) -> DVector<f64> {
    let mut diff = points.column(column) - mean;
    if let Some(idx) = angle_index {
        normalize_component(diff.as_mut_slice(), idx);
    }
    diff
}

/// Recovers mean and covariance from weighted sigma points.
///
/// The mean is a plain weighted sum. When `angle_index` is set, that row of
/// each deviation is wrapped before it enters the covariance.
pub fn points_to_moments(
    points: &SigmaPoints,
    weights: &DVector<f64>,
    angle_index: Option<usize>,
) -> Moments {
    let n = points.nrows();
    let mean = points * weights;

    let mut covariance = DMatrix::zeros(n, n);
    for i in 0..points.ncols() {
        let diff = deviation(points, i, &mean, angle_index);
        covariance += weights[i] * &diff * diff.transpose();
    }

    Moments { mean, covariance }
}

/// Cross-covariance `Tc` between state-space and measurement-space sigma points.
pub fn cross_covariance(
    state_points: &SigmaPoints,
    state_mean: &State,
    state_angle: Option<usize>,
    meas_points: &SigmaPoints,
    meas_mean: &DVector<f64>,
    meas_angle: Option<usize>,
    weights: &DVector<f64>,
) -> DMatrix<f64> {
    let mut tc = DMatrix::zeros(state_points.nrows(), meas_points.nrows());
    for i in 0..state_points.ncols() {
        let x_diff = deviation(state_points, i, state_mean, state_angle);
        let z_diff = deviation(meas_points, i, meas_mean, meas_angle);
        tc += weights[i] * x_diff * z_diff.transpose();
    }
    tc
}

/// The Kalman correction of `prior` with measurement `z`.
///
/// Returns `None` when the innovation covariance cannot be inverted.
pub fn correct(
    prior: &Moments,
    predicted: &Moments,
    cross: &DMatrix<f64>,
    z: &DVector<f64>,
    state_angle: Option<usize>,
    meas_angle: Option<usize>,
) -> Option<Correction> {
    let s = &predicted.covariance;
    let s_inv = s.clone().try_inverse()?;
    let k_gain = cross * &s_inv;

    let mut innovation = z - &predicted.mean;
    if let Some(idx) = meas_angle {
        innovation[idx] = normalize_angle(innovation[idx]);
    }

    let mut mean = &prior.mean + &k_gain * &innovation;
    if let Some(idx) = state_angle {
        mean[idx] = normalize_angle(mean[idx]);
    }

    let covariance = &prior.covariance - &k_gain * s * k_gain.transpose();
    // Tiny numerical errors can make P slightly non-symmetric. This forces it.
    let covariance = (&covariance + covariance.transpose()) * 0.5;

    let nis = (innovation.transpose() * &s_inv * &innovation)[(0, 0)];

    Some(Correction {
        mean,
        covariance,
        nis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{N_AUG, N_X};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn sample_covariance(n: usize) -> DMatrix<f64> {
        // A * A^T + I is symmetric positive definite.
        let a = DMatrix::from_fn(n, n, |i, j| ((i * 7 + j * 3) % 5) as f64 * 0.1);
        &a * a.transpose() + DMatrix::identity(n, n)
    }

    #[test]
    fn test_weights_for_augmented_state() {
        let w = sigma_weights(N_AUG);
        assert_eq!(w.len(), 15);
        assert_abs_diff_eq!(w[0], -4.0 / 3.0, epsilon = 1e-12);
        for i in 1..15 {
            assert_abs_diff_eq!(w[i], 1.0 / 6.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn weights_sum_to_one(n in 1usize..40) {
            let w = sigma_weights(n);
            prop_assert_eq!(w.len(), 2 * n + 1);
            prop_assert!((w.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sigma_points_layout() {
        let moments = Moments {
            mean: DVector::from_vec(vec![1.0, 2.0]),
            covariance: DMatrix::identity(2, 2),
        };
        let points = sigma_points(&moments, sigma_spread(2)).unwrap();
        assert_eq!(points.shape(), (2, 5));
        // sqrt(lambda + n) = sqrt(3)
        let s = 3.0_f64.sqrt();
        assert_abs_diff_eq!(points[(0, 0)], 1.0);
        assert_abs_diff_eq!(points[(0, 1)], 1.0 + s, epsilon = 1e-12);
        assert_abs_diff_eq!(points[(0, 3)], 1.0 - s, epsilon = 1e-12);
        assert_abs_diff_eq!(points[(1, 2)], 2.0 + s, epsilon = 1e-12);
        assert_abs_diff_eq!(points[(1, 4)], 2.0 - s, epsilon = 1e-12);
    }

    #[test]
    fn test_sigma_points_round_trip() {
        for n in [2, N_X, N_AUG] {
            let mean = DVector::from_fn(n, |i, _| i as f64 * 0.7 - 1.0);
            let moments = Moments {
                mean: mean.clone(),
                covariance: sample_covariance(n),
            };
            let points = sigma_points(&moments, sigma_spread(n)).unwrap();
            let recovered = points_to_moments(&points, &sigma_weights(n), None);

            assert_abs_diff_eq!(recovered.mean, moments.mean, epsilon = 1e-9);
            assert_abs_diff_eq!(recovered.covariance, moments.covariance, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sigma_points_rejects_indefinite_covariance() {
        let moments = Moments {
            mean: DVector::zeros(2),
            covariance: DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]),
        };
        assert_eq!(
            sigma_points(&moments, 1.0).unwrap_err(),
            EstimationError::NotPositiveDefinite
        );
    }

    #[test]
    fn test_augment_layout() {
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0, 0.4, 0.1]);
        let p = sample_covariance(N_X);
        let aug = augment(&x, &p, &[0.5, 0.2]);

        assert_eq!(aug.mean.len(), N_AUG);
        assert_eq!(aug.mean.rows(0, N_X).into_owned(), x);
        assert_eq!(aug.mean[5], 0.0);
        assert_eq!(aug.mean[6], 0.0);
        assert_eq!(aug.covariance.view((0, 0), (N_X, N_X)).into_owned(), p);
        assert_abs_diff_eq!(aug.covariance[(5, 5)], 0.25);
        assert_abs_diff_eq!(aug.covariance[(6, 6)], 0.04, epsilon = 1e-15);
        assert_eq!(aug.covariance[(5, 6)], 0.0);
        assert_eq!(aug.covariance[(0, 5)], 0.0);

        let points = augmented_sigma_points(&x, &p, &[0.5, 0.2]).unwrap();
        assert_eq!(points.shape(), (N_AUG, 15));
    }

    #[test]
    fn test_angle_deviation_is_wrapped() {
        // Three headings around the seam; the middle one has crossed over to -pi.
        let a = PI - 0.05;
        let points = DMatrix::from_row_slice(1, 3, &[a, normalize_angle(a + 0.1), a - 0.1]);
        let weights = DVector::from_vec(vec![0.5, 0.25, 0.25]);

        let wrapped = points_to_moments(&points, &weights, Some(0));
        let raw = points_to_moments(&points, &weights, None);

        // The mean is a plain weighted sum in both cases.
        assert_abs_diff_eq!(wrapped.mean[0], 0.5 * PI - 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(wrapped.mean, raw.mean);

        let half = 0.5 * PI;
        let expected =
            0.5 * half * half + 0.25 * (half + 0.1).powi(2) + 0.25 * (half - 0.1).powi(2);
        assert_abs_diff_eq!(wrapped.covariance[(0, 0)], expected, epsilon = 1e-9);
        assert!(raw.covariance[(0, 0)] > wrapped.covariance[(0, 0)]);
    }

    #[test]
    fn test_cross_covariance_of_identity_map_is_covariance() {
        let moments = Moments {
            mean: DVector::from_vec(vec![0.5, -1.0, 2.0]),
            covariance: sample_covariance(3),
        };
        let points = sigma_points(&moments, sigma_spread(3)).unwrap();
        let w = sigma_weights(3);
        let tc = cross_covariance(&points, &moments.mean, None, &points, &moments.mean, None, &w);
        assert_abs_diff_eq!(tc, moments.covariance, epsilon = 1e-9);
    }

    #[test]
    fn test_cross_covariance_wraps_both_angles() {
        // Heading and bearing sigma values straddling the +-pi seam.
        let a = PI - 0.05;
        let points = DMatrix::from_row_slice(1, 3, &[a, normalize_angle(a + 0.1), a - 0.1]);
        let mean = DVector::from_vec(vec![a]);
        let weights = DVector::from_vec(vec![0.5, 0.25, 0.25]);

        let tc = cross_covariance(&points, &mean, Some(0), &points, &mean, Some(0), &weights);
        // Wrapped deviations are 0, +0.1 and -0.1.
        assert_abs_diff_eq!(tc[(0, 0)], 0.005, epsilon = 1e-12);

        let raw = cross_covariance(&points, &mean, None, &points, &mean, None, &weights);
        assert!(raw[(0, 0)] > 1.0);

        // Wrapping only the state side leaves the raw bearing jump in.
        let half = cross_covariance(&points, &mean, Some(0), &points, &mean, None, &weights);
        let expected = 0.25 * 0.1 * (-2.0 * PI + 0.1) + 0.25 * (-0.1) * (-0.1);
        assert_abs_diff_eq!(half[(0, 0)], expected, epsilon = 1e-9);
    }

    #[test]
    fn test_correct_with_zero_innovation() {
        let prior = Moments {
            mean: DVector::from_vec(vec![1.0, 2.0]),
            covariance: DMatrix::identity(2, 2),
        };
        let predicted = Moments {
            mean: DVector::from_vec(vec![1.0, 2.0]),
            covariance: DMatrix::identity(2, 2) * 2.0,
        };
        let cross = DMatrix::identity(2, 2);
        let out = correct(&prior, &predicted, &cross, &predicted.mean, None, None).unwrap();

        assert_abs_diff_eq!(out.mean, prior.mean, epsilon = 1e-12);
        assert_abs_diff_eq!(out.nis, 0.0, epsilon = 1e-12);
        // P - K S K^T = I - 0.5 I
        assert_abs_diff_eq!(out.covariance, DMatrix::identity(2, 2) * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_correct_wraps_bearing_innovation() {
        let prior = Moments {
            mean: DVector::from_vec(vec![0.0]),
            covariance: DMatrix::identity(1, 1),
        };
        let predicted = Moments {
            mean: DVector::from_vec(vec![PI - 0.05]),
            covariance: DMatrix::identity(1, 1),
        };
        let cross = DMatrix::identity(1, 1);
        let z = DVector::from_vec(vec![-PI + 0.05]);
        let out = correct(&prior, &predicted, &cross, &z, None, Some(0)).unwrap();

        // The innovation is +0.1 rad, not -(2pi - 0.1).
        assert_abs_diff_eq!(out.mean[0], 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(out.nis, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_correct_singular_innovation() {
        let prior = Moments {
            mean: DVector::zeros(2),
            covariance: DMatrix::identity(2, 2),
        };
        let predicted = Moments {
            mean: DVector::zeros(2),
            covariance: DMatrix::zeros(2, 2),
        };
        let cross = DMatrix::zeros(2, 2);
        assert!(correct(&prior, &predicted, &cross, &DVector::zeros(2), None, None).is_none());
    }
}
