// fusion_core/src/utils/angles.rs

use num_traits::{Float, FloatConst};

/// Wraps an angle into the half-open interval `(-pi, pi]`.
///
/// Used for the state heading, the radar bearing and every difference of
/// either, so all of them share one wrap convention.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    let pi = T::PI();
    let tau = T::TAU();

    // `r` lands in [0, tau), which maps `pi - r` into (-pi, pi].
    let shifted = pi - angle;
    let r = shifted - tau * (shifted / tau).floor();
    let wrapped = pi - r;

    // Rounding can push `r` onto `tau` itself for huge inputs.
    if wrapped <= -pi {
        wrapped + tau
    } else {
        wrapped
    }
}

/// Wraps a single component of a vector in place.
pub fn normalize_component(values: &mut [f64], index: usize) {
    values[index] = normalize_angle(values[index]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_inside_range() {
        assert_abs_diff_eq!(normalize_angle(0.5_f64), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-3.0_f64), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundaries() {
        assert_abs_diff_eq!(normalize_angle(PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_multiple_turns() {
        assert_abs_diff_eq!(normalize_angle(0.25 + 6.0 * PI), 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(0.25 - 8.0 * PI), 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(1.5_f32 * std::f32::consts::PI), -0.5 * std::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn test_normalize_component() {
        let mut v = [1.0, 2.0, 7.0];
        normalize_component(&mut v, 2);
        assert_abs_diff_eq!(v[2], 7.0 - 2.0 * PI, epsilon = 1e-12);
        assert_eq!(v[0], 1.0);
    }

    proptest! {
        #[test]
        fn wrapped_angle_stays_in_range(angle in -40.0_f64..40.0) {
            let wrapped = normalize_angle(angle);
            prop_assert!(wrapped > -PI && wrapped <= PI);
        }

        #[test]
        fn wrapping_preserves_direction(angle in -40.0_f64..40.0) {
            let wrapped = normalize_angle(angle);
            prop_assert!((wrapped.sin() - angle.sin()).abs() < 1e-9);
            prop_assert!((wrapped.cos() - angle.cos()).abs() < 1e-9);
        }
    }
}
