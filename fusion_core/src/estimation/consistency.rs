// fusion_core/src/estimation/consistency.rs

//! Filter consistency bookkeeping based on the normalized innovation squared.
//!
//! For a well-tuned filter the NIS of an `m`-dimensional measurement follows a
//! chi-square distribution with `m` degrees of freedom, so about 5% of the
//! samples should land above the 95% quantile. Nothing here rejects
//! measurements; it only counts.

use crate::messages::SensorKind;
use serde::{Deserialize, Serialize};

/// 95% quantiles of the chi-square distribution for 1 to 5 degrees of freedom.
const CHI_SQUARE_95: [f64; 5] = [3.841, 5.991, 7.815, 9.488, 11.070];

/// The 95% chi-square bound for `dof` degrees of freedom, if tabulated.
pub fn chi_square_95(dof: usize) -> Option<f64> {
    dof.checked_sub(1).and_then(|i| CHI_SQUARE_95.get(i).copied())
}

/// Running NIS statistics for one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct NisMonitor {
    sensor: SensorKind,
    threshold: f64,
    count: usize,
    sum: f64,
    exceeded: usize,
}

/// A snapshot of a `NisMonitor`, suitable for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NisSummary {
    pub sensor: SensorKind,
    pub count: usize,
    pub mean: f64,
    pub threshold: f64,
    pub exceed_fraction: f64,
}

impl NisMonitor {
    pub fn new(sensor: SensorKind) -> Self {
        // Both sensors are tabulated (2 and 3 dof).
        let threshold = chi_square_95(sensor.measurement_dim()).unwrap_or(f64::INFINITY);
        Self {
            sensor,
            threshold,
            count: 0,
            sum: 0.0,
            exceeded: 0,
        }
    }

    pub fn record(&mut self, nis: f64) {
        self.count += 1;
        self.sum += nis;
        if nis > self.threshold {
            self.exceeded += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Fraction of recorded samples above the 95% bound.
    pub fn exceed_fraction(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.exceeded as f64 / self.count as f64
        }
    }

    pub fn summary(&self) -> NisSummary {
        NisSummary {
            sensor: self.sensor,
            count: self.count,
            mean: self.mean(),
            threshold: self.threshold,
            exceed_fraction: self.exceed_fraction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_thresholds() {
        assert_eq!(chi_square_95(0), None);
        assert_eq!(chi_square_95(2), Some(5.991));
        assert_eq!(chi_square_95(3), Some(7.815));
        assert_eq!(chi_square_95(6), None);
    }

    #[test]
    fn test_monitor_counts_exceedances() {
        let mut monitor = NisMonitor::new(SensorKind::Lidar);
        assert_eq!(monitor.mean(), 0.0);
        assert_eq!(monitor.exceed_fraction(), 0.0);

        for nis in [1.0, 2.0, 3.0, 10.0] {
            monitor.record(nis);
        }
        assert_eq!(monitor.count(), 4);
        assert_abs_diff_eq!(monitor.mean(), 4.0);
        assert_abs_diff_eq!(monitor.exceed_fraction(), 0.25);

        let summary = monitor.summary();
        assert_eq!(summary.sensor, SensorKind::Lidar);
        assert_eq!(summary.threshold, 5.991);
    }

    #[test]
    fn test_radar_uses_three_dof() {
        let mut monitor = NisMonitor::new(SensorKind::Radar);
        monitor.record(7.0);
        assert_eq!(monitor.exceed_fraction(), 0.0);
    }
}
