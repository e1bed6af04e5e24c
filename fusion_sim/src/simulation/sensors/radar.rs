// fusion_sim/src/simulation/sensors/radar.rs

use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::simulation::config::SensorConfig;
use crate::simulation::core::prng::{zero_mean_noise, SimulationRng};
use crate::simulation::sensors::{period_from_rate, SimulatedSensor};
use crate::simulation::truth::TruthState;
use fusion_core::config::RadarNoise;
use fusion_core::messages::{MeasurementMessage, SensorKind};
use fusion_core::utils::angles::normalize_angle;

/// A radar at the origin measuring range, bearing and range rate of the
/// target. The noisy bearing is wrapped back into (-pi, pi].
#[derive(Debug, Clone)]
pub struct SimulatedRadar {
    period_us: u64,
    noise_r: Normal<f64>,
    noise_phi: Normal<f64>,
    noise_rdot: Normal<f64>,
}

impl SimulatedRadar {
    pub fn new(config: &SensorConfig<RadarNoise>) -> Result<Self, SimError> {
        let noise = |name: &str, std: f64| zero_mean_noise(&format!("radar.{}", name), std);
        Ok(Self {
            period_us: period_from_rate(config.rate_hz),
            noise_r: noise("std_r", config.noise.std_r)?,
            noise_phi: noise("std_phi", config.noise.std_phi)?,
            noise_rdot: noise("std_rdot", config.noise.std_rdot)?,
        })
    }
}

/// Noise-free `[rho, phi, rho_dot]` of a target state. The range rate is
/// reported as zero when the target sits on the sensor.
pub fn ideal_reading(truth: &TruthState) -> (f64, f64, f64) {
    let rho = truth.px.hypot(truth.py);
    let phi = truth.py.atan2(truth.px);
    let rho_dot = if rho > f64::EPSILON {
        let (vx, vy) = (truth.v * truth.yaw.cos(), truth.v * truth.yaw.sin());
        (truth.px * vx + truth.py * vy) / rho
    } else {
        0.0
    };
    (rho, phi, rho_dot)
}

impl SimulatedSensor for SimulatedRadar {
    fn kind(&self) -> SensorKind {
        SensorKind::Radar
    }

    fn period_us(&self) -> u64 {
        self.period_us
    }

    fn measure(&self, truth: &TruthState, rng: &mut SimulationRng) -> MeasurementMessage {
        let (rho, phi, rho_dot) = ideal_reading(truth);
        MeasurementMessage::radar(
            rho + self.noise_r.sample(&mut rng.0),
            normalize_angle(phi + self.noise_phi.sample(&mut rng.0)),
            rho_dot + self.noise_rdot.sample(&mut rng.0),
            truth.timestamp_us,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fusion_core::messages::MeasurementData;
    use std::f64::consts::PI;

    fn truth(px: f64, py: f64, v: f64, yaw: f64) -> TruthState {
        TruthState {
            timestamp_us: 0,
            px,
            py,
            v,
            yaw,
            yaw_rate: 0.0,
        }
    }

    #[test]
    fn test_ideal_reading() {
        // Moving straight away from the sensor along the diagonal.
        let (rho, phi, rho_dot) = ideal_reading(&truth(3.0, 3.0, 2.0, PI / 4.0));
        assert_abs_diff_eq!(rho, 18.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(phi, PI / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rho_dot, 2.0, epsilon = 1e-12);

        let (_, _, rho_dot) = ideal_reading(&truth(0.0, 0.0, 5.0, 0.0));
        assert_eq!(rho_dot, 0.0);
    }

    #[test]
    fn test_bearing_stays_wrapped_behind_sensor() {
        let radar = SimulatedRadar::new(&SensorConfig {
            rate_hz: 10.0,
            noise: RadarNoise {
                std_r: 0.3,
                std_phi: 0.5,
                std_rdot: 0.3,
            },
        })
        .unwrap();
        assert_eq!(radar.kind(), SensorKind::Radar);
        assert_eq!(radar.period_us(), 100_000);
        let mut rng = SimulationRng::from_seed(11);
        let target = truth(-5.0, 1e-3, 1.0, 0.0);
        for _ in 0..500 {
            match radar.measure(&target, &mut rng).data {
                MeasurementData::Radar(z) => assert!(z[1] > -PI && z[1] <= PI),
                MeasurementData::Lidar(_) => panic!("radar produced a lidar reading"),
            }
        }
    }
}
