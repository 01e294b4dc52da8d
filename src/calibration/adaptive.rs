//! Поиск смещений PI-регулятором с затухающим коэффициентом усиления

use nalgebra::Vector3;

use super::{
    average, first_pass, log_iteration, log_offsets, CalibrationError, CalibrationOutcome, CalibrationPlan,
    CalibrationStrategy, SampleSource,
};
use crate::utils::logging::log_info;

/// Коэффициенты по умолчанию
pub mod defaults {
    pub const KP: f32 = 0.5;
    pub const KI: f32 = 0.1;
    /// Множитель усиления на каждой итерации
    pub const GAIN_DECAY: f32 = 0.95;
    /// Нижняя граница усиления
    pub const GAIN_FLOOR: f32 = 0.25;
}

/// PI-регулятор на каждую ось
///
/// Выход регулятора добавляется к смещению оси. Сошедшиеся оси не
/// изменяются. Общий коэффициент усиления уменьшается с каждой итерацией,
/// подавляя колебания вокруг зоны нечувствительности.
#[derive(Debug, Clone, Copy)]
pub struct AdaptivePiSearch {
    kp: f32,
    ki: f32,
    gain_decay: f32,
    gain_floor: f32,
}

impl AdaptivePiSearch {
    pub const fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            gain_decay: defaults::GAIN_DECAY,
            gain_floor: defaults::GAIN_FLOOR,
        }
    }

    pub fn with_gain_decay(mut self, decay: f32, floor: f32) -> Self {
        self.gain_decay = decay;
        self.gain_floor = floor;
        self
    }
}

impl Default for AdaptivePiSearch {
    fn default() -> Self {
        Self::new(defaults::KP, defaults::KI)
    }
}

/// Состояние регуляторов одной группы осей
#[derive(Default)]
struct AxisIntegrators {
    integral: Vector3<f32>,
}

impl AxisIntegrators {
    fn update(
        &mut self,
        pi: &AdaptivePiSearch,
        gain: f32,
        offset: &mut Vector3<f32>,
        residual: &Vector3<f32>,
        converged: &Vector3<bool>,
    ) {
        for axis in 0..3 {
            if converged[axis] {
                continue;
            }
            self.integral[axis] += residual[axis];
            offset[axis] += gain * (pi.kp * residual[axis] + pi.ki * self.integral[axis]);
        }
    }
}

impl CalibrationStrategy for AdaptivePiSearch {
    fn calibrate<S: SampleSource>(
        &mut self,
        source: &mut S,
        plan: &CalibrationPlan,
        verbose: bool,
    ) -> Result<CalibrationOutcome, CalibrationError<S::Error>> {
        let mut offsets = first_pass(source, plan, verbose).map_err(CalibrationError::Transport)?;

        // Интеграторы живут только в пределах одной попытки
        let mut accel_pi = AxisIntegrators::default();
        let mut gyro_pi = AxisIntegrators::default();
        let mut gain = 1.0_f32;

        for iteration in 1..=plan.config.iteration_budget {
            let means = average(source, plan.config.checking_samples).map_err(CalibrationError::Transport)?;
            let residuals = means.residuals(&offsets, plan.one_g_counts);
            let mask = residuals.converged(plan);

            if verbose {
                log_iteration(iteration, &residuals);
            }

            if mask.all() {
                if verbose {
                    log_info!("Сходимость за {} итераций (усиление {})", iteration, gain);
                    log_offsets(&offsets);
                }
                return Ok(CalibrationOutcome {
                    offsets,
                    iterations: iteration,
                    residuals,
                });
            }

            accel_pi.update(self, gain, &mut offsets.accel, &residuals.accel, &mask.accel);
            gyro_pi.update(self, gain, &mut offsets.gyro, &residuals.gyro, &mask.gyro);

            gain = (gain * self.gain_decay).max(self.gain_floor);
        }

        Err(CalibrationError::NotConverged {
            iterations: plan.config.iteration_budget,
        })
    }
}
