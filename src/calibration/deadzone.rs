//! Пропорциональный поиск смещений до попадания в зону нечувствительности

use nalgebra::Vector3;

use super::{
    average, first_pass, log_iteration, log_offsets, CalibrationError, CalibrationOutcome, CalibrationPlan,
    CalibrationStrategy, SampleSource,
};
use crate::utils::logging::log_info;

/// Стратегия по умолчанию
///
/// Каждая несошедшаяся ось сдвигается на остаток, деленный на свою зону
/// нечувствительности (не менее одного отсчета).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadzoneSearch;

impl DeadzoneSearch {
    pub const fn new() -> Self {
        Self
    }
}

fn step(offset: &mut Vector3<f32>, residual: &Vector3<f32>, converged: &Vector3<bool>, threshold: f32) {
    let divisor = threshold.max(1.0);
    for axis in 0..3 {
        if !converged[axis] {
            offset[axis] += residual[axis] / divisor;
        }
    }
}

impl CalibrationStrategy for DeadzoneSearch {
    fn calibrate<S: SampleSource>(
        &mut self,
        source: &mut S,
        plan: &CalibrationPlan,
        verbose: bool,
    ) -> Result<CalibrationOutcome, CalibrationError<S::Error>> {
        let mut offsets = first_pass(source, plan, verbose).map_err(CalibrationError::Transport)?;

        for iteration in 1..=plan.config.iteration_budget {
            let means = average(source, plan.config.checking_samples).map_err(CalibrationError::Transport)?;
            let residuals = means.residuals(&offsets, plan.one_g_counts);
            let mask = residuals.converged(plan);

            if verbose {
                log_iteration(iteration, &residuals);
            }

            if mask.all() {
                if verbose {
                    log_info!("Сходимость за {} итераций", iteration);
                    log_offsets(&offsets);
                }
                return Ok(CalibrationOutcome {
                    offsets,
                    iterations: iteration,
                    residuals,
                });
            }

            step(&mut offsets.accel, &residuals.accel, &mask.accel, plan.accel_threshold);
            step(&mut offsets.gyro, &residuals.gyro, &mask.gyro, plan.gyro_threshold);
        }

        Err(CalibrationError::NotConverged {
            iterations: plan.config.iteration_budget,
        })
    }
}
