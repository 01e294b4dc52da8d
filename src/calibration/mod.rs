//! Калибровка смещений нуля MPU6050
//!
//! Датчик должен лежать неподвижно и горизонтально: цель калибровки - нулевые
//! ускорения по X/Y, +1g по Z и нулевые угловые скорости.
//!
//! Общая часть всех стратегий: отбрасывание выборок прогрева, усреднение и
//! первое приближение смещений. Уточнение смещений выполняет стратегия
//! ([`DeadzoneSearch`] или [`AdaptivePiSearch`]).

pub mod adaptive;
pub mod deadzone;

pub use adaptive::AdaptivePiSearch;
pub use deadzone::DeadzoneSearch;

use nalgebra::Vector3;
use num_traits::Float;

use crate::config::calibration::{defaults, CalibrationConfig};
use crate::config::fusion::Deadzones;
use crate::config::hardware::ScaleFactors;
use crate::data::{RawSample, SensorOffsets};
use crate::utils::logging::{log_debug, log_info};

/// Поток сырых выборок с паузой на установление между чтениями
pub trait SampleSource {
    type Error;

    fn next_sample(&mut self) -> Result<RawSample, Self::Error>;
}

/// План калибровки в отсчетах АЦП
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPlan {
    pub config: CalibrationConfig,
    /// Отсчетов на 1g (цель для оси Z акселерометра)
    pub one_g_counts: f32,
    /// Зона нечувствительности акселерометра в отсчетах
    pub accel_threshold: f32,
    /// Зона нечувствительности гироскопа в отсчетах
    pub gyro_threshold: f32,
}

impl CalibrationPlan {
    pub fn new(config: CalibrationConfig, scales: &ScaleFactors, deadzones: &Deadzones) -> Self {
        Self {
            config,
            one_g_counts: scales.accel_lsb_per_g,
            accel_threshold: scales.accel_counts(deadzones.accel()),
            gyro_threshold: scales.gyro_counts(deadzones.gyro()),
        }
    }
}

/// Остаток после вычитания смещений (отсчеты); Z акселерометра - относительно +1g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residuals {
    pub accel: Vector3<f32>,
    pub gyro: Vector3<f32>,
}

impl Residuals {
    /// Признак сходимости каждой оси
    pub fn converged(&self, plan: &CalibrationPlan) -> AxisMask {
        AxisMask {
            accel: self.accel.map(|r| within(r, plan.accel_threshold)),
            gyro: self.gyro.map(|r| within(r, plan.gyro_threshold)),
        }
    }
}

impl Default for Residuals {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

fn within<T: Float>(residual: T, threshold: T) -> bool {
    residual.abs() <= threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMask {
    pub accel: Vector3<bool>,
    pub gyro: Vector3<bool>,
}

impl AxisMask {
    pub fn all(&self) -> bool {
        self.accel.iter().chain(self.gyro.iter()).all(|&c| c)
    }
}

/// Результат успешной калибровки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOutcome {
    pub offsets: SensorOffsets,
    /// Проверочных итераций до сходимости
    pub iterations: u32,
    /// Остатки последней итерации
    pub residuals: Residuals,
}

/// Ошибки одной попытки калибровки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError<E> {
    /// Ошибка чтения выборки, попытка прервана
    Transport(E),
    /// Бюджет итераций исчерпан
    NotConverged { iterations: u32 },
}

/// Стратегия уточнения смещений
///
/// Одна попытка: прогрев, первое приближение, итерации до сходимости или
/// исчерпания бюджета. Повторные попытки выполняет вызывающая сторона.
pub trait CalibrationStrategy {
    fn calibrate<S: SampleSource>(
        &mut self,
        source: &mut S,
        plan: &CalibrationPlan,
        verbose: bool,
    ) -> Result<CalibrationOutcome, CalibrationError<S::Error>>;
}

/// Средние значения сырых каналов
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub accel: Vector3<f32>,
    pub gyro: Vector3<f32>,
}

impl ChannelMeans {
    /// Остаток относительно текущих смещений
    pub fn residuals(&self, offsets: &SensorOffsets, one_g_counts: f32) -> Residuals {
        let mut accel = self.accel - offsets.accel;
        accel.z -= one_g_counts;
        Residuals {
            accel,
            gyro: self.gyro - offsets.gyro,
        }
    }
}

/// Чтение и отбрасывание `count` выборок
pub fn discard<S: SampleSource>(source: &mut S, count: u32) -> Result<(), S::Error> {
    for _ in 0..count {
        source.next_sample()?;
    }
    Ok(())
}

/// Усреднение `count` выборок по каждому каналу
pub fn average<S: SampleSource>(source: &mut S, count: u32) -> Result<ChannelMeans, S::Error> {
    let mut accel_sum = Vector3::<i64>::zeros();
    let mut gyro_sum = Vector3::<i64>::zeros();

    for _ in 0..count {
        let sample = source.next_sample()?;
        accel_sum += sample.accel.map(i64::from);
        gyro_sum += sample.gyro.map(i64::from);
    }

    let n = count.max(1) as f32;
    Ok(ChannelMeans {
        accel: accel_sum.map(|s| s as f32 / n),
        gyro: gyro_sum.map(|s| s as f32 / n),
    })
}

/// Прогрев и первое приближение смещений
///
/// Делители начинают поиск рядом с истинным смещением, но не в нем,
/// чтобы избежать перерегулирования.
pub fn first_pass<S: SampleSource>(
    source: &mut S,
    plan: &CalibrationPlan,
    verbose: bool,
) -> Result<SensorOffsets, S::Error> {
    if verbose {
        log_info!("Калибровка: отбрасываем {} выборок", plan.config.discarded_samples);
    }
    discard(source, plan.config.discarded_samples)?;

    if verbose {
        log_info!("Калибровка: усреднение по {} выборкам", plan.config.averaging_samples);
    }
    let means = average(source, plan.config.averaging_samples)?;

    let mut accel = means.accel / defaults::ACCEL_PREOFFSET_DIVISOR;
    accel.z = (means.accel.z - plan.one_g_counts) / defaults::ACCEL_PREOFFSET_DIVISOR;
    let gyro = means.gyro / defaults::GYRO_PREOFFSET_DIVISOR;

    Ok(SensorOffsets { accel, gyro })
}

pub(crate) fn log_iteration(iteration: u32, residuals: &Residuals) {
    log_debug!(
        "Итерация {}: accel {} {} {} gyro {} {} {}",
        iteration,
        residuals.accel.x,
        residuals.accel.y,
        residuals.accel.z,
        residuals.gyro.x,
        residuals.gyro.y,
        residuals.gyro.z
    );
}

pub(crate) fn log_offsets(offsets: &SensorOffsets) {
    log_info!(
        "Смещения: accel {} {} {} gyro {} {} {}",
        offsets.accel.x,
        offsets.accel.y,
        offsets.accel.z,
        offsets.gyro.x,
        offsets.gyro.y,
        offsets.gyro.z
    );
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_plan_thresholds_in_counts() {
        let plan = quick_plan();
        assert_eq!(plan.one_g_counts, 16384.0);
        assert!((plan.accel_threshold - 33.41).abs() < 0.01);
        assert!((plan.gyro_threshold - 0.983).abs() < 0.001);
    }

    #[test]
    fn test_average_is_exact_for_constant_source() {
        let mut source = BiasedSource::new([120, -80, 200], [30, -12, 5]);
        let means = average(&mut source, 10).unwrap();
        assert_eq!(means.accel, Vector3::new(120.0, -80.0, 16584.0));
        assert_eq!(means.gyro, Vector3::new(30.0, -12.0, 5.0));
        assert_eq!(source.reads, 10);
    }

    #[test]
    fn test_first_pass_offsets() {
        let mut source = BiasedSource::new([120, -80, 200], [32, -12, 4]);
        let plan = quick_plan();
        let offsets = first_pass(&mut source, &plan, false).unwrap();

        assert_eq!(source.reads, 25);
        assert_eq!(offsets.accel, Vector3::new(15.0, -10.0, 25.0));
        assert_eq!(offsets.gyro, Vector3::new(8.0, -3.0, 1.0));
    }

    #[test]
    fn test_residuals_measure_z_against_one_g() {
        let means = ChannelMeans {
            accel: Vector3::new(10.0, 0.0, 16400.0),
            gyro: Vector3::new(1.0, 2.0, 3.0),
        };
        let residuals = means.residuals(&SensorOffsets::default(), 16384.0);
        assert_eq!(residuals.accel, Vector3::new(10.0, 0.0, 16.0));

        let plan = quick_plan();
        let mask = residuals.converged(&plan);
        assert!(mask.accel.iter().all(|&c| c));
        assert!(!mask.gyro.x);
        assert!(!mask.all());
    }

    #[test]
    fn test_transport_error_aborts_batch() {
        let mut source = BiasedSource::new([0, 0, 0], [0, 0, 0]);
        source.fail_after = Some(3);
        assert_eq!(discard(&mut source, 5), Err("bus failure"));
        assert_eq!(source.reads, 3);
    }
}
