//! Оценщик наклона: чтение, перевод в единицы, фильтрация и калибровка
//!
//! Однопоточный и блокирующий: `execute` и `calibrate` занимают вызывающего
//! на время транзакций шины и пауз между выборками.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use nalgebra::Vector3;

use crate::calibration::{
    average, discard, CalibrationError, CalibrationOutcome, CalibrationPlan, CalibrationStrategy, DeadzoneSearch,
    SampleSource,
};
use crate::config::calibration::CalibrationConfig;
use crate::config::fusion::{Deadzones, FilterWeights};
use crate::config::hardware::{AccelRange, GyroRange, ScaleFactors};
use crate::data::{AngleState, PhysicalSample, RawSample, SensorOffsets};
use crate::drivers::imu::Mpu6050;
use crate::error::Error;
use crate::sensors::{AngleEstimator, UnitConverter};
use crate::utils::clock::Clock;
use crate::utils::logging::{log_error, log_info, log_warn};

/// Выборки с датчика с паузой на установление после каждого чтения
struct SettledSource<'a, I2C, D> {
    imu: &'a mut Mpu6050<I2C>,
    delay: &'a mut D,
    settle_ms: u32,
}

impl<'a, I2C, D, E> SampleSource for SettledSource<'a, I2C, D>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
{
    type Error = Error<E>;

    fn next_sample(&mut self) -> Result<RawSample, Self::Error> {
        let sample = self.imu.read_sample()?;
        self.delay.delay_ms(self.settle_ms);
        Ok(sample)
    }
}

/// Оценщик наклона по MPU6050
pub struct TiltEngine<I2C, D, C> {
    imu: Mpu6050<I2C>,
    delay: D,
    clock: C,

    /// Запрошенные диапазоны измерения
    accel_range: AccelRange,
    gyro_range: GyroRange,

    converter: UnitConverter,
    offsets: SensorOffsets,
    weights: FilterWeights,
    deadzones: Deadzones,
    calibration: CalibrationConfig,
    estimator: AngleEstimator,

    /// Последние прочитанные данные
    raw: RawSample,
    physical: PhysicalSample,
}

impl<I2C, D, C, E> TiltEngine<I2C, D, C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    C: Clock,
{
    pub fn new(imu: Mpu6050<I2C>, delay: D, clock: C) -> Self {
        let accel_range = imu.accel_range();
        let gyro_range = imu.gyro_range();

        Self {
            converter: UnitConverter::new(imu.scale_factors()),
            imu,
            delay,
            clock,
            accel_range,
            gyro_range,
            offsets: SensorOffsets::default(),
            weights: FilterWeights::default(),
            deadzones: Deadzones::default(),
            calibration: CalibrationConfig::default(),
            estimator: AngleEstimator::new(),
            raw: RawSample::default(),
            physical: PhysicalSample::default(),
        }
    }

    /// Диапазоны, применяемые при следующем `initialize`
    pub fn with_ranges(mut self, accel_range: AccelRange, gyro_range: GyroRange) -> Self {
        self.accel_range = accel_range;
        self.gyro_range = gyro_range;
        self
    }

    /// Настройка датчика и запуск оценщика
    ///
    /// Углы обнуляются, текущее время становится началом интегрирования.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        self.imu.configure(self.accel_range, self.gyro_range)?;
        self.converter = UnitConverter::new(self.imu.scale_factors());
        self.reset_angles();
        Ok(())
    }

    /// Повторный запуск оценщика без обращения к датчику
    pub fn reset_angles(&mut self) {
        let now = self.clock.now_ms();
        self.estimator.initialize(now);
    }

    /// Начальный курс (градусы) для интеграла гироскопа Z
    pub fn seed_heading(&mut self, yaw_deg: f32) {
        self.estimator.seed_heading(yaw_deg);
    }

    /// Один цикл: чтение, перевод в единицы, обновление углов
    pub fn execute(&mut self) -> Result<AngleState, Error<E>> {
        if !self.estimator.is_running() {
            return Err(Error::NotInitialized);
        }

        let raw = self.imu.read_sample()?;
        let now = self.clock.now_ms();

        self.raw = raw;
        self.physical = self.converter.convert(&raw, &self.offsets);
        self.estimator
            .update(&self.physical, &self.weights, now)
            .ok_or(Error::NotInitialized)
    }

    /// Калибровка стратегией по умолчанию ([`DeadzoneSearch`])
    pub fn calibrate(&mut self, verbose: bool) -> Result<CalibrationOutcome, Error<E>> {
        self.calibrate_with(&mut DeadzoneSearch, verbose)
    }

    /// Калибровка заданной стратегией с политикой повторов из конфигурации
    ///
    /// При успехе смещения применяются, выполняется один цикл `execute`, и
    /// отфильтрованные крен/тангаж приравниваются к углам акселерометра.
    /// При неудаче смещения не меняются.
    pub fn calibrate_with<S: CalibrationStrategy>(
        &mut self,
        strategy: &mut S,
        verbose: bool,
    ) -> Result<CalibrationOutcome, Error<E>> {
        if !self.estimator.is_running() {
            return Err(Error::NotInitialized);
        }

        let config = self.calibration;
        let plan = CalibrationPlan::new(config, &self.converter.scales(), &self.deadzones);
        let mut attempts = 0u32;

        if verbose {
            log_info!("Калибровка MPU6050, не двигайте устройство...");
        }

        loop {
            attempts = attempts.saturating_add(1);

            let mut source = SettledSource {
                imu: &mut self.imu,
                delay: &mut self.delay,
                settle_ms: config.settle_delay_ms,
            };

            match strategy.calibrate(&mut source, &plan, verbose) {
                Ok(outcome) => {
                    let previous = self.offsets;
                    self.offsets = outcome.offsets;
                    // Время калибровки не интегрируется
                    let now = self.clock.now_ms();
                    self.estimator.rebase(now);
                    if let Err(e) = self.execute() {
                        log_error!("Ошибка чтения после калибровки, смещения не изменены");
                        self.offsets = previous;
                        return Err(e);
                    }
                    self.estimator.align_to_accel();
                    if verbose {
                        log_info!("Калибровка завершена за {} попыток", attempts);
                    }
                    return Ok(outcome);
                }
                Err(CalibrationError::Transport(e)) => {
                    log_error!("Ошибка чтения при калибровке");
                    return Err(e);
                }
                Err(CalibrationError::NotConverged { iterations }) => {
                    if config.retry.allows_restart(attempts) {
                        log_warn!("Калибровка не сошлась за {} итераций, повтор", iterations);
                        continue;
                    }
                    log_error!("Калибровка не сошлась ({} попыток)", attempts);
                    return Err(Error::NotConverged { iterations, attempts });
                }
            }
        }
    }

    /// Калибровка только гироскопа: смещения равны средним показаниям
    ///
    /// Смещения акселерометра не меняются.
    pub fn calibrate_gyro_only(&mut self, verbose: bool) -> Result<Vector3<f32>, Error<E>> {
        if !self.estimator.is_running() {
            return Err(Error::NotInitialized);
        }

        let config = self.calibration;
        let mut source = SettledSource {
            imu: &mut self.imu,
            delay: &mut self.delay,
            settle_ms: config.settle_delay_ms,
        };

        if verbose {
            log_info!("Калибровка гироскопа по {} выборкам", config.averaging_samples);
        }
        discard(&mut source, config.discarded_samples)?;
        let means = average(&mut source, config.averaging_samples)?;

        self.offsets.gyro = means.gyro;
        if verbose {
            log_info!("Смещения гироскопа: {} {} {}", means.gyro.x, means.gyro.y, means.gyro.z);
        }
        Ok(means.gyro)
    }

    /// Установка весов фильтра с проверкой
    pub fn set_filter_coefficients(&mut self, accel: f32, gyro: f32) -> Result<(), Error<E>> {
        self.weights = FilterWeights::new(accel, gyro)?;
        Ok(())
    }

    pub fn set_calibration_config(&mut self, config: CalibrationConfig) -> Result<(), Error<E>> {
        self.calibration = config.validate()?;
        Ok(())
    }

    /// Освобождение драйвера, задержки и часов
    pub fn release(self) -> (Mpu6050<I2C>, D, C) {
        (self.imu, self.delay, self.clock)
    }
}

impl<I2C, D, C> TiltEngine<I2C, D, C> {
    pub fn is_running(&self) -> bool {
        self.estimator.is_running()
    }

    pub fn raw_accel(&self) -> Vector3<i16> {
        self.raw.accel
    }

    pub fn raw_gyro(&self) -> Vector3<i16> {
        self.raw.gyro
    }

    /// Ускорение, м/с²
    pub fn accel(&self) -> Vector3<f32> {
        self.physical.accel
    }

    /// Угловая скорость, °/с
    pub fn gyro(&self) -> Vector3<f32> {
        self.physical.gyro
    }

    pub fn accel_angles(&self) -> Vector3<f32> {
        self.estimator.angles().accel
    }

    pub fn gyro_angles(&self) -> Vector3<f32> {
        self.estimator.angles().gyro
    }

    /// Отфильтрованные углы
    pub fn angles(&self) -> Vector3<f32> {
        self.estimator.angles().fused
    }

    pub fn angle_state(&self) -> &AngleState {
        self.estimator.angles()
    }

    pub fn offsets(&self) -> &SensorOffsets {
        &self.offsets
    }

    pub fn filter_weights(&self) -> FilterWeights {
        self.weights
    }

    pub fn deadzones(&self) -> Deadzones {
        self.deadzones
    }

    pub fn calibration_config(&self) -> &CalibrationConfig {
        &self.calibration
    }

    pub fn scale_factors(&self) -> ScaleFactors {
        self.converter.scales()
    }

    pub fn set_offsets(&mut self, offsets: SensorOffsets) {
        self.offsets = offsets;
    }

    pub fn set_accel_offsets(&mut self, offsets: Vector3<f32>) {
        self.offsets.accel = offsets;
    }

    pub fn set_gyro_offsets(&mut self, offsets: Vector3<f32>) {
        self.offsets.gyro = offsets;
    }

    pub fn set_filter_weights(&mut self, weights: FilterWeights) {
        self.weights = weights;
    }

    pub fn set_deadzones(&mut self, deadzones: Deadzones) {
        self.deadzones = deadzones;
    }

}
