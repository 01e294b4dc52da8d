//! Алгоритмы объединения данных с датчиков (sensor fusion)

use nalgebra::Vector3;

use crate::config::fusion::FilterWeights;
use crate::data::{AngleState, PhysicalSample};
use crate::utils::clock::elapsed_seconds;
use crate::utils::math::{angle_average, atan2_degrees, safe_sqrt, wrap_degrees};

/// Состояние оценщика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    Uninitialized,
    Running,
}

/// Комплементарный фильтр крена/тангажа с интегрированием гироскопа
///
/// Курс (Z) не имеет опоры без магнитометра, поэтому отфильтрованный
/// курс равен интегралу гироскопа по Z.
#[derive(Debug, Clone)]
pub struct AngleEstimator {
    state: EstimatorState,
    /// Текущие углы
    angles: AngleState,
    /// Время последнего обновления для интегрирования (мс)
    last_update_ms: u32,
    /// Шаг интегрирования последнего обновления (с)
    last_dt: f32,
}

impl AngleEstimator {
    /// Создание нового оценщика (не инициализирован)
    pub const fn new() -> Self {
        Self {
            state: EstimatorState::Uninitialized,
            angles: AngleState {
                accel: Vector3::new(0.0, 0.0, 0.0),
                gyro: Vector3::new(0.0, 0.0, 0.0),
                fused: Vector3::new(0.0, 0.0, 0.0),
            },
            last_update_ms: 0,
            last_dt: 0.0,
        }
    }

    /// Обнуление углов и запуск интегрирования с момента `now_ms`
    pub fn initialize(&mut self, now_ms: u32) {
        self.angles = AngleState::default();
        self.last_update_ms = now_ms;
        self.last_dt = 0.0;
        self.state = EstimatorState::Running;
    }

    /// Перенос начала интегрирования на `now_ms` без изменения углов
    pub fn rebase(&mut self, now_ms: u32) {
        self.last_update_ms = now_ms;
    }

    /// Начальный курс для интеграла гироскопа Z (и отфильтрованного курса)
    pub fn seed_heading(&mut self, yaw_deg: f32) {
        let yaw = wrap_degrees(yaw_deg);
        self.angles.gyro.z = yaw;
        self.angles.fused.z = yaw;
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EstimatorState::Running
    }

    pub fn angles(&self) -> &AngleState {
        &self.angles
    }

    /// Шаг интегрирования последнего обновления (с)
    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    /// Обновление фильтра новыми данными
    ///
    /// Возвращает `None`, если оценщик не инициализирован.
    pub fn update(&mut self, sample: &PhysicalSample, weights: &FilterWeights, now_ms: u32) -> Option<AngleState> {
        if !self.is_running() {
            return None;
        }

        let accel = accel_angles(&sample.accel);
        let rate = &sample.gyro;
        let dt = elapsed_seconds(self.last_update_ms, now_ms);

        // Интегрирование угловых скоростей гироскопа
        let gyro = &mut self.angles.gyro;
        gyro.x = wrap_degrees(gyro.x + rate.x * dt);
        gyro.y = wrap_degrees(gyro.y + rate.y * dt);
        gyro.z = wrap_degrees(gyro.z + rate.z * dt);

        // Комплементарная фильтрация для крена и тангажа
        let fused = &mut self.angles.fused;
        fused.x = angle_average(weights.accel(), accel.x, weights.gyro(), fused.x + rate.x * dt);
        fused.y = angle_average(weights.accel(), accel.y, weights.gyro(), fused.y + rate.y * dt);
        // Для рыскания используем только гироскоп
        fused.z = self.angles.gyro.z;

        self.angles.accel = accel;
        self.last_update_ms = now_ms;
        self.last_dt = dt;

        Some(self.angles)
    }

    /// Приравнивание отфильтрованных крена/тангажа к углам акселерометра
    ///
    /// Используется после калибровки, когда интеграл гироскопа еще не
    /// накопил истории.
    pub fn align_to_accel(&mut self) {
        self.angles.fused.x = self.angles.accel.x;
        self.angles.fused.y = self.angles.accel.y;
    }
}

impl Default for AngleEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Крен и тангаж по вектору ускорения (градусы), Z = 0
///
/// Справедливо только без заметного линейного ускорения тела.
pub fn accel_angles(accel: &Vector3<f32>) -> Vector3<f32> {
    let roll = atan2_degrees(accel.y, safe_sqrt(accel.z * accel.z + accel.x * accel.x));
    let pitch = -atan2_degrees(accel.x, safe_sqrt(accel.z * accel.z + accel.y * accel.y));
    Vector3::new(wrap_degrees(roll), wrap_degrees(pitch), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(accel: [f32; 3], gyro: [f32; 3]) -> PhysicalSample {
        PhysicalSample {
            accel: Vector3::from(accel),
            gyro: Vector3::from(gyro),
        }
    }

    #[test]
    fn test_accel_angles_level() {
        let angles = accel_angles(&Vector3::new(0.0, 0.0, 9.81));
        assert!(angles.x.abs() < 1e-5);
        assert!(angles.y.abs() < 1e-5);
    }

    #[test]
    fn test_accel_angles_tilted() {
        // Крен 45°: g поровну между Y и Z
        let angles = accel_angles(&Vector3::new(0.0, 1.0, 1.0));
        assert!((angles.x - 45.0).abs() < 1e-3);
        // Нос вниз: положительный X дает отрицательный тангаж
        let angles = accel_angles(&Vector3::new(1.0, 0.0, 0.0));
        assert!((angles.y + 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_accel_angles_free_fall_is_zero() {
        let angles = accel_angles(&Vector3::zeros());
        assert_eq!(angles, Vector3::zeros());
    }

    #[test]
    fn test_update_requires_initialize() {
        let mut estimator = AngleEstimator::new();
        let result = estimator.update(&PhysicalSample::default(), &FilterWeights::default(), 10);
        assert!(result.is_none());
        assert_eq!(estimator.state(), EstimatorState::Uninitialized);
    }

    #[test]
    fn test_gyro_integration_and_blend() {
        let mut estimator = AngleEstimator::new();
        estimator.initialize(1000);

        let angles = estimator
            .update(&sample([0.0, 0.0, 9.81], [10.0, 0.0, 0.0]), &FilterWeights::default(), 2000)
            .unwrap();

        assert!((estimator.last_dt() - 1.0).abs() < 1e-6);
        assert!((angles.gyro.x - 10.0).abs() < 1e-4);
        // 2% акселерометра (0°) + 98% прогноза гироскопа (10°)
        assert!((angles.fused.x - 9.8).abs() < 1e-4);
        assert!(angles.fused.x != angles.gyro.x && angles.fused.x != angles.accel.x);
    }

    #[test]
    fn test_yaw_follows_gyro() {
        let mut estimator = AngleEstimator::new();
        estimator.initialize(0);
        estimator.seed_heading(170.0);

        let angles = estimator
            .update(&sample([0.0, 0.0, 9.81], [0.0, 0.0, 20.0]), &FilterWeights::default(), 1000)
            .unwrap();

        // 170° + 20° переходит через границу
        assert!((angles.gyro.z - -170.0).abs() < 1e-4);
        assert_eq!(angles.fused.z, angles.gyro.z);
    }

    #[test]
    fn test_accel_only_weight() {
        let mut estimator = AngleEstimator::new();
        estimator.initialize(0);
        let weights = FilterWeights::new(1.0, 0.0).unwrap();

        let angles = estimator
            .update(&sample([0.0, 1.0, 1.0], [50.0, 0.0, 0.0]), &weights, 500)
            .unwrap();
        assert!((angles.fused.x - angles.accel.x).abs() < 1e-4);
    }

    #[test]
    fn test_rebase_skips_elapsed_interval() {
        let mut estimator = AngleEstimator::new();
        estimator.initialize(0);
        estimator.rebase(10_000);

        let angles = estimator
            .update(&sample([0.0, 0.0, 9.81], [5.0, 0.0, 5.0]), &FilterWeights::default(), 10_100)
            .unwrap();

        assert!((estimator.last_dt() - 0.1).abs() < 1e-6);
        assert!((angles.gyro.x - 0.5).abs() < 1e-4);
        assert!((angles.gyro.z - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_align_to_accel() {
        let mut estimator = AngleEstimator::new();
        estimator.initialize(0);
        estimator.update(&sample([0.0, 1.0, 1.0], [0.0, 0.0, 0.0]), &FilterWeights::default(), 10);
        assert!(estimator.angles().fused.x < 45.0);

        estimator.align_to_accel();
        assert!((estimator.angles().fused.x - 45.0).abs() < 1e-3);
    }
}
