// src/data/mod.rs
use nalgebra::Vector3;

/// Сырые данные с MPU6050 (отсчеты АЦП, LSB)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    pub accel: Vector3<i16>, // Ускорение X/Y/Z
    pub gyro: Vector3<i16>,  // Угловая скорость X/Y/Z
}

impl RawSample {
    pub fn new(accel: [i16; 3], gyro: [i16; 3]) -> Self {
        Self {
            accel: Vector3::from(accel),
            gyro: Vector3::from(gyro),
        }
    }
}

impl Default for RawSample {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

/// Данные в физических единицах
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalSample {
    pub accel: Vector3<f32>, // Ускорение в м/с²
    pub gyro: Vector3<f32>,  // Угловая скорость в °/с
}

impl Default for PhysicalSample {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

/// Смещения нуля в отсчетах АЦП
///
/// Вычитаются из сырых значений до масштабирования, сами не масштабируются.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorOffsets {
    pub accel: Vector3<f32>,
    pub gyro: Vector3<f32>,
}

impl SensorOffsets {
    pub fn new(accel: [f32; 3], gyro: [f32; 3]) -> Self {
        Self {
            accel: Vector3::from(accel),
            gyro: Vector3::from(gyro),
        }
    }
}

impl Default for SensorOffsets {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

/// Оценка ориентации (градусы, X = крен, Y = тангаж, Z = рыскание)
///
/// Все сохраняемые углы нормализованы в (-180°, 180°].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleState {
    /// Мгновенные углы по акселерометру; Z всегда 0 (курс не наблюдаем)
    pub accel: Vector3<f32>,
    /// Интегрированные углы гироскопа
    pub gyro: Vector3<f32>,
    /// Углы комплементарного фильтра
    pub fused: Vector3<f32>,
}

impl Default for AngleState {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
            fused: Vector3::zeros(),
        }
    }
}
