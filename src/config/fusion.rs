//! Параметры комплементарного фильтра и зон нечувствительности калибровки
//!
//! Оба типа создаются только через проверяющие конструкторы, поэтому
//! некорректная комбинация отвергается при установке, а не обнаруживается
//! во время фильтрации.

use core::fmt;

/// Параметры по умолчанию
pub mod defaults {
    /// Вес акселерометра в комплементарном фильтре
    pub const ACCEL_COEFF: f32 = 0.02;
    /// Вес гироскопа в комплементарном фильтре
    pub const GYRO_COEFF: f32 = 0.98;
    /// Допуск на сумму весов
    pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;
    /// Зона нечувствительности акселерометра (м/с²), ≈33 отсчета при ±2g
    pub const ACCEL_DEADZONE_MPS2: f32 = 0.02;
    /// Зона нечувствительности гироскопа (°/с), ≈1 отсчет при ±500°/с
    pub const GYRO_DEADZONE_DPS: f32 = 0.015;
}

/// Ошибки конфигурации
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Вес вне диапазона [0, 1] или не число
    WeightOutOfRange,
    /// Сумма весов фильтра отличается от 1
    WeightsNotNormalized,
    /// Зона нечувствительности не положительна или не число
    NonPositiveDeadzone,
    /// Нулевое количество выборок в плане калибровки
    EmptySampleBatch,
    /// Нулевой бюджет итераций калибровки
    ZeroIterationBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WeightOutOfRange => write!(f, "filter weight outside [0, 1]"),
            ConfigError::WeightsNotNormalized => write!(f, "filter weights do not sum to 1"),
            ConfigError::NonPositiveDeadzone => write!(f, "deadzone must be positive"),
            ConfigError::EmptySampleBatch => write!(f, "calibration sample count is zero"),
            ConfigError::ZeroIterationBudget => write!(f, "calibration iteration budget is zero"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::WeightOutOfRange => defmt::write!(fmt, "filter weight outside [0, 1]"),
            ConfigError::WeightsNotNormalized => defmt::write!(fmt, "filter weights do not sum to 1"),
            ConfigError::NonPositiveDeadzone => defmt::write!(fmt, "deadzone must be positive"),
            ConfigError::EmptySampleBatch => defmt::write!(fmt, "calibration sample count is zero"),
            ConfigError::ZeroIterationBudget => defmt::write!(fmt, "calibration iteration budget is zero"),
        }
    }
}

/// Веса комплементарного фильтра (акселерометр + гироскоп = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterWeights {
    accel: f32,
    gyro: f32,
}

impl FilterWeights {
    /// Создание пары весов с проверкой
    pub fn new(accel: f32, gyro: f32) -> Result<Self, ConfigError> {
        if !is_unit_interval(accel) || !is_unit_interval(gyro) {
            return Err(ConfigError::WeightOutOfRange);
        }
        if libm::fabsf(accel + gyro - 1.0) > defaults::WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsNotNormalized);
        }
        Ok(Self { accel, gyro })
    }

    /// Веса по доле акселерометра, гироскоп получает остаток
    pub fn from_accel(accel: f32) -> Result<Self, ConfigError> {
        Self::new(accel, 1.0 - accel)
    }

    /// Вес акселерометра
    pub fn accel(&self) -> f32 {
        self.accel
    }

    /// Вес гироскопа
    pub fn gyro(&self) -> f32 {
        self.gyro
    }
}

impl Default for FilterWeights {
    fn default() -> Self {
        Self {
            accel: defaults::ACCEL_COEFF,
            gyro: defaults::GYRO_COEFF,
        }
    }
}

/// Зоны нечувствительности калибровки в физических единицах
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadzones {
    accel_mps2: f32,
    gyro_dps: f32,
}

impl Deadzones {
    pub fn new(accel_mps2: f32, gyro_dps: f32) -> Result<Self, ConfigError> {
        if !is_positive(accel_mps2) || !is_positive(gyro_dps) {
            return Err(ConfigError::NonPositiveDeadzone);
        }
        Ok(Self { accel_mps2, gyro_dps })
    }

    /// Допуск акселерометра (м/с²)
    pub fn accel(&self) -> f32 {
        self.accel_mps2
    }

    /// Допуск гироскопа (°/с)
    pub fn gyro(&self) -> f32 {
        self.gyro_dps
    }
}

impl Default for Deadzones {
    fn default() -> Self {
        Self {
            accel_mps2: defaults::ACCEL_DEADZONE_MPS2,
            gyro_dps: defaults::GYRO_DEADZONE_DPS,
        }
    }
}

fn is_unit_interval(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = FilterWeights::default();
        assert_eq!(weights.accel(), 0.02);
        assert_eq!(weights.gyro(), 0.98);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        assert!(FilterWeights::new(0.1, 0.9).is_ok());
        assert_eq!(FilterWeights::new(0.5, 0.6), Err(ConfigError::WeightsNotNormalized));
        assert_eq!(FilterWeights::new(-0.1, 1.1), Err(ConfigError::WeightOutOfRange));
        assert_eq!(FilterWeights::new(f32::NAN, 1.0), Err(ConfigError::WeightOutOfRange));
    }

    #[test]
    fn test_weights_from_accel() {
        let weights = FilterWeights::from_accel(0.25).unwrap();
        assert_eq!(weights.gyro(), 0.75);
        assert!(FilterWeights::from_accel(1.0).is_ok());
        assert!(FilterWeights::from_accel(1.5).is_err());
    }

    #[test]
    fn test_deadzones_reject_non_positive() {
        assert!(Deadzones::new(0.05, 0.1).is_ok());
        assert_eq!(Deadzones::new(0.0, 0.1), Err(ConfigError::NonPositiveDeadzone));
        assert_eq!(Deadzones::new(0.05, -1.0), Err(ConfigError::NonPositiveDeadzone));
        assert_eq!(Deadzones::new(f32::INFINITY, 0.1), Err(ConfigError::NonPositiveDeadzone));
    }
}
