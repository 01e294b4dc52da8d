//! Ошибки ядра оценки наклона

use crate::config::fusion::ConfigError;

/// Ошибки работы с MPU6050 и оценщиком углов
///
/// `E` - тип ошибки шины I2C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error<E> {
    /// Ошибка транзакции на шине (в том числе неполное чтение)
    Transport(E),
    /// Неверный идентификатор устройства
    InvalidDevice(u8),
    /// `execute`/`calibrate` вызваны до `initialize`
    NotInitialized,
    /// Калибровка исчерпала бюджет итераций без сходимости всех осей
    NotConverged {
        /// Итераций в последней попытке
        iterations: u32,
        /// Всего попыток с учетом перезапусков
        attempts: u32,
    },
    /// Некорректные параметры
    InvalidConfiguration(ConfigError),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(error: ConfigError) -> Self {
        Error::InvalidConfiguration(error)
    }
}

// Реализация Format для defmt
#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Transport(e) => defmt::write!(fmt, "I2C error: {}", e),
            Error::InvalidDevice(id) => defmt::write!(fmt, "Invalid device ID: {:#x}", id),
            Error::NotInitialized => defmt::write!(fmt, "Estimator not initialized"),
            Error::NotConverged { iterations, attempts } => defmt::write!(
                fmt,
                "Calibration not converged after {} iterations ({} attempts)",
                iterations,
                attempts
            ),
            Error::InvalidConfiguration(e) => defmt::write!(fmt, "Configuration error: {}", e),
        }
    }
}
