//! План калибровки смещений нуля

use super::fusion::ConfigError;

/// Параметры калибровки по умолчанию
pub mod defaults {
    /// Отбрасываемые выборки (установление шины и фильтров датчика)
    pub const DISCARDED_MEASURES: u32 = 100;
    /// Выборки для первичного усреднения
    pub const CALIBRATION_MEASURES: u32 = 5000;
    /// Выборки на одну проверочную итерацию
    pub const CHECKING_MEASURES: u32 = 50;
    /// Пауза между выборками (мс)
    pub const SETTLE_DELAY_MS: u32 = 2;
    /// Максимум итераций уточнения
    pub const ITERATION_BUDGET: u32 = 200;
    /// Делитель первого приближения смещений акселерометра
    pub const ACCEL_PREOFFSET_DIVISOR: f32 = 8.0;
    /// Делитель первого приближения смещений гироскопа
    pub const GYRO_PREOFFSET_DIVISOR: f32 = 4.0;
}

/// Поведение при исчерпании бюджета итераций
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Сообщить об ошибке, смещения не меняются
    #[default]
    SingleShot,
    /// Перезапустить процедуру не более `n` раз
    Retry(u32),
    /// Перезапускать до сходимости
    RetryForever,
}

impl RetryPolicy {
    /// Разрешен ли перезапуск после `attempts` неудачных попыток
    pub fn allows_restart(&self, attempts: u32) -> bool {
        match *self {
            RetryPolicy::SingleShot => false,
            RetryPolicy::Retry(max_restarts) => attempts <= max_restarts,
            RetryPolicy::RetryForever => true,
        }
    }
}

/// Параметры процедуры калибровки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    pub discarded_samples: u32,
    pub averaging_samples: u32,
    pub checking_samples: u32,
    pub settle_delay_ms: u32,
    pub iteration_budget: u32,
    pub retry: RetryPolicy,
}

impl CalibrationConfig {
    pub fn with_discarded_samples(mut self, count: u32) -> Self {
        self.discarded_samples = count;
        self
    }

    pub fn with_averaging_samples(mut self, count: u32) -> Self {
        self.averaging_samples = count;
        self
    }

    pub fn with_checking_samples(mut self, count: u32) -> Self {
        self.checking_samples = count;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u32) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    pub fn with_iteration_budget(mut self, budget: u32) -> Self {
        self.iteration_budget = budget;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Проверка плана; отбрасываемых выборок может быть ноль
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.averaging_samples == 0 || self.checking_samples == 0 {
            return Err(ConfigError::EmptySampleBatch);
        }
        if self.iteration_budget == 0 {
            return Err(ConfigError::ZeroIterationBudget);
        }
        Ok(self)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            discarded_samples: defaults::DISCARDED_MEASURES,
            averaging_samples: defaults::CALIBRATION_MEASURES,
            checking_samples: defaults::CHECKING_MEASURES,
            settle_delay_ms: defaults::SETTLE_DELAY_MS,
            iteration_budget: defaults::ITERATION_BUDGET,
            retry: RetryPolicy::SingleShot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        assert!(!RetryPolicy::SingleShot.allows_restart(1));
        assert!(RetryPolicy::Retry(2).allows_restart(1));
        assert!(RetryPolicy::Retry(2).allows_restart(2));
        assert!(!RetryPolicy::Retry(2).allows_restart(3));
        assert!(RetryPolicy::RetryForever.allows_restart(u32::MAX));
    }

    #[test]
    fn test_validate_rejects_empty_batches() {
        let config = CalibrationConfig::default().with_checking_samples(0);
        assert_eq!(config.validate(), Err(ConfigError::EmptySampleBatch));

        let config = CalibrationConfig::default().with_iteration_budget(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroIterationBudget));

        let config = CalibrationConfig::default().with_discarded_samples(0);
        assert!(config.validate().is_ok());
    }
}
