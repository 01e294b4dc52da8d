//! Аппаратная конфигурация MPU6050: адреса, регистры, диапазоны измерения

/// Адреса I2C устройств
pub mod i2c_addresses {
    /// Адрес MPU6050 (AD0 = LOW)
    pub const MPU6050_ADDR: u8 = 0x68;

    /// Альтернативный адрес MPU6050 (AD0 = HIGH)
    pub const MPU6050_ADDR_ALT: u8 = 0x69;
}

/// Регистры MPU6050
pub mod regs {
    pub const SMPLRT_DIV: u8 = 0x19;      // Делитель частоты выборки
    pub const CONFIG: u8 = 0x1A;          // Синхронизация кадра и DLPF
    pub const GYRO_CONFIG: u8 = 0x1B;     // Конфигурация гироскопа
    pub const ACCEL_CONFIG: u8 = 0x1C;    // Конфигурация акселерометра
    pub const ACCEL_XOUT_H: u8 = 0x3B;    // Начало блока данных акселерометра
    pub const GYRO_XOUT_H: u8 = 0x43;     // Начало блока данных гироскопа
    pub const PWR_MGMT_1: u8 = 0x6B;      // Управление питанием
    pub const WHO_AM_I: u8 = 0x75;        // Идентификатор устройства
}

/// Значения регистров при начальной настройке
pub mod setup {
    /// Без деления частоты выборки
    pub const SAMPLE_RATE_DIVIDER: u8 = 0x00;
    /// DLPF выключен, FSYNC не используется
    pub const DLPF_DISABLED: u8 = 0x00;
    /// Выход из сна, тактирование от PLL гироскопа X
    pub const WAKE_PLL_GYRO_X: u8 = 0x01;
    /// Допустимые ответы WHO_AM_I (MPU6050 и распространенные клоны)
    pub const KNOWN_DEVICE_IDS: [u8; 3] = [0x68, 0x72, 0x98];
}

/// Стандартное ускорение свободного падения (м/с²)
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Диапазон измерения акселерометра
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelRange {
    /// ±2g
    #[default]
    G2 = 0x00,
    /// ±4g
    G4 = 0x08,
    /// ±8g
    G8 = 0x10,
    /// ±16g
    G16 = 0x18,
}

impl AccelRange {
    /// Отсчетов АЦП на 1g
    pub const fn lsb_per_g(self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }

    /// Значение регистра ACCEL_CONFIG
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Диапазон измерения гироскопа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GyroRange {
    /// ±250°/s
    Deg250 = 0x00,
    /// ±500°/s
    #[default]
    Deg500 = 0x08,
    /// ±1000°/s
    Deg1000 = 0x10,
    /// ±2000°/s
    Deg2000 = 0x18,
}

impl GyroRange {
    /// Отсчетов АЦП на 1°/с (2^16 / полный размах)
    pub const fn lsb_per_dps(self) -> f32 {
        match self {
            GyroRange::Deg250 => 131.072,
            GyroRange::Deg500 => 65.536,
            GyroRange::Deg1000 => 32.768,
            GyroRange::Deg2000 => 16.384,
        }
    }

    /// Значение регистра GYRO_CONFIG
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Масштабные коэффициенты для текущих диапазонов
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    /// Отсчетов на 1g
    pub accel_lsb_per_g: f32,
    /// Отсчетов на 1°/с
    pub gyro_lsb_per_dps: f32,
}

impl ScaleFactors {
    pub const fn from_ranges(accel: AccelRange, gyro: GyroRange) -> Self {
        Self {
            accel_lsb_per_g: accel.lsb_per_g(),
            gyro_lsb_per_dps: gyro.lsb_per_dps(),
        }
    }

    /// Перевод ускорения (м/с²) в отсчеты АЦП
    pub fn accel_counts(&self, mps2: f32) -> f32 {
        mps2 / STANDARD_GRAVITY * self.accel_lsb_per_g
    }

    /// Перевод угловой скорости (°/с) в отсчеты АЦП
    pub fn gyro_counts(&self, dps: f32) -> f32 {
        dps * self.gyro_lsb_per_dps
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::from_ranges(AccelRange::default(), GyroRange::default())
    }
}
