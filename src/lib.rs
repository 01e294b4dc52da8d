#![cfg_attr(not(test), no_std)]

//! Оценка наклона твердого тела по 6-осевому IMU MPU6050
//!
//! Ядро библиотеки: перевод сырых отсчетов в физические единицы, углы по
//! акселерометру и гироскопу, комплементарный фильтр и итеративная
//! калибровка смещений нуля. Шина I2C, часы и задержки передаются снаружи.
//!
//! ```ignore
//! let imu = Mpu6050::new(i2c, i2c_addresses::MPU6050_ADDR);
//! let mut engine = TiltEngine::new(imu, embassy_time::Delay, SystemClock);
//! engine.initialize()?;
//! engine.calibrate(true)?;
//! loop {
//!     let angles = engine.execute()?;
//! }
//! ```

pub mod utils;

pub mod calibration;
pub mod config;
pub mod data;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod sensors;

pub use calibration::{
    AdaptivePiSearch, CalibrationError, CalibrationOutcome, CalibrationPlan, CalibrationStrategy, DeadzoneSearch,
    SampleSource,
};
pub use config::calibration::{CalibrationConfig, RetryPolicy};
pub use config::fusion::{ConfigError, Deadzones, FilterWeights};
pub use config::hardware::{i2c_addresses, AccelRange, GyroRange, ScaleFactors};
pub use data::{AngleState, PhysicalSample, RawSample, SensorOffsets};
pub use drivers::imu::Mpu6050;
pub use engine::TiltEngine;
pub use error::Error;
pub use sensors::{AngleEstimator, UnitConverter};
pub use utils::clock::{Clock, SystemClock};
