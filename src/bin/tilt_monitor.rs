#![no_std]
#![no_main]

//! Демонстрационная прошивка: углы наклона MPU6050 на Raspberry Pi Pico

use embassy_executor::Spawner;
use embassy_rp::i2c::{self, Config as I2cConfig};
use embassy_time::{Delay, Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use mpu6050_tilt::{i2c_addresses, Mpu6050, SystemClock, TiltEngine};

/// Частота опроса IMU (Гц)
const IMU_SAMPLE_RATE_HZ: u64 = 100;
/// Вывод углов каждые N циклов
const REPORT_DIVIDER: u32 = 10;

/// Точка входа в программу
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    defmt::info!("=== Монитор наклона MPU6050 ===");

    // Инициализация I2C для IMU
    let i2c = {
        let sda = p.PIN_4; // GPIO4 - SDA
        let scl = p.PIN_5; // GPIO5 - SCL

        let mut config = I2cConfig::default();
        config.frequency = 400_000; // 400 kHz для быстрого обмена

        i2c::I2c::new_blocking(p.I2C0, scl, sda, config)
    };

    let imu = Mpu6050::new(i2c, i2c_addresses::MPU6050_ADDR);
    let mut engine = TiltEngine::new(imu, Delay, SystemClock);

    if let Err(e) = engine.initialize() {
        defmt::error!("Ошибка инициализации MPU6050: {}", e);
        return;
    }

    defmt::info!("Калибровка IMU, не двигайте устройство...");
    match engine.calibrate(true) {
        Ok(outcome) => defmt::info!("Калибровка завершена за {} итераций", outcome.iterations),
        Err(e) => defmt::warn!("Калибровка не выполнена: {}", e),
    }

    let mut ticker = Ticker::every(Duration::from_hz(IMU_SAMPLE_RATE_HZ));
    let mut report_counter = 0u32;

    loop {
        ticker.next().await;

        match engine.execute() {
            Ok(angles) => {
                report_counter += 1;
                if report_counter >= REPORT_DIVIDER {
                    report_counter = 0;
                    defmt::info!(
                        "roll={}° pitch={}° yaw={}°",
                        angles.fused.x,
                        angles.fused.y,
                        angles.fused.z
                    );
                }
            }
            Err(e) => {
                defmt::error!("Ошибка чтения IMU: {}", e);
            }
        }
    }
}
