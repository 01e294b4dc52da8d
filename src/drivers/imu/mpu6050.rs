//! Драйвер MPU6050: чтение сырых отсчетов и начальная настройка
//!
//! Каждое чтение - одна транзакция write-read: адрес начального регистра,
//! повторный START и 6 байт данных (старший байт первым). Ошибки шины
//! возвращаются вызывающему без повторов.

use embedded_hal::blocking::i2c::{Write, WriteRead};
use nalgebra::Vector3;

use crate::config::hardware::{i2c_addresses, regs, setup, AccelRange, GyroRange, ScaleFactors};
use crate::data::RawSample;
use crate::error::Error;
use crate::utils::logging::{log_error, log_info};

/// Драйвер MPU6050, владеющий шиной I2C
pub struct Mpu6050<I2C> {
    /// Шина I2C
    i2c: I2C,
    /// Адрес устройства
    addr: u8,
    /// Диапазон акселерометра
    accel_range: AccelRange,
    /// Диапазон гироскопа
    gyro_range: GyroRange,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Создание нового экземпляра драйвера
    ///
    /// Адрес, отличный от 0x68/0x69, заменяется на 0x68.
    pub fn new(i2c: I2C, addr: u8) -> Self {
        let addr = match addr {
            i2c_addresses::MPU6050_ADDR | i2c_addresses::MPU6050_ADDR_ALT => addr,
            _ => i2c_addresses::MPU6050_ADDR,
        };

        Self {
            i2c,
            addr,
            accel_range: AccelRange::default(),
            gyro_range: GyroRange::default(),
        }
    }

    /// Настройка датчика: проверка WHO_AM_I, диапазоны, выход из сна
    pub fn configure(&mut self, accel_range: AccelRange, gyro_range: GyroRange) -> Result<(), Error<E>> {
        // Проверка идентификатора устройства
        let who_am_i = self.read_register(regs::WHO_AM_I)?;
        if !setup::KNOWN_DEVICE_IDS.contains(&who_am_i) {
            log_error!("Неверный ID устройства: {}", who_am_i);
            return Err(Error::InvalidDevice(who_am_i));
        }

        // Частота выборки без деления, DLPF выключен
        self.write_register(regs::SMPLRT_DIV, setup::SAMPLE_RATE_DIVIDER)?;
        self.write_register(regs::CONFIG, setup::DLPF_DISABLED)?;

        // Диапазоны измерения (самотестирование выключено)
        self.write_register(regs::GYRO_CONFIG, gyro_range.bits())?;
        self.gyro_range = gyro_range;
        self.write_register(regs::ACCEL_CONFIG, accel_range.bits())?;
        self.accel_range = accel_range;

        // Выход из режима сна, тактирование от PLL гироскопа X
        self.write_register(regs::PWR_MGMT_1, setup::WAKE_PLL_GYRO_X)?;

        log_info!("MPU6050 (0x{:x}) инициализирован успешно", self.addr);
        Ok(())
    }

    /// Чтение тройки акселерометра
    pub fn read_accel(&mut self) -> Result<Vector3<i16>, Error<E>> {
        self.read_triplet(regs::ACCEL_XOUT_H)
    }

    /// Чтение тройки гироскопа
    pub fn read_gyro(&mut self) -> Result<Vector3<i16>, Error<E>> {
        self.read_triplet(regs::GYRO_XOUT_H)
    }

    /// Чтение акселерометра и гироскопа (две транзакции)
    pub fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        let accel = self.read_accel()?;
        let gyro = self.read_gyro()?;
        Ok(RawSample { accel, gyro })
    }

    /// Адрес устройства на шине
    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn accel_range(&self) -> AccelRange {
        self.accel_range
    }

    pub fn gyro_range(&self) -> GyroRange {
        self.gyro_range
    }

    /// Масштабные коэффициенты для текущих диапазонов
    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors::from_ranges(self.accel_range, self.gyro_range)
    }

    /// Освобождение шины
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Три 16-битных значения со знаком (big-endian), начиная с `start_reg`
    fn read_triplet(&mut self, start_reg: u8) -> Result<Vector3<i16>, Error<E>> {
        let mut buf = [0u8; 6];
        self.read_registers(start_reg, &mut buf)?;

        Ok(Vector3::new(
            i16::from_be_bytes([buf[0], buf[1]]),
            i16::from_be_bytes([buf[2], buf[3]]),
            i16::from_be_bytes([buf[4], buf[5]]),
        ))
    }

    /// Чтение одного регистра
    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.read_registers(reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Запись в регистр
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c.write(self.addr, &[reg, value]).map_err(Error::Transport)
    }

    /// Чтение нескольких регистров подряд
    fn read_registers(&mut self, start_reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write_read(self.addr, &[start_reg], buf)
            .map_err(Error::Transport)
    }
}
