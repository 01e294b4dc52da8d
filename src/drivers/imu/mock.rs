//! Имитация MPU6050 на уровне регистров для тестов
//!
//! Шина отвечает на WHO_AM_I и на чтение блоков ACCEL_XOUT_H / GYRO_XOUT_H
//! заданными тройками, запоминает записи регистров. Состояние разделяется
//! через `Rc<RefCell<_>>`, чтобы тест мог менять показания, пока шиной
//! владеет драйвер.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::config::hardware::regs;
use crate::utils::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBusError {
    Nack,
}

/// Содержимое регистров имитируемого датчика
#[derive(Debug)]
pub struct MockRegisters {
    pub who_am_i: u8,
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
    pub writes: Vec<(u8, u8)>,
    pub burst_reads: usize,
    pub fail_reads: bool,
    /// Отказ после указанного числа удачных чтений блоков данных
    pub fail_after_reads: Option<usize>,
}

impl MockRegisters {
    pub fn set_sample(&mut self, accel: [i16; 3], gyro: [i16; 3]) {
        self.accel = accel;
        self.gyro = gyro;
    }
}

pub type MockHandle = Rc<RefCell<MockRegisters>>;

pub struct MockBus {
    regs: MockHandle,
}

impl MockBus {
    /// Датчик в покое, горизонтально (Z = +1g при ±2g)
    pub fn new() -> (Self, MockHandle) {
        let regs = Rc::new(RefCell::new(MockRegisters {
            who_am_i: 0x68,
            accel: [0, 0, 16384],
            gyro: [0, 0, 0],
            writes: Vec::new(),
            burst_reads: 0,
            fail_reads: false,
            fail_after_reads: None,
        }));
        (Self { regs: regs.clone() }, regs)
    }
}

fn encode(triplet: [i16; 3], buffer: &mut [u8]) {
    for (chunk, value) in buffer.chunks_mut(2).zip(triplet.iter()) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
}

impl WriteRead for MockBus {
    type Error = MockBusError;

    fn write_read(&mut self, _address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        let mut state = self.regs.borrow_mut();
        if state.fail_reads {
            return Err(MockBusError::Nack);
        }

        match bytes.first().copied() {
            Some(regs::WHO_AM_I) => buffer[0] = state.who_am_i,
            Some(reg @ (regs::ACCEL_XOUT_H | regs::GYRO_XOUT_H)) => {
                if let Some(limit) = state.fail_after_reads {
                    if state.burst_reads >= limit {
                        return Err(MockBusError::Nack);
                    }
                }
                let triplet = if reg == regs::ACCEL_XOUT_H { state.accel } else { state.gyro };
                encode(triplet, buffer);
                state.burst_reads += 1;
            }
            _ => buffer.iter_mut().for_each(|b| *b = 0),
        }
        Ok(())
    }
}

impl Write for MockBus {
    type Error = MockBusError;

    fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if let [reg, value] = bytes {
            self.regs.borrow_mut().writes.push((*reg, *value));
        }
        Ok(())
    }
}

/// Имитируемые часы (мс), общие для теста, задержки и оценщика
#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u32>>,
}

impl MockClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Задержка, сдвигающая эти же часы
    pub fn delay(&self) -> MockDelay {
        MockDelay { clock: self.clone() }
    }
}

impl Clock for MockClock {
    fn now_ms(&mut self) -> u32 {
        self.now.get()
    }
}

pub struct MockDelay {
    clock: MockClock,
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(ms);
    }
}
