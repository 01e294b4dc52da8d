//! Источник времени для интегрирования гироскопа

use embassy_time::Instant;

/// Монотонный счетчик миллисекунд
///
/// Допускается переполнение: потребители используют только разность
/// двух отсчетов (`wrapping_sub`).
pub trait Clock {
    /// Текущее время в миллисекундах
    fn now_ms(&mut self) -> u32;
}

/// Часы на базе `embassy_time::Instant`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&mut self) -> u32 {
        // Усечение до u32 дает обычный 49-дневный цикл переполнения
        Instant::now().as_millis() as u32
    }
}

/// Прошедшее время между двумя отсчетами в секундах
///
/// Разность берется по модулю 2^32, поэтому переполнение счетчика не дает
/// скачка. Отсчет "из прошлого" (часы пошли назад) дает 0.
pub fn elapsed_seconds(since_ms: u32, now_ms: u32) -> f32 {
    let delta = now_ms.wrapping_sub(since_ms) as i32;
    if delta <= 0 {
        0.0
    } else {
        delta as f32 * 0.001
    }
}
