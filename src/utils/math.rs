//! Математические функции и утилиты для работы с углами в градусах

use core::f32::consts::PI;

/// Перевод радиан в градусы
pub const RAD_TO_DEG: f32 = 180.0 / PI;

/// Нормализация угла в диапазон (-180°, 180°]
///
/// Функция идемпотентна: повторная нормализация не меняет результат.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Кратчайшая угловая разница `to - from` в градусах
#[inline]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    wrap_degrees(to - from)
}

/// Взвешенное среднее двух углов с учетом перехода через ±180°
///
/// `b` сначала выражается как `a` плюс кратчайшая разница между ними, затем
/// применяются веса. Сумма весов должна быть равна 1.
#[inline]
pub fn angle_average(wa: f32, a: f32, wb: f32, b: f32) -> f32 {
    wrap_degrees(wa * a + wb * (a + angle_difference(a, b)))
}

/// atan2 в градусах; для (0, 0) возвращает 0
///
/// Нулевой вектор ускорения (свободное падение или отказ датчика) не должен
/// давать NaN на платформах, где atan2(0, 0) не определен.
#[inline]
pub fn atan2_degrees(y: f32, x: f32) -> f32 {
    if y == 0.0 && x == 0.0 {
        0.0
    } else {
        libm::atan2f(y, x) * RAD_TO_DEG
    }
}

/// Квадратный корень с защитой от отрицательных значений
#[inline]
pub fn safe_sqrt(value: f32) -> f32 {
    if value <= 0.0 {
        0.0
    } else {
        libm::sqrtf(value)
    }
}
