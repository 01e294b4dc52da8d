//! Макросы журналирования
//!
//! - feature `defmt`: вывод через defmt (RTT на целевой плате)
//! - тесты на хосте: `println!` / `eprintln!`
//! - иначе: ничего не выводится, аргументы только проверяются компилятором
//!
//! Строки формата ограничены `{}` с примитивными аргументами, чтобы они были
//! валидны для обоих бэкендов.

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

pub(crate) use {log_debug, log_error, log_info, log_warn};
