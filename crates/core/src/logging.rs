//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - `defmt` feature: forwards to defmt (embedded)
//! - `tracing` feature: forwards to tracing (host runtime)
//! - Unit tests: uses println!
//! - Otherwise: no-op (arguments are still type-checked)
//!
//! Arguments must stay defmt-compatible: log primitives and `&str`, and use
//! `as_str()` for enums instead of `{:?}`.

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);

        #[cfg(all(test, not(feature = "defmt"), not(feature = "tracing")))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt", feature = "tracing")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);

        #[cfg(all(test, not(feature = "defmt"), not(feature = "tracing")))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt", feature = "tracing")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);

        #[cfg(all(test, not(feature = "defmt"), not(feature = "tracing")))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt", feature = "tracing")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);

        #[cfg(all(test, not(feature = "defmt"), not(feature = "tracing")))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(not(any(test, feature = "defmt", feature = "tracing")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
