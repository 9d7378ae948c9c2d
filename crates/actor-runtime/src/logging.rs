/// Centralized logging for the monitor core
///
/// The macros format their arguments and hand them to [`emit`], which writes
/// to the browser console on WASM and to stderr on native. Callers do not
/// need `web_sys` in scope.
///
/// Debug, info and warn are compiled only in debug builds; error is always
/// compiled.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn tag(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

#[doc(hidden)]
pub fn emit(level: Level, message: fmt::Arguments<'_>) {
    #[cfg(target_arch = "wasm32")]
    {
        let text = wasm_bindgen::JsValue::from_str(&message.to_string());
        match level {
            Level::Debug => web_sys::console::log_1(&text),
            Level::Info => web_sys::console::info_1(&text),
            Level::Warn => web_sys::console::warn_1(&text),
            Level::Error => web_sys::console::error_1(&text),
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[{}] {}", level.tag(), message);
}

/// Log debug-level message (only in debug builds)
///
/// # Example
/// ```
/// use actor_runtime::actor_debug;
/// actor_debug!("MonitorActor: {:?} → {:?}", "Disconnected", "Connecting");
/// ```
#[macro_export]
macro_rules! actor_debug {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::logging::emit($crate::logging::Level::Debug, format_args!($($arg)*));
        }
    };
}

/// Log info-level message (only in debug builds)
///
/// Use for session lifecycle and user-facing events
#[macro_export]
macro_rules! actor_info {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::logging::emit($crate::logging::Level::Info, format_args!($($arg)*));
        }
    };
}

/// Log warning-level message (only in debug builds)
///
/// Use for recoverable errors and unexpected conditions
#[macro_export]
macro_rules! actor_warn {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::logging::emit($crate::logging::Level::Warn, format_args!($($arg)*));
        }
    };
}

/// Log error-level message (always compiled, even in release)
#[macro_export]
macro_rules! actor_error {
    ($($arg:tt)*) => {
        {
            $crate::logging::emit($crate::logging::Level::Error, format_args!($($arg)*));
        }
    };
}
