//! `log` backend for the browser: records go to the devtools console,
//! errors and warnings through `console.error`/`console.warn`.
//!
//! Natively (tests) no logger is installed and the macros are no-ops.

use log::Level;

#[cfg(target_arch = "wasm32")]
use log::{LevelFilter, Log, Metadata, Record};

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), &record.args().to_string());
        let value = js_sys::JsString::from(line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            Level::Info => web_sys::console::info_1(&value),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init() {}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn format_line(level: Level, target: &str, message: &str) -> String {
    let module = target.rsplit("::").next().unwrap_or(target);
    format!("[{level} {module}] {message}")
}
