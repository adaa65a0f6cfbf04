//! File logging for TUI mode
//!
//! While the terminal belongs to ratatui nothing may be written to stdout or
//! stderr, so tracing output and the `log_*!` macros both go to
//! `<data_dir>/voicequery/voicequery.log`.

use chrono::Local;
use lazy_static::lazy_static;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

/// Open the log file and write a session marker.
///
/// Returns a second handle to the same file for the tracing subscriber.
pub fn init_logger() -> anyhow::Result<File> {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "\n=== VoiceQuery session started at {} ===\n", timestamp)?;

    let tracing_handle = file.try_clone()?;
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    Ok(tracing_handle)
}

fn get_log_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("voicequery").join("voicequery.log"),
        None => PathBuf::from("voicequery.log"),
    }
}

/// Append one line; silently dropped before `init_logger`
pub fn log(level: &str, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "[{}] {}: {}", timestamp, level, message);
            let _ = file.flush();
        }
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::log("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::log("DEBUG", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::log("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::log("ERROR", &format!($($arg)*));
    };
}

pub fn get_log_path_display() -> String {
    get_log_path().display().to_string()
}
