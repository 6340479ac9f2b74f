//! Stderr logging for the glyphcache binary.
//!
//! Routes every `log::info!()` etc. from the workspace crates to stderr.
//! The level comes from `--log-level`, then the `GLYPHCACHE_LOG`
//! environment variable (off, error, warn, info, debug, trace or 0-5), and
//! defaults to warnings only.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Metadata, Record};

/// Environment variable holding the default log level.
pub const LOG_ENV: &str = "GLYPHCACHE_LOG";

/// Parse a level name or a digit from 0 (off) to 5 (trace).
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    let value = value.trim();
    match value.parse::<u8>() {
        Ok(0) => Some(LevelFilter::Off),
        Ok(1) => Some(LevelFilter::Error),
        Ok(2) => Some(LevelFilter::Warn),
        Ok(3) => Some(LevelFilter::Info),
        Ok(4) => Some(LevelFilter::Debug),
        Ok(5) => Some(LevelFilter::Trace),
        Ok(_) => None,
        Err(_) => value.parse::<LevelFilter>().ok(),
    }
}

fn level_from_env() -> Option<LevelFilter> {
    std::env::var(LOG_ENV).ok().and_then(|v| parse_level(&v))
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{}] [{:<5}] [{}] {}",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Install the stderr logger. `cli_level` wins over the environment.
///
/// Calling this twice keeps the first logger and only updates the level.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let level = cli_level
        .or_else(level_from_env)
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level);
}
