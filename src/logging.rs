use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Environment variable selecting the log level, e.g. `MAZEFALL_LOG=debug`.
pub const LOG_ENV_VAR: &str = "MAZEFALL_LOG";
pub const LOG_FILE_NAME: &str = "mazefall.log";

/// Parse a level name such as `info` or `DEBUG`.
/// Returns `None` for unset, empty, or unrecognized values.
pub fn parse_level(value: Option<&str>) -> Option<Level> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Level::from_str(v).ok())
}

/// Install a file logger if [`LOG_ENV_VAR`] names a level.
///
/// The terminal is in raw mode while the game runs, so logs go to [`LOG_FILE_NAME`] in the
/// working directory. Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init_from_env() -> Option<WorkerGuard> {
    let level = parse_level(std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level)
        .init();

    tracing::info!("Logging at {} to {}", level, LOG_FILE_NAME);
    Some(guard)
}
