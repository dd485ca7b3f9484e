//! Logger setup for the demo binary and anything else embedding the crate.

/// Installs a [`fern`] dispatcher that writes to stderr.
///
/// Each line is `[timestamp LEVEL target] message`. Calling this twice returns
/// the [`log::SetLoggerError`] from the second attempt.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

/// Parses a level name such as `debug` or `warn`, falling back to `Info`.
pub fn level_from_str(s: &str) -> log::LevelFilter {
    s.trim().parse().unwrap_or(log::LevelFilter::Info)
}
