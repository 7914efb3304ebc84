//! Minimal stderr logger for the `log` facade

use std::sync::OnceLock;

struct StderrLogger {
    level: log::LevelFilter,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("{}:{} -- {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let logger = LOGGER.get_or_init(|| StderrLogger { level });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
