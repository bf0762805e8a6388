//! Stderr logger for the CLI.
use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    filter: LevelFilter,
}

static LOGGER: once_cell::sync::OnceCell<StderrLogger> = once_cell::sync::OnceCell::new();

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".dimmed(),
        };
        let timepoint = chrono::Local::now().format("%H:%M:%S%.3f");
        eprintln!(
            "{} {tag} {} {}",
            timepoint.to_string().dimmed(),
            record.target().dimmed(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// `0` → warnings only, `1` → info, `2` → debug, `3+` → trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. Calling it again is a no-op.
pub fn init(verbosity: u8) {
    let filter = level_for(verbosity);
    let logger = LOGGER.get_or_init(|| StderrLogger { filter });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(filter);
    }
}
