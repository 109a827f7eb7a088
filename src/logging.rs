//! Console and log file output
//!
//! Records go to stdout, coloured by level when stdout is a terminal. A log
//! file, given on the command line or in the configuration, additionally
//! receives every record with a timestamp and its module.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;

/// How much knot reports, raised by repeating `-v`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_occurrences(occurrences: u8) -> Self {
        match occurrences {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Installs the global logger
///
/// # Errors
/// Returns an error if `log_file` cannot be opened for appending or a
/// logger is already installed
pub fn init_logger(verbosity: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let level = LevelFilter::from(verbosity);
    let mut logger = Dispatch::new()
        .level(level)
        // lopdf reports every object it writes at debug level
        .level_for("lopdf", LevelFilter::Warn)
        .chain(terminal_sink());

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        logger = logger.chain(file_sink().chain(file));
    }

    logger.apply().context("Failed to install the logger")?;
    log::debug!("Logging at {verbosity:?}");
    Ok(())
}

fn terminal_sink() -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::White)
        .trace(Color::BrightBlack);
    let coloured = atty::is(atty::Stream::Stdout);

    Dispatch::new()
        .format(move |out, message, record| {
            if coloured {
                out.finish(format_args!(
                    "\x1B[{}m{}\x1B[0m",
                    colours.get_color(&record.level()).to_fg_str(),
                    message
                ))
            } else {
                out.finish(format_args!("{message}"))
            }
        })
        .chain(std::io::stdout())
}

fn file_sink() -> Dispatch {
    Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "[{} {} {}] {}",
            chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            record.level(),
            record.target(),
            message
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_verbose_flags() {
        assert_eq!(LogLevel::from_occurrences(0), LogLevel::Info);
        assert_eq!(LogLevel::from_occurrences(1), LogLevel::Debug);
        assert_eq!(LogLevel::from_occurrences(2), LogLevel::Trace);
        assert_eq!(LogLevel::from_occurrences(9), LogLevel::Trace);
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::Info);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::Debug);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
    }
}
