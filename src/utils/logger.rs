//! Logger utility for application-wide logging
//!
//! Records go to a log file when one is configured; warnings and errors are
//! echoed to stderr as well. Without a log file `env_logger` writes to
//! stderr instead.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record, Level};

/// File-backed logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger writing records up to `level` into `log_file`
    pub fn new(log_file: &Path, level: LevelFilter) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    /// Appends one line to the log file
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Installs the global logger
    ///
    /// Uses a file-backed [`Logger`] when `log_file` is given and
    /// `env_logger` otherwise.
    pub fn init_global_logger(log_file: Option<&Path>, level: LevelFilter) -> io::Result<()> {
        match log_file {
            Some(path) => {
                let global_logger = Logger::new(path, level)?;
                if log::set_boxed_logger(Box::new(global_logger)).is_err() {
                    eprintln!("Warning: Global logger was already initialized");
                }
                log::set_max_level(level);
            },
            None => {
                let result = env_logger::Builder::new()
                    .filter_level(level)
                    .parse_default_env()
                    .format_timestamp(None)
                    .try_init();
                if result.is_err() {
                    eprintln!("Warning: Global logger was already initialized");
                }
            },
        }
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = self.write_line(&message);

            if record.level() <= Level::Warn {
                eprintln!("[{}] {}", record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        // Already flushing in write_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_records_at_or_above_level() {
        let path = std::env::temp_dir().join(format!("labelkit-logger-{}.log", std::process::id()));
        let logger = Logger::new(&path, LevelFilter::Info).unwrap();

        logger.log(&Record::builder().level(Level::Info).target("test").args(format_args!("kept")).build());
        logger.log(&Record::builder().level(Level::Debug).target("test").args(format_args!("dropped")).build());

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[INFO] test: kept\n");
        fs::remove_file(path).ok();
    }
}
