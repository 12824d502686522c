use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Appends timestamped records to a file. Used instead of `env_logger`
/// when the board runs with a log file configured.
pub struct FileLogger {
    file: Mutex<std::fs::File>,
    level: LevelFilter,
}

impl FileLogger {
    pub fn new(log_file: &Path, level: LevelFilter) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(
                file,
                "{} [{}] {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the global logger. `debug` overrides the configured level.
pub fn init(config: &LoggingConfig, debug: bool) -> Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        config
            .level
            .parse::<LevelFilter>()
            .map_err(|_| Error::ConfigError(format!("unknown log level: {}", config.level)))?
    };

    match &config.file {
        Some(path) => {
            let logger = FileLogger::new(path, level)?;
            log::set_boxed_logger(Box::new(logger))
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            log::set_max_level(level);
        }
        None => {
            env_logger::Builder::from_default_env()
                .filter_level(level)
                .try_init()
                .map_err(|e| Error::ConfigError(e.to_string()))?;
        }
    }
    Ok(())
}
