//! Shared plumbing for the WAL throughput benchmark.
//!
//! Right now this is only logging: every binary in the workspace routes the `log`
//! facade through [`initialize_logger`] so worker diagnostics end up in the same
//! place, tagged with the thread that produced them.

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Handle,
};
use std::path::{Path, PathBuf};

/// `{T}` is the thread name, so `writer-3` / `reader-7` show up on each line.
const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:<5})} [{T}] {t} - {m}{n}";

const STDERR_APPENDER: &str = "stderr";
const FILE_APPENDER: &str = "logfile";

/// Where log records go and how much of it reaches the console.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Threshold for the stderr appender.
    pub level: LevelFilter,
    /// Optional log file. It receives everything down to `Debug`, regardless of
    /// `level`, which helps when chasing lock errors after a run.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    pub fn stderr(level: LevelFilter) -> Self {
        Self { level, file: None }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    fn root_level(&self) -> LevelFilter {
        match self.file {
            Some(_) => self.level.max(LevelFilter::Debug),
            None => self.level,
        }
    }
}

/// Build the log4rs configuration without installing it.
pub fn logger_config(settings: &LogSettings) -> Result<Config> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(settings.level)))
            .build(STDERR_APPENDER, Box::new(stderr)),
    );
    let mut root = Root::builder().appender(STDERR_APPENDER);

    if let Some(path) = &settings.file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
            .build(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder = builder.appender(Appender::builder().build(FILE_APPENDER, Box::new(logfile)));
        root = root.appender(FILE_APPENDER);
    }

    builder
        .build(root.build(settings.root_level()))
        .map_err(|e| anyhow!("invalid logging configuration: {e}"))
}

/// Install the process-wide logger. Can only succeed once per process.
///
/// The returned handle can swap the configuration at runtime, e.g. to raise the
/// level while investigating a run.
pub fn initialize_logger(settings: &LogSettings) -> Result<Handle> {
    let config = logger_config(settings)?;
    log4rs::init_config(config).map_err(|e| anyhow!("failed to install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_only_config_builds() {
        let settings = LogSettings::stderr(LevelFilter::Warn);
        assert!(logger_config(&settings).is_ok());
        assert_eq!(settings.root_level(), LevelFilter::Warn);
    }

    #[test]
    fn file_appender_lowers_root_level_to_debug() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings::stderr(LevelFilter::Info).with_file(dir.path().join("bench.log"));

        let config = logger_config(&settings).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert!(dir.path().join("bench.log").exists());
    }

    #[test]
    fn trace_level_is_kept_with_file() {
        let settings = LogSettings::stderr(LevelFilter::Trace).with_file("unused.log");
        assert_eq!(settings.root_level(), LevelFilter::Trace);
    }
}
