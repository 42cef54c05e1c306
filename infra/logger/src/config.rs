use crate::LoggerError;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_FILES: usize = 10;

/// Stream the console layer writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    /// Keeps stdout free for command output (CLI binaries).
    Stderr,
}

#[derive(Debug)]
pub struct LoggerConfig {
    pub(crate) console: Option<ConsoleStream>,
    pub(crate) show_target: bool,
    pub(crate) path: Option<PathBuf>,
    pub(crate) level: LevelFilter,
    pub(crate) rotation: Rotation,
    pub(crate) max_files: usize,
    pub(crate) json: bool,
    pub(crate) env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: Some(ConsoleStream::Stdout),
            show_target: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

impl LoggerConfig {
    pub(crate) fn validate(&self, name: &str) -> Result<(), LoggerError> {
        if name.trim().is_empty() {
            return Err(invalid("Logger name cannot be empty"));
        }
        if self.max_files == 0 {
            return Err(invalid("max_files must be greater than zero"));
        }
        if self.console.is_none() && self.path.is_none() {
            return Err(invalid("No logging output enabled. Enable the console or a log directory."));
        }
        Ok(())
    }

    /// `RUST_LOG` wins over the programmatic filter, which wins over the plain level.
    pub(crate) fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match (&self.env_filter, std::env::var_os(EnvFilter::DEFAULT_ENV)) {
            (Some(filter), None) => builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            }),
            _ => Ok(builder.from_env_lossy()),
        }
    }
}

fn invalid(message: &'static str) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}
