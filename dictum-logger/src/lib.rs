use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::{LevelFilter, ParseError},
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "dictum.log";

/// Environment variable overriding the filter, in `RUST_LOG` syntax.
pub const ENV_FILTER_VAR: &str = "DICTUM_LOG";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid filter directive: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to create log file appender: {0}")]
    Appender(#[from] InitError),
    #[error("failed to install global subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Rotation {
    fn as_appender(self) -> tracing_appender::rolling::Rotation {
        match self {
            Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
            Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

/// Logger configuration builder.
///
/// Console and rolling-file output share one `EnvFilter`. The base level comes
/// from `level`; `DICTUM_LOG` and directives added with `filter` tune single modules.
pub struct LoggerConfig {
    level: LevelFilter,
    directives: Vec<String>,
    time_format: String,
    console: bool,
    file: bool,
    log_dir: PathBuf,
    file_prefix: String,
    rotation: Rotation,
    /// Maximum number of log files kept; the appender prunes older ones on rollover.
    max_files: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            directives: Vec::new(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            console: true,
            file: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            rotation: Rotation::default(),
            max_files: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base level. An unparsable level keeps INFO.
    pub fn level(mut self, level: &str) -> Self {
        self.level = level.parse().unwrap_or(LevelFilter::INFO);
        self
    }

    /// Adds a filter directive such as `dictum::resolver=error`.
    pub fn filter(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Timestamp format, in `chrono::format::strftime` syntax.
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self
    }

    /// Installs the global subscriber.
    ///
    /// Records emitted through the `log` facade are bridged in as well.
    /// Hold the returned `WorkerGuard`; dropping it may lose buffered file output.
    /// Returns `LoggerError::Init` if a global subscriber is already set.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggerError> {
        let filter = self.build_filter()?;
        let console_layer = self.build_console_layer();
        let (file_layer, guard) = self.build_file_layer()?;

        Registry::default()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggerError> {
        let mut filter = EnvFilter::builder()
            .with_default_directive(self.level.into())
            .with_env_var(ENV_FILTER_VAR)
            .from_env_lossy();

        for directive in &self.directives {
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }

    fn build_console_layer<S>(&self) -> Option<impl Layer<S>>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_writer(std::io::stdout)
        })
    }

    fn build_file_layer<S>(&self) -> Result<(Option<impl Layer<S>>, Option<WorkerGuard>), LoggerError>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if !self.file {
            return Ok((None, None));
        }

        let mut builder = RollingFileAppender::builder()
            .rotation(self.rotation.as_appender())
            .filename_prefix(&self.file_prefix);
        if let Some(max_files) = self.max_files {
            builder = builder.max_log_files(max_files.max(1));
        }
        let appender = builder.build(&self.log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_timer(ChronoLocal::new(self.time_format.clone()))
            .with_ansi(false)
            .with_writer(non_blocking);

        Ok((Some(layer), Some(guard)))
    }
}
