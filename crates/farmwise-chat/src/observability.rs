//! Process-wide tracing setup for the chat client and its front ends.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::errors::ChatError;

static INIT: OnceCell<()> = OnceCell::new();

/// Where log lines go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogOutput {
    /// Compact lines on stderr, so they never interleave with a reply on stdout.
    Stderr,
    /// One JSON object per line, appended to this file.
    JsonFile(PathBuf),
}

/// Logging settings, resolved before the subscriber is installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `warn` or `farmwise_stream=debug`.
    pub filter: String,
    pub output: LogOutput,
}

impl LogConfig {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            enabled: true,
            filter: filter.into(),
            output: LogOutput::Stderr,
        }
    }

    /// Reads overrides from the environment on top of `default_filter`.
    ///
    /// - `FARMWISE_OBSERVABILITY_ENABLED`: `false`/`off`/`0` turns logging off.
    /// - `FARMWISE_LOG_LEVEL`, then `RUST_LOG`: filter directive.
    /// - `FARMWISE_JSON_LOG_PATH`: write JSON lines to this file.
    pub fn from_env(default_filter: &str) -> Self {
        Self::from_lookup(default_filter, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        default_filter: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let filter = non_empty("FARMWISE_LOG_LEVEL")
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| default_filter.to_string());
        let mut config = Self::new(filter);
        config.enabled = non_empty("FARMWISE_OBSERVABILITY_ENABLED")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);
        if let Some(path) = non_empty("FARMWISE_JSON_LOG_PATH") {
            config.output = LogOutput::JsonFile(PathBuf::from(path));
        }
        config
    }

    /// Sends logs to a JSON-lines file instead of stderr.
    pub fn json_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = LogOutput::JsonFile(path.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, ChatError> {
        EnvFilter::try_new(&self.filter)
            .map_err(|e| ChatError::Config(format!("invalid log filter {:?}: {e}", self.filter)))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("farmwise.logs.jsonl");
    (dir, file_name)
}

/// Installs the global subscriber described by `config`, once per process.
///
/// Later calls are no-ops, even with a different config. A subscriber
/// installed by someone else is left in place.
pub fn init_observability(config: &LogConfig) -> Result<(), ChatError> {
    INIT.get_or_try_init(|| install(config)).map(|_| ())
}

fn install(config: &LogConfig) -> Result<(), ChatError> {
    if !config.enabled {
        return Ok(());
    }
    let env_filter = config.env_filter()?;
    match &config.output {
        LogOutput::JsonFile(path) => {
            let (dir, file_name) = split_log_path(path);
            std::fs::create_dir_all(dir).map_err(|e| {
                ChatError::Config(format!("cannot create log directory {}: {e}", dir.display()))
            })?;
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(tracing_appender::rolling::never(dir, file_name));
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        }
        LogOutput::Stderr => {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    }
    Ok(())
}
