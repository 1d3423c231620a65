//! Tracing subscriber setup.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "enabled")]
    pub enable: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: Format,
    /// Full filter directive, e.g. `ontology_index=trace,warn`. Takes
    /// precedence over both `level` and `RUST_LOG`.
    #[serde(default)]
    pub override_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::default(),
            format: Format::default(),
            override_filter: None,
        }
    }
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Compact,
    Pretty,
    Json,
}

fn filter_for(settings: &LoggerSettings) -> Result<EnvFilter> {
    match settings.override_filter.as_deref() {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|err| Error::Logger(err.to_string()))
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(settings.level.to_string()))),
    }
}

/// Installs the global tracing subscriber described by `settings`.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Fails on an invalid filter directive or when a global subscriber is
/// already installed.
pub fn init(settings: &LoggerSettings) -> Result<()> {
    if !settings.enable {
        return Ok(());
    }

    let registry = tracing_subscriber::registry().with(filter_for(settings)?);
    let installed = match settings.format {
        Format::Compact => registry.with(layer_fmt::layer().compact()).try_init(),
        Format::Pretty => registry.with(layer_fmt::layer().pretty()).try_init(),
        Format::Json => registry.with(layer_fmt::layer().json()).try_init(),
    };
    installed.map_err(|err| Error::Logger(err.to_string()))
}
