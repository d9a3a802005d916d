//! Error types for loading controller configuration.
//!
//! The per-tick control code has no fallible paths; everything that can go
//! wrong at runtime degrades to a no-op. Configuration is the exception: a
//! broken `assets/controller.toml` is reported through [`ConfigError`] and the
//! compiled defaults stay in place.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read, or does not exist at all.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::config::ControllerConfig`].
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value parsed fine but breaks an invariant of the controller.
    InvalidValue {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl ConfigError {
    /// `true` when the file is simply absent, which is not worth a warning.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "could not parse {}: {}", path.display(), source)
            }
            ConfigError::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "'{}' = {} is invalid, expected {}", name, value, expected),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
