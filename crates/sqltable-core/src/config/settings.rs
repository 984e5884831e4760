//! Configuration settings

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqltable_data::{CsvOptions, ImportOptions, Verbosity};
use thiserror::Error;
use tracing::debug;

use crate::directive::Driver;

/// File looked up by [`Settings::discover`]
pub const CONFIG_FILE_NAME: &str = "sqltable.toml";

/// Errors reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// What to do when a directive declares a non-UTF-8 `:encoding:`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncodingPolicy {
    /// The directive fails
    #[default]
    Strict,
    /// The option is ignored and a warning is reported
    Warn,
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub directive: DirectiveSettings,
    pub import: ImportSettings,
    pub csv: CsvSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        settings.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    /// Load the nearest `sqltable.toml` at or above `dir`, or defaults
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match find_config_file(dir) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.csv.to_options().map(|_| ())
    }
}

/// Walk up from `dir` looking for [`CONFIG_FILE_NAME`]
pub fn find_config_file(dir: impl AsRef<Path>) -> Option<PathBuf> {
    dir.as_ref()
        .ancestors()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Defaults for directive options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveSettings {
    /// Driver used when a directive has no `:driver:`
    pub driver: Driver,
    /// Source used when a directive has no `:source:`
    pub source: String,
    /// Resolve sources against this directory instead of the document's
    pub base_dir: Option<PathBuf>,
    pub encoding: EncodingPolicy,
}

impl Default for DirectiveSettings {
    fn default() -> Self {
        Self {
            driver: Driver::Xlsx,
            source: "data.xlsx".to_string(),
            base_dir: None,
            encoding: EncodingPolicy::Strict,
        }
    }
}

impl DirectiveSettings {
    /// Directory sources are resolved against for a document in `doc_dir`
    pub fn resolve_base_dir(&self, doc_dir: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) => doc_dir.join(base),
            None => doc_dir.to_path_buf(),
        }
    }
}

/// Sheet importer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportSettings {
    /// Zero-based row holding column names
    pub header_row: usize,
    pub verbosity: Verbosity,
}

impl ImportSettings {
    pub fn to_options(&self) -> ImportOptions {
        ImportOptions {
            header_row: self.header_row,
        }
    }
}

/// CSV reader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSettings {
    pub delimiter: char,
    pub quote: char,
    /// Trim whitespace around fields
    pub trim: bool,
    /// Allow rows of differing lengths
    pub flexible: bool,
}

impl Default for CsvSettings {
    fn default() -> Self {
        let options = CsvOptions::default();
        Self {
            delimiter: char::from(options.delimiter),
            quote: char::from(options.quote),
            trim: options.trim,
            flexible: options.flexible,
        }
    }
}

impl CsvSettings {
    /// Reader options; delimiter and quote must be single ASCII characters
    pub fn to_options(&self) -> Result<CsvOptions, ConfigError> {
        let ascii = |name: &str, c: char| {
            u8::try_from(c)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| ConfigError::Invalid(format!("csv.{name} must be ASCII, got {c:?}")))
        };
        Ok(CsvOptions {
            delimiter: ascii("delimiter", self.delimiter)?,
            quote: ascii("quote", self.quote)?,
            trim: self.trim,
            flexible: self.flexible,
        })
    }
}

/// Logging settings for the command line tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. "info" or "sqltable_data=debug"
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
