//! Configuration
//!
//! Settings are read from `sqltable.toml`, found by walking up from the
//! document's directory:
//!
//! ```toml
//! [directive]
//! driver = "xlsx"
//! source = "data/book.xlsx"
//! encoding = "warn"
//!
//! [import]
//! header_row = 0
//! verbosity = "verbose"
//!
//! [csv]
//! delimiter = ";"
//! trim = true
//!
//! [log]
//! level = "debug"
//! ```
//!
//! Every section and key is optional.

mod settings;

#[cfg(test)]
mod tests;

pub use settings::{
    find_config_file, ConfigError, CsvSettings, DirectiveSettings, EncodingPolicy, ImportSettings,
    LogSettings, Settings, CONFIG_FILE_NAME,
};
