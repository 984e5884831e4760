//! Tests for settings parsing and discovery

use super::*;
use crate::directive::Driver;
use sqltable_data::Verbosity;

mod parsing_tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.directive.driver, Driver::Xlsx);
        assert_eq!(settings.directive.source, "data.xlsx");
        assert_eq!(settings.directive.encoding, EncodingPolicy::Strict);
        assert_eq!(settings.import.header_row, 0);
        assert_eq!(settings.import.verbosity, Verbosity::Normal);
        assert_eq!(settings.csv.delimiter, ',');
        assert!(settings.csv.trim);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_empty_config_is_default() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[directive]
driver = "sqlite"
source = "reports.db"
base_dir = "data"
encoding = "warn"

[import]
header_row = 2
verbosity = "quiet"

[csv]
delimiter = ";"
flexible = true

[log]
level = "sqltable_data=debug"
"#;
        let settings = Settings::from_toml_str(toml).unwrap();

        assert_eq!(settings.directive.driver, Driver::Sqlite);
        assert_eq!(settings.directive.source, "reports.db");
        assert_eq!(settings.directive.encoding, EncodingPolicy::Warn);
        assert_eq!(settings.import.to_options().header_row, 2);
        assert_eq!(settings.import.verbosity, Verbosity::Quiet);
        assert_eq!(settings.csv.delimiter, ';');
        assert!(settings.csv.flexible);
        // untouched keys keep their defaults
        assert_eq!(settings.csv.quote, '"');
        assert_eq!(settings.log.level, "sqltable_data=debug");
    }

    #[test]
    fn test_partial_section() {
        let settings = Settings::from_toml_str("[directive]\nsource = \"book.ods\"\n").unwrap();
        assert_eq!(settings.directive.source, "book.ods");
        assert_eq!(settings.directive.driver, Driver::Xlsx);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::from_toml_str("[directive]\ndriver = \"oracle\"\n").is_err());
        assert!(Settings::from_toml_str("[import]\nverbosity = \"loud\"\n").is_err());
        assert!(Settings::from_toml_str("[import]\nheader_row = -1\n").is_err());
    }

    #[test]
    fn test_csv_options_must_be_ascii() {
        let settings = Settings::from_toml_str("[csv]\ndelimiter = \"§\"\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

        let options = CsvSettings {
            delimiter: '\t',
            ..Default::default()
        }
        .to_options()
        .unwrap();
        assert_eq!(options.delimiter, b'\t');
    }

    #[test]
    fn test_resolve_base_dir() {
        let doc_dir = std::path::Path::new("/docs/guide");
        let mut directive = DirectiveSettings::default();
        assert_eq!(directive.resolve_base_dir(doc_dir), doc_dir);

        directive.base_dir = Some("../data".into());
        assert_eq!(
            directive.resolve_base_dir(doc_dir),
            std::path::Path::new("/docs/guide/../data")
        );
    }
}

mod file_tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[import]\nheader_row = 1\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.import.header_row, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/sqltable.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[import\n").unwrap();

        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("docs").join("chapter");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[directive]\ndriver = \"csv\"\n",
        )
        .unwrap();

        assert_eq!(
            find_config_file(&nested),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
        let settings = Settings::discover(&nested).unwrap();
        assert_eq!(settings.directive.driver, Driver::Csv);
    }
}
