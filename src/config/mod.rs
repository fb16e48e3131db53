mod file_config;

pub use file_config::{ChartsConfig, FileConfig};

use crate::charts::ChartLimits;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_db: PathBuf,
    pub listening_db: PathBuf,
    pub songs_limit: usize,
    pub albums_limit: usize,
    pub read_pool_size: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_db: PathBuf,
    pub listening_db: PathBuf,
    pub songs_limit: usize,
    pub albums_limit: usize,
    pub read_pool_size: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_db = file
            .catalog_db
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.catalog_db.clone());
        let listening_db = file
            .listening_db
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.listening_db.clone());

        let charts = file.charts.unwrap_or_default();
        let songs_limit = charts.songs_limit.unwrap_or(cli.songs_limit);
        let albums_limit = charts.albums_limit.unwrap_or(cli.albums_limit);
        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);

        if songs_limit == 0 || albums_limit == 0 {
            bail!("Chart entry limits must be at least 1");
        }
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        Ok(AppConfig {
            catalog_db,
            listening_db,
            songs_limit,
            albums_limit,
            read_pool_size,
        })
    }

    pub fn chart_limits(&self) -> ChartLimits {
        ChartLimits {
            songs: self.songs_limit,
            albums: self.albums_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            catalog_db: PathBuf::from("catalog.db"),
            listening_db: PathBuf::from("listening.db"),
            songs_limit: 20,
            albums_limit: 10,
            read_pool_size: 4,
        }
    }

    #[test]
    fn test_cli_values_used_without_file_config() {
        let config = AppConfig::resolve(&cli(), None).unwrap();
        assert_eq!(config.catalog_db, PathBuf::from("catalog.db"));
        assert_eq!(config.songs_limit, 20);
        assert_eq!(config.albums_limit, 10);
    }

    #[test]
    fn test_file_config_overrides_cli() {
        let file: FileConfig = toml::from_str(
            r#"
            catalog_db = "/elsewhere/catalog.db"

            [charts]
            songs_limit = 50
            "#,
        )
        .unwrap();

        let config = AppConfig::resolve(&cli(), Some(file)).unwrap();
        assert_eq!(config.catalog_db, PathBuf::from("/elsewhere/catalog.db"));
        assert_eq!(config.songs_limit, 50);
        // Unset file values fall back to CLI
        assert_eq!(config.albums_limit, 10);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let file: FileConfig = toml::from_str(
            r#"
            [charts]
            songs_limit = 0
            "#,
        )
        .unwrap();
        assert!(AppConfig::resolve(&cli(), Some(file)).is_err());
    }
}
