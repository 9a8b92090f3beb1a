//! # Store Configuration
//!
//! Where the data files live and the dashboard threshold.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUEBRA_DATA_DIR=/srv/quebras                                       │
//! │     QUEBRA_HIGH_BREAKAGE_PCT=10                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config PATH, or                                                  │
//! │     ~/.config/quebra/quebra.toml (Linux)                               │
//! │     ~/Library/Application Support/com.quebra.quebra/quebra.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./dados_quebras.csv, ./precos.csv, ./backups/, 8%                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # quebra.toml
//! data_dir = "/srv/quebras"
//! ledger_file = "dados_quebras.csv"
//! catalog_file = "precos.csv"
//! backup_dir = "backups"
//! high_breakage_threshold = "8"
//! ```
//!
//! Relative file names resolve against `data_dir`.

use std::path::{Path, PathBuf};

use quebra_core::DEFAULT_HIGH_BREAKAGE_THRESHOLD;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Config file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "quebra.toml";

/// Store configuration.
///
/// ## Example
/// ```rust
/// use quebra_store::StoreConfig;
///
/// let config = StoreConfig::new("/tmp/quebras").ledger_file("ledger.csv");
/// assert_eq!(config.ledger_path(), std::path::Path::new("/tmp/quebras/ledger.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the ledger, catalog and backups.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Breakage ledger file.
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,

    /// Price catalog file.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,

    /// Where single-record deletes copy the previous ledger.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Dashboard cells above this percentage are flagged high.
    #[serde(default = "default_threshold")]
    pub high_breakage_threshold: Decimal,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_ledger_file() -> PathBuf {
    PathBuf::from("dados_quebras.csv")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("precos.csv")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_threshold() -> Decimal {
    Decimal::from(DEFAULT_HIGH_BREAKAGE_THRESHOLD)
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_dir: default_data_dir(),
            ledger_file: default_ledger_file(),
            catalog_file: default_catalog_file(),
            backup_dir: default_backup_dir(),
            high_breakage_threshold: default_threshold(),
        }
    }
}

impl StoreConfig {
    /// Default file names inside `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the ledger file name.
    pub fn ledger_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.ledger_file = file.into();
        self
    }

    /// Sets the catalog file name.
    pub fn catalog_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.catalog_file = file.into();
        self
    }

    /// Sets the backup directory.
    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Sets the high-breakage threshold (percent).
    pub fn high_breakage_threshold(mut self, threshold: Decimal) -> Self {
        self.high_breakage_threshold = threshold;
        self
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`quebra.toml`)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(StoreError::Config(format!(
                        "arquivo de configuração não encontrado: {}",
                        path.display()
                    )));
                }
                config = Self::read_file(&path)?;
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    if path.exists() {
                        config = Self::read_file(&path)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn read_file(path: &Path) -> StoreResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        for (name, value) in [
            ("ledger_file", &self.ledger_file),
            ("catalog_file", &self.catalog_file),
            ("backup_dir", &self.backup_dir),
        ] {
            if value.as_os_str().is_empty() {
                return Err(StoreError::Config(format!("{name} não pode ser vazio")));
            }
        }

        if self.high_breakage_threshold.is_sign_negative() {
            return Err(StoreError::Config(
                "high_breakage_threshold não pode ser negativo".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("QUEBRA_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.data_dir = PathBuf::from(dir);
        }

        if let Ok(file) = std::env::var("QUEBRA_LEDGER_FILE") {
            self.ledger_file = PathBuf::from(file);
        }

        if let Ok(file) = std::env::var("QUEBRA_CATALOG_FILE") {
            self.catalog_file = PathBuf::from(file);
        }

        if let Ok(dir) = std::env::var("QUEBRA_BACKUP_DIR") {
            self.backup_dir = PathBuf::from(dir);
        }

        if let Ok(pct) = std::env::var("QUEBRA_HIGH_BREAKAGE_PCT") {
            match pct.trim().parse::<Decimal>() {
                Ok(value) => {
                    debug!(threshold = %value, "Overriding threshold from environment");
                    self.high_breakage_threshold = value;
                }
                Err(_) => warn!(value = %pct, "Ignoring unreadable QUEBRA_HIGH_BREAKAGE_PCT"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "quebra", "quebra")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Resolved paths
    // =========================================================================

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.resolve(&self.ledger_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.catalog_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.resolve(&self.backup_dir)
    }
}
