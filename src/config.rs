//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json`. It names the data files that
//! hold transactions and user profiles, plus a few display settings.

use crate::store::{ProfileStore, TransactionStore};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_NAME: &str = "pocket-ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const TRANSACTIONS_JSON: &str = "transactions.json";
const USERS_JSON: &str = "users.json";
const CURRENCY: &str = "VND";
const TOP_CATEGORIES: usize = 5;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It provides
/// paths to the data files, which are either configured or expected in a default location within
/// the ledger home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the ledger home directory and an initial `config.json` with default settings.
    ///
    /// An existing `config.json` is left untouched and loaded instead, so running `init` twice
    /// does not reset anything.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            info!("Keeping the existing config at {}", config_path.display());
            return Self::load(root);
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path)?;
        debug!("Wrote {}", config_path.display());

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `ledger_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = ledger_home.into();
        let root = utils::canonicalize(&maybe_relative).context("Ledger home is missing")?;
        if !root.is_dir() {
            bail!("Ledger home is not a directory '{}'", root.display())
        }

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}'. Run the init command first.",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path)?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.resolve(self.config_file.transactions_path())
    }

    pub fn users_path(&self) -> PathBuf {
        self.resolve(self.config_file.users_path())
    }

    /// The currency code shown next to amounts.
    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// How many expense categories the statistics view lists before folding the rest into
    /// "Other".
    pub fn top_categories(&self) -> usize {
        self.config_file.top_categories
    }

    /// Opens the transaction store. An unreadable file yields an empty store and is copied aside
    /// before the next write.
    pub fn transaction_store(&self) -> TransactionStore {
        TransactionStore::open(self.transactions_path())
    }

    /// Opens the profile store. An unreadable file yields an empty store and is copied aside
    /// before the next write.
    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::open(self.users_path())
    }

    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket-ledger",
///   "config_version": 1,
///   "transactions_path": "transactions.json",
///   "users_path": "users.json",
///   "currency": "VND",
///   "top_categories": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the transactions file (optional, relative to the ledger home or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transactions_path: Option<PathBuf>,

    /// Path to the users file (optional, relative to the ledger home or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    users_path: Option<PathBuf>,

    #[serde(default = "default_currency")]
    currency: String,

    #[serde(default = "default_top_categories")]
    top_categories: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            transactions_path: None,
            users_path: None,
            currency: default_currency(),
            top_categories: default_top_categories(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another app.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.top_categories > 0,
            "top_categories must be at least 1 in {}",
            path.display()
        );
        Ok(config)
    }

    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::write_json(path, self).context("Unable to write config file")
    }

    fn transactions_path(&self) -> PathBuf {
        self.transactions_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(TRANSACTIONS_JSON))
    }

    fn users_path(&self) -> PathBuf {
        self.users_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(USERS_JSON))
    }
}

fn default_currency() -> String {
    CURRENCY.to_string()
}

fn default_top_categories() -> usize {
    TOP_CATEGORIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger_home");
        let config = Config::create(&home).unwrap();

        assert!(config.config_path().is_file());
        assert_eq!(config.transactions_path(), config.root().join(TRANSACTIONS_JSON));
        assert_eq!(config.users_path(), config.root().join(USERS_JSON));
        assert_eq!(config.currency(), "VND");
        assert_eq!(config.top_categories(), 5);

        let loaded = Config::load(&home).unwrap();
        assert_eq!(loaded.root(), config.root());
    }

    #[test]
    fn test_config_create_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "pocket-ledger",
            "config_version": 1,
            "currency": "USD",
            "top_categories": 3
        }"#;
        utils::write(&path, json).unwrap();

        let config = Config::create(dir.path()).unwrap();
        assert_eq!(config.currency(), "USD");
        assert_eq!(config.top_categories(), 3);
        assert_eq!(utils::read(&path).unwrap(), json);
    }

    #[test]
    fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).is_err());
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[test]
    fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "pocket-ledger", "config_version": 1}"#).unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.transactions_path(), PathBuf::from(TRANSACTIONS_JSON));
    }

    #[test]
    fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "budget", "config_version": 1}"#).unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_absolute_and_relative_data_paths() {
        let dir = TempDir::new().unwrap();
        let elsewhere = dir.path().join("shared").join("tx.json");
        let config_file = ConfigFile {
            transactions_path: Some(elsewhere.clone()),
            users_path: Some(PathBuf::from("data/people.json")),
            ..ConfigFile::default()
        };
        config_file.save(dir.path().join(CONFIG_JSON)).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.transactions_path(), elsewhere);
        assert_eq!(
            config.users_path(),
            config.root().join("data").join("people.json")
        );
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("transactions_path"));
        assert!(!json.contains("users_path"));
    }
}
