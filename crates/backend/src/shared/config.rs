use contracts::domain::a001_seller_account::Account;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Имена файлов конфигурации в порядке приоритета.
/// config.json поддерживается для совместимости со старыми установками.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.toml", "config.json"];

pub const DEFAULT_API_BASE: &str = "https://api-seller.ozon.ru";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found (searched: {searched})")]
    NotFound { searched: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no accounts configured")]
    NoAccounts,

    #[error("invalid account: {0}")]
    InvalidAccount(String),

    #[error("account '{0}' not found in configuration")]
    UnknownAccount(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Таймаут запросов каталога и восстановления
    pub request_timeout_secs: u64,
    /// Таймаут теста соединения
    pub test_timeout_secs: u64,
    /// Файл для сырых запросов/ответов API (Api-Key маскируется)
    pub request_log: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
            test_timeout_secs: 10,
            request_log: None,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        for account in &self.accounts {
            account.validate().map_err(ConfigError::InvalidAccount)?;
        }
        Ok(())
    }

    pub fn account_names(&self) -> Vec<&str> {
        self.accounts.iter().map(|a| a.name.as_str()).collect()
    }

    /// Найти магазин по имени. Без имени возвращается первый магазин из списка.
    pub fn find_account(&self, name: Option<&str>) -> Result<&Account, ConfigError> {
        match name {
            Some(name) => self
                .accounts
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| ConfigError::UnknownAccount(name.to_string())),
            None => self.accounts.first().ok_or(ConfigError::NoAccounts),
        }
    }
}

/// Load configuration
///
/// Search order:
/// 1. Explicit path (command line)
/// 2. Next to the executable (for production)
/// 3. Current working directory
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let mut dirs = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    let mut searched = Vec::new();
    for dir in &dirs {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                tracing::info!("Loading config from: {}", candidate.display());
                return load_from_path(&candidate);
            }
            searched.push(candidate.display().to_string());
        }
    }

    tracing::error!("Configuration file not found");
    Err(ConfigError::NotFound {
        searched: searched.join(", "),
    })
}

/// Прочитать и проверить конфигурацию. Формат определяется по расширению.
pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config: Config = if is_json {
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };

    config.validate()?;
    tracing::info!(
        "Configuration loaded: {} account(s), API base {}",
        config.accounts.len(),
        config.api.base_url
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_TOML: &str = r#"
[[accounts]]
name = "Main store"
client_id = "111"
api_key = "key-1"

[[accounts]]
name = "Second store"
client_id = "222"
api_key = "key-2"

[api]
request_timeout_secs = 45
"#;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_toml_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "config.toml", SAMPLE_TOML);

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.account_names(), vec!["Main store", "Second store"]);
        assert_eq!(config.api.request_timeout_secs, 45);
        assert_eq!(config.api.test_timeout_secs, 10);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_legacy_json_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "config.json",
            r#"{"accounts": [{"name": "Shop", "client_id": "42", "api_key": "k"}]}"#,
        );

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_empty_account_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "config.json", r#"{"accounts": []}"#);
        assert!(matches!(load_from_path(&path), Err(ConfigError::NoAccounts)));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "config.toml",
            "[[accounts]]\nname = \"Shop\"\nclient_id = \"1\"\napi_key = \"\"\n",
        );
        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::InvalidAccount(_))
        ));
    }

    #[test]
    fn test_broken_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "config.toml", "accounts = [");
        assert!(matches!(load_from_path(&path), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn test_missing_explicit_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_find_account() {
        let config: Config = toml::from_str(SAMPLE_TOML).unwrap();
        assert_eq!(config.find_account(None).unwrap().name, "Main store");
        assert_eq!(
            config.find_account(Some("Second store")).unwrap().client_id,
            "222"
        );
        assert!(matches!(
            config.find_account(Some("Other")),
            Err(ConfigError::UnknownAccount(_))
        ));
    }
}
