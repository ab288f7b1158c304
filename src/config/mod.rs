use anyhow::{Context, Result};
use keyring::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SERVICE_NAME: &str = "publer-cli";
const KEYRING_USER: &str = "api_key";
const CONFIG_FILE: &str = "config.toml";

type Table = HashMap<String, toml::Value>;

/// Settings persisted in `<config dir>/publer/config.toml`.
///
/// ```toml
/// [api]
/// url = "https://app.publer.com/api/v1"
///
/// [workspace]
/// id = "61a0..."
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    pub api_url: Option<String>,
    pub workspace_id: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        Self::from_dir(config_dir)
    }

    pub fn from_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let config = read_table(&config_dir.join(CONFIG_FILE))?;
        debug!(dir = %config_dir.display(), "loaded config");

        Ok(Self {
            api_url: lookup(&config, "api.url"),
            workspace_id: lookup(&config, "workspace.id"),
            config_dir,
        })
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("publer"))
            .context("Failed to determine config directory")
    }

    pub fn get_api_key(&self) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, KEYRING_USER)?;
        match entry.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("Failed to get API key: {}", e)),
        }
    }

    pub fn set_api_key(&self, api_key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, KEYRING_USER)?;
        entry
            .set_password(api_key)
            .context("Failed to store API key")?;
        Ok(())
    }

    pub fn remove_api_key(&self) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, KEYRING_USER)?;
        match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to remove API key: {}", e)),
        }
    }

    /// Store `value` under `key`. Dotted keys such as `workspace.id` address
    /// a table entry.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let config_file = self.config_dir.join(CONFIG_FILE);
        let mut config = read_table(&config_file)?;

        match key.split_once('.') {
            Some((section, subkey)) => {
                let section_map = config
                    .entry(section.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::value::Table::new()))
                    .as_table_mut()
                    .with_context(|| format!("Config key '{}' is not a table", section))?;

                section_map.insert(subkey.to_string(), toml::Value::String(value.to_string()));
            }
            None => {
                config.insert(key.to_string(), toml::Value::String(value.to_string()));
            }
        }

        let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        fs::write(&config_file, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let config = read_table(&self.config_dir.join(CONFIG_FILE))?;
        Ok(lookup(&config, key))
    }
}

fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Ok(Table::new());
    }
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn lookup(config: &Table, key: &str) -> Option<String> {
    let value = match key.split_once('.') {
        Some((section, subkey)) => config.get(section)?.as_table()?.get(subkey)?,
        None => config.get(key)?,
    };
    value.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path()).unwrap();

        assert_eq!(config.api_url, None);
        assert_eq!(config.workspace_id, None);
        assert_eq!(config.get("api.url").unwrap(), None);
    }

    #[test]
    fn set_then_load_round_trips_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path()).unwrap();

        config.set("api.url", "http://localhost:9000/api/v1").unwrap();
        config.set("workspace.id", "ws-42").unwrap();
        config.set("editor", "vim").unwrap();

        let reloaded = Config::from_dir(dir.path()).unwrap();
        assert_eq!(reloaded.api_url.as_deref(), Some("http://localhost:9000/api/v1"));
        assert_eq!(reloaded.workspace_id.as_deref(), Some("ws-42"));
        assert_eq!(reloaded.get("editor").unwrap().as_deref(), Some("vim"));
        assert_eq!(reloaded.get("workspace.missing").unwrap(), None);
    }

    #[test]
    fn set_rejects_dotted_key_under_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path()).unwrap();

        config.set("api", "plain").unwrap();
        assert!(config.set("api.url", "http://x").is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "api = [").unwrap();

        assert!(Config::from_dir(dir.path()).is_err());
    }
}
