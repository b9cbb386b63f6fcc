// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("termgpt");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<AppConfig> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        let default_config = AppConfig::default();
        save_config(&default_config)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(&config_path).context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let config_path = get_config_path()?;

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&config_path, contents).context("Failed to write config file")?;

    Ok(())
}

/// The API credential comes from the environment, never from the config file
pub fn api_key() -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable is not set")
}

/// Base name of the user's shell, for the status line
pub fn shell_name() -> String {
    std::env::var("SHELL").map_or_else(|_| "sh".to_string(), |s| shell_base_name(&s))
}

fn shell_base_name(shell: &str) -> String {
    Path::new(shell)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("sh")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_base_name() {
        assert_eq!(shell_base_name("/bin/zsh"), "zsh");
        assert_eq!(shell_base_name("/usr/local/bin/fish"), "fish");
        assert_eq!(shell_base_name("bash"), "bash");
        assert_eq!(shell_base_name(""), "sh");
    }

    #[test]
    fn test_config_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = AppConfig {
            base_url: "http://localhost:8080/v1".to_string(),
            model: "test-model".to_string(),
            request_timeout: 120,
        };

        let contents = toml::to_string_pretty(&config).unwrap();
        fs::write(&config_path, contents).unwrap();

        let loaded_contents = fs::read_to_string(&config_path).unwrap();
        let loaded: AppConfig = toml::from_str(&loaded_contents).unwrap();

        assert_eq!(loaded.base_url, "http://localhost:8080/v1");
        assert_eq!(loaded.model, "test-model");
        assert_eq!(loaded.request_timeout, 120);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();

        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.base_url, config.base_url);
        assert_eq!(deserialized.model, config.model);
    }
}
