mod schema;
mod validation;

pub use schema::{BatchConfig, ColumnMap, Config, Eligibility};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/terra-score/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("terra-score")
}

/// Get the default config file path (~/.config/terra-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/terra-score/config.yaml)
///
/// A missing default file yields the built-in configuration; a missing
/// explicit file is an error.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly requested config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_explicit_missing_file_is_error() {
        let path = env::temp_dir().join("terra_score_test_missing_config.yaml");
        let _ = fs::remove_file(&path);
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("terra_score_test_config.yaml");
        fs::write(&path, "defaults:\n  period: 20\nbatch:\n  round_decimals: 2\n").unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.defaults.period, 20.0);
        assert_eq!(config.batch.round_decimals, 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = env::temp_dir().join("terra_score_test_bad_config.yaml");
        fs::write(&path, "defaults: [1, 2\n").unwrap();

        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = fs::remove_file(&path);
    }
}
