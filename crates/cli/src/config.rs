//! Configuration file loading.
//!
//! The file is TOML with the same camelCase keys as [`RallyConfig`]. Loading
//! only parses; required-key validation runs separately so that every missing
//! key is reported together.

use std::path::{Path, PathBuf};

use tracker::RallyConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or BUSYBEE_RALLY_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Reads and parses the file at `path`, then applies `api_key` over the
/// file's `apiKey` when given.
pub fn load(path: Option<&Path>, api_key: Option<String>) -> Result<RallyConfig, ConfigError> {
    let path = path.ok_or(ConfigError::MissingConfigPath)?;
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse(&contents)?;
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key);
    }
    Ok(config)
}

pub fn parse(contents: &str) -> Result<RallyConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker::LogLevel;

    const SAMPLE: &str = r#"
server = "https://rally.example.com"
workspace = "1001"
project = "2002"
testFolder = "TF42"
apiKey = "_from_file"
user = "qa@example.com"
logLevel = "debug"

[requestOptions]
timeoutMs = 15000

[requestOptions.headers]
X-RallyIntegrationName = "busybee"
"#;

    #[test]
    fn parses_camel_case_toml() {
        let config = parse(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server(), "https://rally.example.com");
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        let options = config.request_options.unwrap();
        assert_eq!(options.timeout_ms, Some(15000));
        assert_eq!(options.headers["X-RallyIntegrationName"], "busybee");
    }

    #[test]
    fn partial_files_parse_and_fail_validation_later() {
        let config = parse("workspace = \"1\"\n").unwrap();
        let message = config.validate().unwrap_err().to_string();
        assert_eq!(
            message,
            "'project,testFolder,apiKey,user,requestOptions' are required configuration keys"
        );
    }

    #[test]
    fn missing_path_is_reported() {
        assert!(matches!(load(None, None), Err(ConfigError::MissingConfigPath)));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let dir = std::env::temp_dir().join(format!("busybee-rally-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load(Some(&path), Some("_from_env".into())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("_from_env"));

        let config = load(Some(&path), Some("  ".into())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("_from_file"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
