use std::fs;
use std::path::Path;

use crate::model::config::EngineConfig;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Read the engine config from `config.toml` under the given directory.
/// A missing file means defaults; a malformed one is an error.
pub fn read_config(dir: &Path) -> Result<EngineConfig, ConfigError> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let text = fs::read_to_string(&path)?;
    Ok(toml::from_str(&text)?)
}

/// Write the engine config to `config.toml` under the given directory
pub fn write_config(dir: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    let path = dir.join("config.toml");
    fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::time::TimeOfDay;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let config = EngineConfig {
            working_day_start: TimeOfDay::from_hhmm(600).unwrap(),
            accepting_tasks_max_time: TimeOfDay::from_hhmm(2200).unwrap(),
        };
        write_config(tmp.path(), &config).unwrap();
        assert_eq!(read_config(tmp.path()).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "working_day_start = \"late\"").unwrap();
        assert!(read_config(tmp.path()).is_err());
    }
}
