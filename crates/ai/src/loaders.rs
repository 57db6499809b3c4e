//! Engine configuration loader.

use std::path::Path;

use maze_core::GameConfig;

use crate::error::EngineError;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Loader for the engine thresholds and search bounds from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`GameConfig`] from a TOML file.
    ///
    /// Missing keys keep their default value. The thresholds are checked
    /// before the configuration is returned.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        check(&config)?;
        Ok(config)
    }
}

/// Rejects thresholds outside `[0, 1]` or not strictly ordered.
pub fn check(config: &GameConfig) -> Result<(), EngineError> {
    let unit = |value: f64| (0.0..=1.0).contains(&value);
    if !unit(config.mid) || !unit(config.high) || config.mid >= config.high {
        return Err(EngineError::Config(format!(
            "thresholds must satisfy 0 <= mid < high <= 1, got mid={} high={}",
            config.mid, config.high
        )));
    }
    if !unit(config.risky_move_ceiling) {
        return Err(EngineError::Config(format!(
            "risky_move_ceiling must lie in [0, 1], got {}",
            config.risky_move_ceiling
        )));
    }
    if config.short_path_limit == 0 || config.long_path_stride == 0 {
        return Err(EngineError::Config(
            "path search bounds must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mid = 0.4\nhigh = 0.8\ndist_approach = 3").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.mid, 0.4);
        assert_eq!(config.high, 0.8);
        assert_eq!(config.dist_approach, 3);
        assert_eq!(config.short_path_limit, GameConfig::default().short_path_limit);
    }

    #[test]
    fn test_inverted_thresholds_are_rejected() {
        let err = ConfigLoader::parse("mid = 0.9\nhigh = 0.2").unwrap_err();
        assert!(err.to_string().contains("mid < high"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = ConfigLoader::load(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
