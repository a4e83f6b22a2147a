//! Configuration handling for the Passforge CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub passes: PassesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// `[passes]`: default pipeline and pass options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PassesConfig {
    /// Passes run when none are given on the command line
    #[serde(default)]
    pub pipeline: Vec<String>,

    #[serde(default)]
    pub inline_only_in_function: Option<String>,

    #[serde(default)]
    pub function_name: Option<String>,
}

/// `[output]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Always print pass statistics
    #[serde(default)]
    pub stats: bool,
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Load configuration from file or use defaults
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        read_config(&path)
    } else if let Some(home) = dirs::home_dir() {
        let default_path = home.join(".passforge").join("config.toml");
        if default_path.exists() {
            read_config(&default_path)
        } else {
            Ok(Config::default())
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_passes_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[passes]
pipeline = ["all-inline", "function-names"]
inline-only-in-function = "main"

[output]
stats = true
"#,
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.passes.pipeline, vec!["all-inline", "function-names"]);
        assert_eq!(config.passes.inline_only_in_function.as_deref(), Some("main"));
        assert_eq!(config.passes.function_name, None);
        assert!(config.output.stats);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert!(config.passes.pipeline.is_empty());
        assert!(!config.output.stats);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
