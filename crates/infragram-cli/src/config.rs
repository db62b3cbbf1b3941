//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use infragram::{InfragramError, config::AppConfig, export::RenderStyle};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for InfragramError {
    fn from(err: ConfigError) -> Self {
        InfragramError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (infragram/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - A configured color is invalid
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, InfragramError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("infragram/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "infragram", "infragram") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
/// - A style color does not parse
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, InfragramError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    // Colors are kept as strings until render time; reject bad ones up front.
    RenderStyle::from_config(config.style()).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use infragram::config::{DanglingPolicy, EdgeRouting};

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let file = write_config(
            r#"
            dangling = "reject"

            [style]
            edge_routing = "curved"
            "#,
        );
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.dangling(), DanglingPolicy::Reject);
        assert_eq!(config.style().edge_routing(), EdgeRouting::Curved);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let result = load_config(Some("/definitely/not/here/config.toml"));
        assert!(matches!(result, Err(InfragramError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let file = write_config("[layout\nmargin = 1");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(InfragramError::Config(msg)) if msg.contains("parse")));
    }

    #[test]
    fn test_invalid_color_fails_at_load() {
        let file = write_config("[style]\nbackground_color = \"nope\"");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(InfragramError::Config(msg)) if msg.contains("Validation")));
    }
}
