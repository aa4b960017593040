//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `--config <FILE>` on the command line
//! 2. `$WOOF_CONFIG` (environment variable)
//! 3. `~/.config/woof/config.toml` (Linux/macOS)
//!    `%APPDATA%\woof\config.toml` (Windows)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Digest rendering settings.
    pub render: RenderConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

/// Settings that shape each rendered digest entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Characters always emitted before a teaser starts looking for a space.
    pub teaser_length: usize,
    /// Marker appended after a teaser excerpt.
    pub ellipsis: String,
    /// Header whose presence turns an entry into a teaser with a link.
    pub archive_header: String,
    /// Charset assumed for parts that do not declare one.
    pub default_charset: String,
    /// Maximum extra characters scanned for a space past `teaser_length`.
    /// `None` scans to the end of the content.
    pub boundary_search_limit: Option<usize>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            teaser_length: 100,
            ellipsis: "...".to_string(),
            archive_header: "Archived-At".to_string(),
            default_charset: "iso-8859-1".to_string(),
            boundary_search_limit: None,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// An explicit path that cannot be read or parsed is an error. For the
/// implicit locations, a broken file logs a warning and defaults are used.
pub fn load_config(explicit: Option<&Path>) -> crate::error::Result<Config> {
    if let Some(path) = explicit {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::error::WoofError::io(path, e))?;
        let cfg = toml::from_str::<Config>(&contents).map_err(|e| {
            crate::error::WoofError::Config(format!("{}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "Loaded config");
        return Ok(cfg);
    }

    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return Ok(cfg);
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Ok(Config::default())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("WOOF_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("woof").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.render.teaser_length, 100);
        assert_eq!(cfg.render.ellipsis, "...");
        assert_eq!(cfg.render.archive_header, "Archived-At");
        assert_eq!(cfg.render.default_charset, "iso-8859-1");
        assert!(cfg.render.boundary_search_limit.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[render]
teaser_length = 40
boundary_search_limit = 500
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.render.teaser_length, 40);
        assert_eq!(cfg.render.boundary_search_limit, Some(500));
        // Other fields use defaults
        assert_eq!(cfg.render.archive_header, "Archived-At");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("woof.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.general.log_level, "debug");
    }

    #[test]
    fn test_explicit_config_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_config_invalid_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[render]\nteaser_length = \"many\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, crate::error::WoofError::Config(_)));
    }
}
