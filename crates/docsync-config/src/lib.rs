use docsync_engine::sync::SyncOptions;
use docsync_engine::viewport::CullerOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for documents when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
    pub sync: SyncSection,
    pub viewport: ViewportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub debounce_ms: u64,
    pub settle_extra_ms: u64,
    pub enabled: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        let options = SyncOptions::default();
        Self {
            debounce_ms: options.debounce.as_millis() as u64,
            settle_extra_ms: options.settle_extra.as_millis() as u64,
            enabled: options.start_enabled,
        }
    }
}

impl SyncSection {
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            settle_extra: Duration::from_millis(self.settle_extra_ms),
            start_enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSection {
    pub overscan_px: f64,
    pub virtualization_threshold: usize,
    pub zoom_percent: f64,
}

impl Default for ViewportSection {
    fn default() -> Self {
        let options = CullerOptions::default();
        Self {
            overscan_px: options.overscan_px,
            virtualization_threshold: options.virtualization_threshold,
            zoom_percent: 100.0,
        }
    }
}

impl ViewportSection {
    pub fn culler_options(&self) -> CullerOptions {
        CullerOptions {
            virtualization_threshold: self.virtualization_threshold,
            overscan_px: self.overscan_px,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded documents path
        config.documents_path = config
            .documents_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docsync");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/docsync/config.toml"));
    }

    #[test]
    fn test_empty_file_uses_engine_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.documents_path, None);
        assert_eq!(config.sync.options(), SyncOptions::default());
        assert_eq!(config.viewport.culler_options(), CullerOptions::default());
        assert_eq!(config.viewport.zoom_percent, 100.0);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[sync]
debounce_ms = 80

[viewport]
overscan_px = 50.0
"#,
        )
        .unwrap();

        let sync = config.sync.options();
        assert_eq!(sync.debounce, Duration::from_millis(80));
        assert_eq!(sync.settle_extra, Duration::from_millis(100));
        assert_eq!(sync.settle_delay(), Duration::from_millis(180));
        assert!(sync.start_enabled);

        let culler = config.viewport.culler_options();
        assert_eq!(culler.overscan_px, 50.0);
        assert_eq!(culler.virtualization_threshold, 50);
    }

    #[test]
    fn test_sync_can_start_disabled() {
        let config: Config = toml::from_str("[sync]\nenabled = false\n").unwrap();
        assert!(!config.sync.options().start_enabled);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("DOCSYNC_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$DOCSYNC_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("DOCSYNC_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        assert_eq!(Config::expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[sync]\ndebounce_ms = \"soon\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            documents_path: Some(PathBuf::from("/tmp/test-documents")),
            sync: SyncSection {
                debounce_ms: 30,
                settle_extra_ms: 70,
                enabled: false,
            },
            viewport: ViewportSection {
                zoom_percent: 150.0,
                ..ViewportSection::default()
            },
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_documents_path_with_env_var_is_expanded_on_load() {
        unsafe {
            env::set_var("DOCSYNC_SCANS", "/custom/scans");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "documents_path = \"$DOCSYNC_SCANS/2024\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.documents_path,
            Some(PathBuf::from("/custom/scans/2024"))
        );
        unsafe {
            env::remove_var("DOCSYNC_SCANS");
        }
    }
}
