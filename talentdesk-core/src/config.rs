//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Manages all user-editable settings for the recruiting console. Loads and
//! saves settings as TOML from the proper cross-platform config path using the
//! [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Robust defaulting if no config file exists
//! - Async load/save for smooth integration with Tokio
//! - Human-readable durations (`"300ms"`, `"8s"`) via `humantime-serde`
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;

/// Data table behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows shown per page
    pub items_per_page: usize,

    /// Quiet period before a typed search term is applied
    #[serde(with = "humantime_serde")]
    pub search_debounce: Duration,

    /// Jump back to page 1 whenever search, filters or data change
    pub reset_page_on_filter_change: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            search_debounce: Duration::from_millis(300),
            reset_page_on_filter_change: true,
        }
    }
}

/// Toast queue timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Lifetime of success/warning/info toasts and of raw `add_notification`
    #[serde(with = "humantime_serde")]
    pub default_duration: Duration,

    /// Lifetime of error toasts created through `error(...)`
    #[serde(with = "humantime_serde")]
    pub error_duration: Duration,

    /// Repaint cadence of the countdown bar
    #[serde(with = "humantime_serde")]
    pub progress_interval: Duration,

    /// Toasts drawn at once; older ones wait off-screen
    pub max_visible: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_duration: Duration::from_millis(5000),
            error_duration: Duration::from_millis(8000),
            progress_interval: Duration::from_millis(50),
            max_visible: 3,
        }
    }
}

/// Terminal front end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw tick of the event loop
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,

    /// Enable mouse capture for header clicks
    pub mouse: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
            mouse: true,
        }
    }
}

/// File logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,

    pub file_prefix: String,

    /// Default directive; `RUST_LOG` is layered on top
    pub level: String,

    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            file_prefix: "talentdesk".to_string(),
            level: "info".to_string(),
            max_log_files: 10,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace JSON used when no path is given on the command line
    pub data_file: Option<PathBuf>,

    pub table: TableConfig,

    pub notifications: NotificationConfig,

    pub ui: UiConfig,

    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/talentdesk/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> Result<Self, AppError> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            Self::load_from(&path).await
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Reads and validates a config file at an explicit path.
    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|source| AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml_str(&text)
    }

    /// Parses and validates config text.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        let io_err = |source: std::io::Error| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await.map_err(io_err)?;

        Ok(())
    }

    /// Rejects values that would stall the event loop or break paging.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.table.items_per_page == 0 {
            return Err(AppError::invalid_config(
                "table.items_per_page",
                "must be at least 1",
            ));
        }

        if self.ui.tick_rate.is_zero() {
            return Err(AppError::invalid_config(
                "ui.tick_rate",
                "must be greater than 0",
            ));
        }

        if self.notifications.progress_interval.is_zero() {
            return Err(AppError::invalid_config(
                "notifications.progress_interval",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the config directory (without filename).
    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "talentdesk", "talentdesk")
            .ok_or_else(|| AppError::Other("Could not determine config directory.".into()))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [table]
            items_per_page = 25

            [notifications]
            error_duration = "12s"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.table.items_per_page, 25);
        assert_eq!(cfg.table.search_debounce, Duration::from_millis(300));
        assert_eq!(cfg.notifications.error_duration, Duration::from_secs(12));
        assert_eq!(cfg.notifications.default_duration, Duration::from_secs(5));
        assert!(cfg.data_file.is_none());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::from_toml_str("[table]\nitems_per_page = 0\n").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { ref field, .. } if field == "table.items_per_page"));
    }

    #[test]
    fn test_zero_progress_interval_rejected() {
        let err =
            Config::from_toml_str("[notifications]\nprogress_interval = \"0ms\"\n").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.table.items_per_page = 7;
        cfg.data_file = Some(PathBuf::from("/srv/hiring/workspace.json"));
        cfg.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.table.items_per_page, 7);
        assert_eq!(
            loaded.data_file.as_deref(),
            Some(Path::new("/srv/hiring/workspace.json"))
        );
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(&path).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigIo { path: ref p, .. } if p == &path));
    }
}
