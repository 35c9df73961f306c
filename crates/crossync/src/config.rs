use crate::error::{CrossyncError, Result};
use crate::index::DEFAULT_PROBE_TIMEOUT;
use crate::sync::rsync::RSYNC;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xdg::BaseDirectories;

pub const ENV_PRESET_DIR: &str = "CROSSYNC_PRESET_DIR";
pub const ENV_RSYNC: &str = "CROSSYNC_RSYNC";
pub const DEFAULT_EMPTY_DIR_DISPLAY: usize = 10;

/// Optional settings read from `crossync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub preset_dir: Option<PathBuf>,
    pub rsync_binary: Option<String>,
    pub probe_timeout_secs: Option<u64>,
    pub empty_dir_display: Option<usize>,
}

impl FileSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CrossyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            CrossyncError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub preset_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub rsync_binary: String,
    pub probe_timeout: Duration,
    pub empty_dir_display: usize,
}

impl Config {
    /// Resolves settings from, in order: explicit overrides, `CROSSYNC_*`
    /// environment variables, `crossync.toml`, then XDG defaults.
    pub fn new(preset_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> Result<Self> {
        let config_path = config_file.or_else(|| {
            BaseDirectories::with_prefix("crossync")
                .ok()
                .and_then(|xdg| xdg.find_config_file("crossync.toml"))
        });

        let settings = match &config_path {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };

        Self::resolve(preset_dir, config_path, settings, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        preset_dir: Option<PathBuf>,
        config_path: Option<PathBuf>,
        settings: FileSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let preset_dir = match preset_dir
            .or_else(|| env(ENV_PRESET_DIR).map(PathBuf::from))
            .or(settings.preset_dir)
        {
            Some(dir) => dir,
            None => default_preset_dir()?,
        };

        let rsync_binary = env(ENV_RSYNC)
            .or(settings.rsync_binary)
            .unwrap_or_else(|| RSYNC.to_string());

        if rsync_binary.trim().is_empty() {
            return Err(CrossyncError::Config("rsync binary cannot be empty".to_string()));
        }

        let probe_timeout = settings
            .probe_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT);

        if probe_timeout.is_zero() {
            return Err(CrossyncError::Config(
                "probe_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            preset_dir,
            config_path,
            rsync_binary,
            probe_timeout,
            empty_dir_display: settings
                .empty_dir_display
                .unwrap_or(DEFAULT_EMPTY_DIR_DISPLAY),
        })
    }
}

fn default_preset_dir() -> Result<PathBuf> {
    let xdg = BaseDirectories::with_prefix("crossync").map_err(|e| {
        CrossyncError::Config(format!("Failed to initialize XDG directories: {}", e))
    })?;
    xdg.create_config_directory("presets").map_err(|e| {
        CrossyncError::Config(format!("Failed to create preset directory: {}", e))
    })
}
