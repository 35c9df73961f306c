//! Named sync presets, one JSON file per preset.
//!
//! Files named `preset_<name>.json` in the preset directory are loaded in
//! file-name order and numbered from 1. A file that fails to parse is logged
//! and skipped so one broken preset does not hide the others.

use crate::error::{CrossyncError, Result};
use crate::sync::filter::FilterSpec;
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PRESET_FILE_PATTERN: &str = "preset_*.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default)]
    pub folder_white_list: Option<Vec<String>>,
    #[serde(default)]
    pub folder_black_list: Option<Vec<String>>,
    #[serde(default)]
    pub extension_white_list: Option<Vec<String>>,
    #[serde(default)]
    pub extension_black_list: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Preset {
    /// Loads a preset, naming it after the file when `name` is missing.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut preset: Preset = serde_json::from_str(&contents)?;

        if preset.name.trim().is_empty() {
            preset.name = name_from_file(path);
        }

        Ok(preset)
    }

    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            folder_allow: self.folder_white_list.clone().unwrap_or_default(),
            folder_deny: self.folder_black_list.clone().unwrap_or_default(),
            ext_allow: self.extension_white_list.clone().unwrap_or_default(),
            ext_deny: self.extension_black_list.clone().unwrap_or_default(),
        }
    }
}

fn name_from_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    stem.strip_prefix("preset_").unwrap_or(&stem).to_string()
}

#[derive(Debug, Clone)]
pub struct PresetEntry {
    pub id: usize,
    pub path: PathBuf,
    pub preset: Preset,
}

#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    dir: PathBuf,
    entries: Vec<PresetEntry>,
}

impl PresetStore {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            log::warn!("Preset directory {} does not exist", dir.display());
            return Ok(Self {
                dir: dir.to_path_buf(),
                entries: Vec::new(),
            });
        }

        let matcher = preset_matcher()?;
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_name().map(|n| matcher.is_match(n)).unwrap_or(false))
            .collect();
        files.sort();

        let mut entries = Vec::new();
        for path in files {
            match Preset::from_file(&path) {
                Ok(preset) => {
                    log::info!("Loaded preset: {}", preset.name);
                    entries.push(PresetEntry {
                        id: entries.len() + 1,
                        path,
                        preset,
                    });
                }
                Err(e) => {
                    log::error!("Failed to load preset {}: {}", path.display(), e);
                }
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PresetEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a preset up by its 1-based number or by name.
    pub fn get(&self, key: &str) -> Option<&PresetEntry> {
        let key = key.trim();
        if let Ok(id) = key.parse::<usize>() {
            if let Some(entry) = self.entries.iter().find(|e| e.id == id) {
                return Some(entry);
            }
        }
        self.entries.iter().find(|e| e.preset.name == key)
    }

    pub fn require(&self, key: &str) -> Result<&PresetEntry> {
        self.get(key)
            .ok_or_else(|| CrossyncError::PresetNotFound(key.to_string()))
    }
}

fn preset_matcher() -> Result<GlobMatcher> {
    Glob::new(PRESET_FILE_PATTERN)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| CrossyncError::Config(format!("Invalid preset pattern: {}", e)))
}
