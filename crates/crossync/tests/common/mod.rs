use crossync_lib::config::FileSettings;
use crossync_lib::{Config, Preset, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestFixture {
    pub temp_dir: TempDir,
    pub preset_dir: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let preset_dir = temp_dir.path().join("presets");
        let source = temp_dir.path().join("source");
        let destination = temp_dir.path().join("destination");
        fs::create_dir_all(&preset_dir)?;
        fs::create_dir_all(&source)?;

        Ok(Self {
            temp_dir,
            preset_dir,
            source,
            destination,
        })
    }

    /// Config pointing at this fixture, running `program` in place of rsync.
    pub fn config(&self, program: &str) -> Config {
        let settings = FileSettings {
            rsync_binary: Some(program.to_string()),
            ..Default::default()
        };
        Config::resolve(Some(self.preset_dir.clone()), None, settings, |_| None)
            .expect("fixture config")
    }

    pub fn write_preset(&self, file_name: &str, json: &str) -> Result<()> {
        fs::write(self.preset_dir.join(file_name), json)?;
        Ok(())
    }

    pub fn preset(&self, name: &str) -> Preset {
        Preset {
            name: name.to_string(),
            source: self.source.clone(),
            destination: self.destination.clone(),
            folder_white_list: None,
            folder_black_list: None,
            extension_white_list: None,
            extension_black_list: None,
            description: None,
        }
    }

    pub fn touch(&self, relative: &str) -> Result<()> {
        let path = self.source.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"data")?;
        Ok(())
    }

    pub fn mkdir(&self, relative: &str) -> Result<()> {
        fs::create_dir_all(self.source.join(relative))?;
        Ok(())
    }
}

pub fn setup_test_fixture() -> Result<TestFixture> {
    TestFixture::new()
}

pub fn program_exists(program: &str) -> bool {
    std::process::Command::new(program)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
