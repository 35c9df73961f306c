use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrossyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem probe timed out after {timeout_ms}ms: {path}")]
    ProbeTimeout { path: PathBuf, timeout_ms: u128 },

    #[error("Filesystem probe failed for {path}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("Empty directory scan aborted under {root}: {message}")]
    ScanAborted { root: PathBuf, message: String },

    #[error("Invalid filter spec: {list} entry {value:?} {reason}")]
    InvalidFilterSpec {
        list: &'static str,
        value: String,
        reason: String,
    },

    #[error("Source path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Destination path does not exist: {0}")]
    DestinationMissing(PathBuf),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("External tool error: {tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("User input error: {0}")]
    UserInput(String),
}

impl CrossyncError {
    /// Suggested fix shown to the user alongside the error itself.
    pub fn remediation(&self) -> &'static str {
        match self {
            CrossyncError::Io(_) => "Check that the paths are readable and the disk is mounted",
            CrossyncError::Json(_) => "Fix the JSON syntax in the preset file",
            CrossyncError::Config(_) => "Review crossync.toml and the CROSSYNC_* environment variables",
            CrossyncError::ProbeTimeout { .. } | CrossyncError::ProbeFailed { .. } => {
                "Make sure the path is mounted and `df` responds; the sync falls back to conservative flags"
            }
            CrossyncError::ScanAborted { .. } => "Check permissions on the source tree",
            CrossyncError::InvalidFilterSpec { .. } => {
                "Use bare folder names (no leading '/' or '..') and bare extensions without a dot"
            }
            CrossyncError::PathNotFound(_) => "Check the preset's source path",
            CrossyncError::DestinationMissing(_) => {
                "Create the destination or pass --auto-create-dest"
            }
            CrossyncError::PresetNotFound(_) => "Run `crossync list` to see the available presets",
            CrossyncError::ExternalTool { .. } => {
                "Install rsync (apt install rsync / pacman -S rsync) or set CROSSYNC_RSYNC"
            }
            CrossyncError::UserInput(_) => "Re-run the command from an interactive terminal",
        }
    }
}

impl From<dialoguer::Error> for CrossyncError {
    fn from(err: dialoguer::Error) -> Self {
        CrossyncError::UserInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrossyncError>;
