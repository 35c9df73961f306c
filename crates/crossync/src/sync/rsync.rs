use crate::error::{CrossyncError, Result};
use crate::sync::filter::CompiledFilterRules;
use crate::sync::scenario::{ScenarioType, SyncScenario};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const RSYNC: &str = "rsync";

const BASE_FLAGS: &[&str] = &["-vh", "--progress"];
const ARCHIVE_FLAGS: &[&str] = &["-a", "--modify-window=1"];
const PORTABLE_FLAGS: &[&str] = &[
    "-rlt",
    "--modify-window=2",
    "--no-perms",
    "--no-owner",
    "--no-group",
];
const SIZE_ONLY: &str = "--size-only";
const DELETE: &str = "--delete";
const IGNORE_EXISTING: &str = "--ignore-existing";
const PRUNE_EMPTY_DIRS: &str = "--prune-empty-dirs";
const DRY_RUN: &str = "--dry-run";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Make the destination an exact copy, deleting extraneous files
    #[default]
    Mirror,
    /// Add and update files, never delete
    Update,
    /// Only add files missing from the destination
    Safe,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Mirror => "mirror",
            SyncMode::Update => "update",
            SyncMode::Safe => "safe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SyncMode::Mirror => "Mirror sync (delete extra files in destination)",
            SyncMode::Update => "Incremental update (add/update only)",
            SyncMode::Safe => "Safe sync (never overwrite existing files)",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub mode: SyncMode,
    pub dry_run: bool,
    pub prune_empty_dirs: bool,
}

impl Default for SyncPlan {
    fn default() -> Self {
        Self {
            mode: SyncMode::Mirror,
            dry_run: false,
            prune_empty_dirs: true,
        }
    }
}

/// A fully synthesized rsync invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferCommand {
    program: String,
    flags: Vec<String>,
    source: PathBuf,
    destination: PathBuf,
}

impl TransferCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Everything after the program name: flags, filters, then both paths.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.push(self.source.clone().into_os_string());
        args.push(self.destination.clone().into_os_string());
        args
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        cmd
    }
}

impl fmt::Display for TransferCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for flag in &self.flags {
            write!(f, " {}", shell_quote(flag))?;
        }
        for path in [&self.source, &self.destination] {
            write!(f, " {}", shell_quote(&path.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Appends `/` unless present, so rsync copies directory contents.
///
/// Works on the raw OS string; non-UTF-8 paths pass through byte for byte.
pub fn with_trailing_separator<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut raw = path.as_ref().as_os_str().to_owned();
    if !raw.as_encoded_bytes().ends_with(b"/") {
        raw.push("/");
    }
    PathBuf::from(raw)
}

/// Builds the rsync command for a scenario, plan and filter set.
///
/// Pure: the same inputs always produce the same token sequence.
pub fn synthesize(
    scenario: &SyncScenario,
    plan: &SyncPlan,
    rules: &CompiledFilterRules,
    source: &Path,
    destination: &Path,
) -> TransferCommand {
    let mut flags: Vec<String> = BASE_FLAGS.iter().map(|f| f.to_string()).collect();

    if scenario.scenario_type == ScenarioType::PosixToPosix {
        flags.extend(ARCHIVE_FLAGS.iter().map(|f| f.to_string()));
    } else {
        flags.extend(PORTABLE_FLAGS.iter().map(|f| f.to_string()));
        if scenario.dest_is_windows_style() {
            flags.push(SIZE_ONLY.to_string());
        }
    }

    match plan.mode {
        SyncMode::Mirror => flags.push(DELETE.to_string()),
        SyncMode::Safe => flags.push(IGNORE_EXISTING.to_string()),
        SyncMode::Update => {}
    }

    if plan.prune_empty_dirs {
        flags.push(PRUNE_EMPTY_DIRS.to_string());
    }

    if plan.dry_run {
        flags.push(DRY_RUN.to_string());
    }

    flags.extend(rules.to_args());

    TransferCommand {
        program: RSYNC.to_string(),
        flags,
        source: with_trailing_separator(source),
        destination: with_trailing_separator(destination),
    }
}

pub struct RsyncResult {
    pub success: bool,
    pub exit_code: i32,
}

/// Runs the command with inherited stdio so rsync's progress reaches the terminal.
pub fn execute_transfer(command: &TransferCommand) -> Result<RsyncResult> {
    let mut cmd = command.to_command();
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    log::info!("Executing: {}", command);

    let status = cmd.status().map_err(|e| CrossyncError::ExternalTool {
        tool: command.program().to_string(),
        message: format!("Failed to execute {}: {}", command.program(), e),
    })?;

    let exit_code = status.code().unwrap_or(-1);
    let success = status.success();

    if !success {
        log::error!("{} failed with exit code {}", command.program(), exit_code);
    }

    Ok(RsyncResult { success, exit_code })
}

pub fn is_rsync_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
