use crate::error::{CrossyncError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Filesystem kinds that lack POSIX permission and timestamp semantics.
pub const WINDOWS_FS_KINDS: &[&str] = &["ntfs", "ntfs3", "fuseblk", "vfat", "exfat", "msdos"];

pub const UNKNOWN_KIND: &str = "unknown";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Coarse family a filesystem kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FsStyle {
    Posix,
    Windows,
    Unknown,
}

impl FsStyle {
    pub fn of_kind(kind: &str) -> Self {
        let kind = kind.trim().to_lowercase();
        if kind.is_empty() || kind == UNKNOWN_KIND {
            FsStyle::Unknown
        } else if WINDOWS_FS_KINDS.contains(&kind.as_str()) {
            FsStyle::Windows
        } else {
            FsStyle::Posix
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilesystemInfo {
    kind: String,
    mount_point: PathBuf,
    device: String,
}

impl FilesystemInfo {
    pub fn new(kind: &str, mount_point: impl Into<PathBuf>, device: &str) -> Self {
        Self {
            kind: kind.to_lowercase(),
            mount_point: mount_point.into(),
            device: device.to_string(),
        }
    }

    /// Placeholder reported when a path could not be probed.
    pub fn unknown<P: AsRef<Path>>(path: P) -> Self {
        Self::new(UNKNOWN_KIND, path.as_ref(), UNKNOWN_KIND)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn style(&self) -> FsStyle {
        FsStyle::of_kind(&self.kind)
    }

    pub fn is_windows_style(&self) -> bool {
        self.style() == FsStyle::Windows
    }

    pub fn is_unknown(&self) -> bool {
        self.style() == FsStyle::Unknown
    }
}

/// Probes the filesystem backing `path` with `df`.
///
/// Never fails: a timeout, a non-zero exit or unparsable output is logged
/// and reported as an unknown filesystem.
pub fn probe_filesystem<P: AsRef<Path>>(path: P, timeout: Duration) -> FilesystemInfo {
    probe_with("df", path.as_ref(), timeout)
}

fn probe_with(program: &str, path: &Path, timeout: Duration) -> FilesystemInfo {
    match query_df(program, path, timeout) {
        Ok(info) => {
            log::debug!(
                "Probed {}: kind={} mount={} device={}",
                path.display(),
                info.kind(),
                info.mount_point().display(),
                info.device()
            );
            info
        }
        Err(e) => {
            log::warn!("{}", e);
            FilesystemInfo::unknown(path)
        }
    }
}

fn query_df(program: &str, path: &Path, timeout: Duration) -> Result<FilesystemInfo> {
    let probe_failed = |message: String| CrossyncError::ProbeFailed {
        path: path.to_path_buf(),
        message,
    };

    let mut child = Command::new(program)
        .arg("--output=source,target,fstype")
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| probe_failed(format!("failed to execute {}: {}", program, e)))?;

    let status = match wait_with_timeout(&mut child, timeout)
        .map_err(|e| probe_failed(format!("failed waiting for {}: {}", program, e)))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CrossyncError::ProbeTimeout {
                path: path.to_path_buf(),
                timeout_ms: timeout.as_millis(),
            });
        }
    };

    let mut stdout = String::new();
    let mut stderr = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout)?;
    }
    if let Some(mut err) = child.stderr.take() {
        err.read_to_string(&mut stderr)?;
    }

    if !status.success() {
        return Err(probe_failed(format!(
            "{} exited with {}: {}",
            program,
            status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    parse_df_output(&stdout)
        .ok_or_else(|| probe_failed(format!("unexpected {} output: {:?}", program, stdout.trim())))
}

/// Polls `child` until it exits or `timeout` elapses. `None` means timed out.
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Parses `df --output=source,target,fstype` output.
///
/// The first line is the header; the second holds the device, the mount
/// point and the filesystem type.
pub fn parse_df_output(output: &str) -> Option<FilesystemInfo> {
    let line = output.trim().lines().nth(1)?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    Some(FilesystemInfo::new(parts[2], parts[1], parts[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_df_output() {
        let output = "Filesystem     Mounted on Type\n/dev/sdb1      /mnt/data  NTFS3\n";
        let info = parse_df_output(output).unwrap();
        assert_eq!(info.device(), "/dev/sdb1");
        assert_eq!(info.mount_point(), Path::new("/mnt/data"));
        assert_eq!(info.kind(), "ntfs3");
        assert!(info.is_windows_style());
    }

    #[test]
    fn test_parse_df_output_malformed() {
        assert!(parse_df_output("").is_none());
        assert!(parse_df_output("Filesystem Mounted on Type").is_none());
        assert!(parse_df_output("Filesystem Mounted on Type\n/dev/sda1 /").is_none());
    }

    #[test]
    fn test_fs_style_of_kind() {
        assert_eq!(FsStyle::of_kind("ext4"), FsStyle::Posix);
        assert_eq!(FsStyle::of_kind("btrfs"), FsStyle::Posix);
        assert_eq!(FsStyle::of_kind("fuseblk"), FsStyle::Windows);
        assert_eq!(FsStyle::of_kind("VFAT"), FsStyle::Windows);
        assert_eq!(FsStyle::of_kind("unknown"), FsStyle::Unknown);
        assert_eq!(FsStyle::of_kind(""), FsStyle::Unknown);
    }

    #[test]
    fn test_unknown_info() {
        let info = FilesystemInfo::unknown("/some/where");
        assert_eq!(info.kind(), "unknown");
        assert_eq!(info.device(), "unknown");
        assert_eq!(info.mount_point(), Path::new("/some/where"));
        assert!(info.is_unknown());
    }

    #[test]
    fn test_probe_missing_path_degrades_to_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let info = probe_filesystem(&missing, DEFAULT_PROBE_TIMEOUT);
        assert!(info.is_unknown());
        assert_eq!(info.mount_point(), missing.as_path());
    }

    #[test]
    fn test_query_missing_program_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = query_df(
            "crossync-no-such-df-binary",
            temp_dir.path(),
            DEFAULT_PROBE_TIMEOUT,
        );
        assert!(matches!(result, Err(CrossyncError::ProbeFailed { .. })));
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join(name);
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_query_reads_df_style_output() {
        let temp_dir = TempDir::new().unwrap();
        let program = write_script(
            temp_dir.path(),
            "fake-df",
            "printf 'Filesystem Mounted on Type\\n/dev/sdc1 /mnt/usb exfat\\n'",
        );

        let info = query_df(&program, temp_dir.path(), DEFAULT_PROBE_TIMEOUT).unwrap();
        assert_eq!(info.kind(), "exfat");
        assert_eq!(info.device(), "/dev/sdc1");
        assert_eq!(info.mount_point(), Path::new("/mnt/usb"));
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_df_times_out_and_degrades_to_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let program = write_script(temp_dir.path(), "slow-df", "exec sleep 5");
        let timeout = Duration::from_millis(100);

        let result = query_df(&program, temp_dir.path(), timeout);
        match result {
            Err(CrossyncError::ProbeTimeout { path, timeout_ms }) => {
                assert_eq!(path, temp_dir.path());
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("expected ProbeTimeout, got {:?}", other),
        }

        let info = probe_with(&program, temp_dir.path(), timeout);
        assert_eq!(info, FilesystemInfo::unknown(temp_dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_df_degrades_to_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let program = write_script(temp_dir.path(), "broken-df", "echo 'df: no such mount' >&2; exit 1");

        let result = query_df(&program, temp_dir.path(), DEFAULT_PROBE_TIMEOUT);
        assert!(matches!(result, Err(CrossyncError::ProbeFailed { .. })));

        let info = probe_with(&program, temp_dir.path(), DEFAULT_PROBE_TIMEOUT);
        assert!(info.is_unknown());
    }

    #[test]
    fn test_wait_with_timeout_expires() {
        let mut child = match Command::new("sleep").arg("5").spawn() {
            Ok(child) => child,
            Err(_) => {
                println!("Skipping test_wait_with_timeout_expires: sleep not available");
                return;
            }
        };

        let status = wait_with_timeout(&mut child, Duration::from_millis(100)).unwrap();
        assert!(status.is_none());

        child.kill().unwrap();
        child.wait().unwrap();
    }
}
