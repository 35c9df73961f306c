//! Classification of a source/destination pair into a sync scenario.
//!
//! The scenario decides which rsync flags are safe to use. It is a pure
//! function of the two filesystem kinds, looked up over the
//! [`FsStyle`] of each side.

use crate::index::{FilesystemInfo, FsStyle};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScenarioType {
    PosixToPosix,
    PosixToWindows,
    WindowsToPosix,
    WindowsToWindows,
    Unknown,
}

impl ScenarioType {
    pub fn from_styles(source: FsStyle, dest: FsStyle) -> Self {
        match (source, dest) {
            (FsStyle::Posix, FsStyle::Posix) => ScenarioType::PosixToPosix,
            (FsStyle::Posix, FsStyle::Windows) => ScenarioType::PosixToWindows,
            (FsStyle::Windows, FsStyle::Posix) => ScenarioType::WindowsToPosix,
            (FsStyle::Windows, FsStyle::Windows) => ScenarioType::WindowsToWindows,
            (FsStyle::Unknown, _) | (_, FsStyle::Unknown) => ScenarioType::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioType::PosixToPosix => "POSIX to POSIX",
            ScenarioType::PosixToWindows => "POSIX to Windows",
            ScenarioType::WindowsToPosix => "Windows to POSIX",
            ScenarioType::WindowsToWindows => "Windows to Windows",
            ScenarioType::Unknown => "Unknown scenario",
        }
    }

    /// One side is Windows-style and the other POSIX-style.
    pub fn is_cross_platform(&self) -> bool {
        matches!(
            self,
            ScenarioType::PosixToWindows | ScenarioType::WindowsToPosix
        )
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            ScenarioType::WindowsToPosix => &[
                "--modify-window=2 (widen the timestamp comparison window)",
                "--no-perms (ignore Windows permissions)",
                "--no-owner --no-group (ignore owner and group)",
            ],
            ScenarioType::PosixToWindows => &[
                "--modify-window=2 (widen the timestamp comparison window)",
                "--no-perms (ignore POSIX permissions)",
                "--no-owner --no-group (ignore owner and group)",
            ],
            ScenarioType::PosixToPosix => &[
                "-a (archive mode, preserve all attributes)",
                "--modify-window=1 (standard timestamp window)",
            ],
            ScenarioType::WindowsToWindows => &[
                "--modify-window=2 (widen the timestamp comparison window)",
                "-rlt (recursive, links, times)",
            ],
            ScenarioType::Unknown => &[
                "--modify-window=2 (conservative timestamp window)",
                "-rlt (basic file attributes only)",
            ],
        }
    }

    pub fn warnings(&self) -> &'static [&'static str] {
        match self {
            ScenarioType::WindowsToPosix => &[
                "Timestamp precision differs: Windows (100ns) vs POSIX (1s)",
                "Permission systems are incompatible",
                "Symlink handling may differ",
            ],
            ScenarioType::PosixToWindows => &[
                "Timestamp precision differs between the filesystems",
                "Permission information will be lost",
                "Symlinks may not be created",
            ],
            ScenarioType::PosixToPosix | ScenarioType::WindowsToWindows => &[],
            ScenarioType::Unknown => {
                &["At least one filesystem could not be identified; using conservative flags"]
            }
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncScenario {
    pub source_kind: String,
    pub dest_kind: String,
    pub scenario_type: ScenarioType,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

impl SyncScenario {
    pub fn dest_is_windows_style(&self) -> bool {
        FsStyle::of_kind(&self.dest_kind) == FsStyle::Windows
    }
}

pub fn classify(source: &FilesystemInfo, dest: &FilesystemInfo) -> SyncScenario {
    classify_kinds(source.kind(), dest.kind())
}

pub fn classify_kinds(source_kind: &str, dest_kind: &str) -> SyncScenario {
    let scenario_type =
        ScenarioType::from_styles(FsStyle::of_kind(source_kind), FsStyle::of_kind(dest_kind));

    SyncScenario {
        source_kind: source_kind.to_lowercase(),
        dest_kind: dest_kind.to_lowercase(),
        scenario_type,
        recommendations: scenario_type.recommendations().iter().map(|s| s.to_string()).collect(),
        warnings: scenario_type.warnings().iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::WINDOWS_FS_KINDS;
    use proptest::prelude::*;

    #[test]
    fn test_windows_to_posix() {
        let scenario = classify_kinds("ntfs", "ext4");
        assert_eq!(scenario.scenario_type, ScenarioType::WindowsToPosix);
        assert_eq!(scenario.warnings.len(), 3);
        assert!(scenario.recommendations[0].starts_with("--modify-window=2"));
        assert!(!scenario.dest_is_windows_style());
    }

    #[test]
    fn test_posix_to_windows() {
        let scenario = classify_kinds("ext4", "exfat");
        assert_eq!(scenario.scenario_type, ScenarioType::PosixToWindows);
        assert_eq!(scenario.warnings.len(), 3);
        assert!(scenario.dest_is_windows_style());
    }

    #[test]
    fn test_posix_to_posix_has_no_warnings() {
        let scenario = classify_kinds("ext4", "btrfs");
        assert_eq!(scenario.scenario_type, ScenarioType::PosixToPosix);
        assert!(scenario.warnings.is_empty());
        assert!(scenario.recommendations[0].starts_with("-a"));
    }

    #[test]
    fn test_windows_to_windows() {
        let scenario = classify_kinds("NTFS", "vfat");
        assert_eq!(scenario.scenario_type, ScenarioType::WindowsToWindows);
        assert!(scenario.warnings.is_empty());
        assert_eq!(scenario.source_kind, "ntfs");
    }

    #[test]
    fn test_unknown_probe_gives_unknown_scenario() {
        let source = FilesystemInfo::unknown("/src");
        let dest = FilesystemInfo::new("ext4", "/", "/dev/sda1");
        let scenario = classify(&source, &dest);
        assert_eq!(scenario.scenario_type, ScenarioType::Unknown);
        assert!(scenario.recommendations.iter().any(|r| r.starts_with("-rlt")));
    }

    fn any_kind() -> impl Strategy<Value = String> {
        prop_oneof![
            proptest::sample::select(WINDOWS_FS_KINDS.to_vec()).prop_map(String::from),
            proptest::sample::select(vec!["ext4", "xfs", "btrfs", "zfs", "tmpfs", "nfs"])
                .prop_map(String::from),
            Just("unknown".to_string()),
            "[a-z0-9]{0,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_classification_depends_only_on_kinds(a in any_kind(), b in any_kind()) {
            prop_assert_eq!(classify_kinds(&a, &b), classify_kinds(&a, &b));
        }

        #[test]
        fn prop_swap_mirrors_cross_platform(a in any_kind(), b in any_kind()) {
            let forward = classify_kinds(&a, &b).scenario_type;
            let backward = classify_kinds(&b, &a).scenario_type;
            let expected = match forward {
                ScenarioType::PosixToWindows => ScenarioType::WindowsToPosix,
                ScenarioType::WindowsToPosix => ScenarioType::PosixToWindows,
                same => same,
            };
            prop_assert_eq!(backward, expected);
        }
    }
}
