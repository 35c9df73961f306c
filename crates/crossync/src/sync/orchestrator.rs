use crate::config::Config;
use crate::error::{CrossyncError, Result};
use crate::index::{probe_filesystem, scan_empty_directories, EmptyDirectoryReport, FilesystemInfo};
use crate::preset::Preset;
use crate::sync::filter::{compile_filters, CompiledFilterRules};
use crate::sync::rsync::{execute_transfer, synthesize, SyncPlan, TransferCommand};
use crate::sync::scenario::{classify, SyncScenario};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Everything decided before the transfer tool runs.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedSync {
    pub preset_name: String,
    pub plan: SyncPlan,
    pub source_fs: FilesystemInfo,
    pub dest_fs: FilesystemInfo,
    pub scenario: SyncScenario,
    pub empty_dirs: EmptyDirectoryReport,
    pub filters: CompiledFilterRules,
    pub command: TransferCommand,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub scenario: SyncScenario,
    pub empty_dirs: EmptyDirectoryReport,
    pub command: TransferCommand,
    /// `None` when the command was planned but not executed.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct SyncOrchestrator {
    config: Config,
}

impl SyncOrchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate_paths(&self, source: &Path, destination: &Path, auto_create: bool) -> Result<()> {
        if !source.exists() {
            return Err(CrossyncError::PathNotFound(source.to_path_buf()));
        }

        if !destination.exists() {
            if !auto_create {
                return Err(CrossyncError::DestinationMissing(destination.to_path_buf()));
            }
            fs::create_dir_all(destination)?;
            log::info!("Created destination directory: {}", destination.display());
        }

        Ok(())
    }

    /// Probes, classifies, scans and synthesizes without running anything.
    pub fn prepare(&self, preset: &Preset, plan: SyncPlan) -> Result<PreparedSync> {
        let filters = compile_filters(&preset.filter_spec())?;

        let source_fs = probe_filesystem(&preset.source, self.config.probe_timeout);
        let dest_fs = probe_filesystem(&preset.destination, self.config.probe_timeout);
        let scenario = classify(&source_fs, &dest_fs);

        log::debug!("Sync scenario analysis:");
        log::debug!("  Source: {}", preset.source.display());
        log::debug!(
            "    Filesystem: {}, mount: {}",
            source_fs.kind(),
            source_fs.mount_point().display()
        );
        log::debug!("  Destination: {}", preset.destination.display());
        log::debug!(
            "    Filesystem: {}, mount: {}",
            dest_fs.kind(),
            dest_fs.mount_point().display()
        );
        log::debug!("Sync type: {}", scenario.scenario_type);

        for warning in &scenario.warnings {
            log::debug!("  {}", warning);
        }

        let empty_dirs = scan_empty_directories(&preset.source);

        let command = synthesize(
            &scenario,
            &plan,
            &filters,
            &preset.source,
            &preset.destination,
        )
        .with_program(self.config.rsync_binary.clone());

        log::debug!("Full command: {}", command);

        Ok(PreparedSync {
            preset_name: preset.name.clone(),
            plan,
            source_fs,
            dest_fs,
            scenario,
            empty_dirs,
            filters,
            command,
        })
    }

    /// Validates paths, prepares and runs the transfer.
    pub fn run(&self, preset: &Preset, plan: SyncPlan, auto_create: bool) -> Result<SyncOutcome> {
        self.validate_paths(&preset.source, &preset.destination, auto_create)?;
        let prepared = self.prepare(preset, plan)?;
        self.execute(prepared)
    }

    pub fn execute(&self, prepared: PreparedSync) -> Result<SyncOutcome> {
        let started_at = Utc::now();
        let result = execute_transfer(&prepared.command)?;
        let finished_at = Utc::now();

        if result.success {
            log::info!("Sync operation completed");
            if prepared.plan.dry_run {
                log::info!("This was a dry run; drop --dry-run to transfer files");
            } else {
                for advice in post_sync_advice(&prepared.scenario, prepared.plan.prune_empty_dirs) {
                    log::info!("  - {}", advice);
                }
            }
        } else {
            log::error!("Sync failed, exit code: {}", result.exit_code);
        }

        Ok(SyncOutcome {
            scenario: prepared.scenario,
            empty_dirs: prepared.empty_dirs,
            command: prepared.command,
            exit_code: Some(result.exit_code),
            success: result.success,
            started_at,
            finished_at,
        })
    }
}

impl SyncOutcome {
    /// Outcome for a command that was only planned.
    pub fn planned(prepared: PreparedSync) -> Self {
        let now = Utc::now();
        Self {
            scenario: prepared.scenario,
            empty_dirs: prepared.empty_dirs,
            command: prepared.command,
            exit_code: None,
            success: true,
            started_at: now,
            finished_at: now,
        }
    }
}

/// Follow-up checks worth doing after a real (non dry-run) sync.
pub fn post_sync_advice(scenario: &SyncScenario, prune_empty_dirs: bool) -> Vec<&'static str> {
    let mut advice = Vec::new();

    if scenario.scenario_type.is_cross_platform() {
        advice.push("Verify file integrity");
        advice.push("Check timestamps");
        if prune_empty_dirs {
            advice.push("Check for empty directories that were not transferred");
        }
        advice.push("Verify file counts");
    } else {
        advice.push("Quick verification");
        if !prune_empty_dirs {
            advice.push("Review the empty directory structure");
        }
        advice.push("Check permissions (POSIX to POSIX only)");
    }

    advice
}
