pub mod interactive;
pub mod list;
pub mod probe;
pub mod report;
pub mod run;

use clap::{Args, Parser, Subcommand};
use crossync_lib::{SyncMode, SyncPlan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crossync")]
#[command(about = "Sync directory trees across POSIX and Windows filesystems with rsync", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Directory holding preset_*.json files")]
    pub preset_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to crossync.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, short = 'q', global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, short = 'm', value_enum, default_value_t = SyncMode::Mirror, help = "Sync mode")]
    pub mode: SyncMode,

    #[arg(long, short = 'n', help = "Simulate only, pass --dry-run to rsync")]
    pub dry_run: bool,

    #[arg(long, help = "Keep empty directories instead of pruning them")]
    pub no_exclude_empty: bool,
}

impl PlanArgs {
    pub fn to_plan(&self) -> SyncPlan {
        SyncPlan {
            mode: self.mode,
            dry_run: self.dry_run,
            prune_empty_dirs: !self.no_exclude_empty,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run a preset sync")]
    Run {
        #[arg(help = "Preset number or name")]
        preset: String,

        #[command(flatten)]
        plan: PlanArgs,

        #[arg(long, help = "Create the destination directory if missing")]
        auto_create_dest: bool,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    #[command(about = "Show the scenario and rsync command for a preset without running it")]
    Plan {
        #[arg(help = "Preset number or name")]
        preset: String,

        #[command(flatten)]
        plan: PlanArgs,

        #[arg(long, help = "Print the plan as JSON")]
        json: bool,
    },

    #[command(about = "List available presets")]
    List,

    #[command(about = "Show the filesystem backing each path")]
    Probe {
        #[arg(required = true, help = "Paths to probe")]
        paths: Vec<PathBuf>,
    },

    #[command(about = "List empty directories under a path")]
    EmptyDirs {
        #[arg(help = "Directory to scan")]
        path: PathBuf,
    },

    #[command(about = "Pick a preset and options from a menu (default)")]
    Interactive,
}
