pub mod config;
pub mod error;
pub mod index;
pub mod preset;
pub mod sync;
pub mod util;

pub use config::Config;
pub use error::{CrossyncError, Result};
pub use index::{
    probe_filesystem, scan_empty_directories, EmptyDirectoryReport, FilesystemInfo, FsStyle,
};
pub use preset::{Preset, PresetEntry, PresetStore};
pub use sync::{
    classify, compile_filters, synthesize, CompiledFilterRules, FilterSpec, PreparedSync,
    ScenarioType, SyncMode, SyncOrchestrator, SyncOutcome, SyncPlan, SyncScenario,
    TransferCommand,
};
