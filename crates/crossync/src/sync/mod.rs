pub mod filter;
pub mod orchestrator;
pub mod rsync;
pub mod scenario;

pub use filter::{compile_filters, CompiledFilterRules, FilterRule, FilterRulesBuilder, FilterSpec, FilterVerb};
pub use orchestrator::{post_sync_advice, PreparedSync, SyncOrchestrator, SyncOutcome};
pub use rsync::{
    execute_transfer, is_rsync_available, synthesize, with_trailing_separator, SyncMode, SyncPlan,
    TransferCommand,
};
pub use scenario::{classify, classify_kinds, ScenarioType, SyncScenario};
