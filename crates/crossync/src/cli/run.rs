use crate::cli::report::Reporter;
use crate::cli::PlanArgs;
use console::style;
use crossync_lib::sync::is_rsync_available;
use crossync_lib::util::with_spinner;
use crossync_lib::{
    Config, CrossyncError, PreparedSync, Preset, PresetStore, Result, SyncOrchestrator,
    SyncOutcome, SyncPlan,
};
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Runs a preset. Returns whether the transfer succeeded.
pub fn handle_run_command(
    config: Config,
    preset_key: &str,
    args: &PlanArgs,
    auto_create_dest: bool,
    yes: bool,
    quiet: bool,
) -> Result<bool> {
    ensure_rsync(&config.rsync_binary)?;

    let store = PresetStore::load(&config.preset_dir)?;
    let entry = store.require(preset_key)?;
    let preset = &entry.preset;
    let plan = args.to_plan();

    let orchestrator = SyncOrchestrator::new(config);
    orchestrator.validate_paths(&preset.source, &preset.destination, auto_create_dest)?;

    let prepared = prepare_with_spinner(&orchestrator, preset, plan, quiet)?;
    let mut reporter = Reporter::stdout(quiet);
    reporter.prepared(&prepared, orchestrator.config().empty_dir_display)?;

    if !plan.dry_run && !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Start the sync?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", style("Operation cancelled").yellow());
            return Ok(false);
        }
    }

    let outcome = orchestrator.execute(prepared)?;
    reporter.outcome(&outcome)?;

    Ok(outcome.success)
}

/// Prints what `run` would do, without touching the destination.
pub fn handle_plan_command(
    config: Config,
    preset_key: &str,
    args: &PlanArgs,
    json: bool,
    quiet: bool,
) -> Result<bool> {
    let store = PresetStore::load(&config.preset_dir)?;
    let entry = store.require(preset_key)?;
    let preset = &entry.preset;
    let plan = args.to_plan();

    let orchestrator = SyncOrchestrator::new(config);
    orchestrator.validate_paths(&preset.source, &preset.destination, false)?;
    let prepared = prepare_with_spinner(&orchestrator, preset, plan, quiet || json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(true);
    }

    let mut reporter = Reporter::stdout(quiet);
    reporter.prepared(&prepared, orchestrator.config().empty_dir_display)?;
    reporter.outcome(&SyncOutcome::planned(prepared))?;

    Ok(true)
}

pub fn prepare_with_spinner(
    orchestrator: &SyncOrchestrator,
    preset: &Preset,
    plan: SyncPlan,
    quiet: bool,
) -> Result<PreparedSync> {
    let message = format!("Analyzing {}...", preset.name);
    with_spinner(&message, quiet, || orchestrator.prepare(preset, plan))
}

pub fn ensure_rsync(program: &str) -> Result<()> {
    if is_rsync_available(program) {
        return Ok(());
    }
    Err(CrossyncError::ExternalTool {
        tool: program.to_string(),
        message: "command not found or not runnable".to_string(),
    })
}
