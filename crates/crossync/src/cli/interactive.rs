//! Menu-driven preset selection, the default when no subcommand is given.

use crate::cli::report::Reporter;
use crate::cli::run::{ensure_rsync, prepare_with_spinner};
use console::{style, Term};
use crossync_lib::{Config, PresetStore, Result, SyncMode, SyncOrchestrator, SyncPlan};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

const MODES: [SyncMode; 3] = [SyncMode::Mirror, SyncMode::Update, SyncMode::Safe];

pub fn handle_interactive_command(config: Config, quiet: bool) -> Result<bool> {
    ensure_rsync(&config.rsync_binary)?;

    let term = Term::stdout();
    let theme = ColorfulTheme::default();

    println!("\n{}", style("Universal File Sync").bold().cyan());
    println!("{}", style("POSIX ↔ POSIX, POSIX ↔ Windows, Windows ↔ POSIX").dim());
    println!("{}\n", style("═".repeat(60)).dim());

    let store = PresetStore::load(&config.preset_dir)?;
    if store.is_empty() {
        println!(
            "{}",
            style(format!("No presets found in {}", store.dir().display())).yellow()
        );
        println!("  Create preset_<name>.json files there to get started");
        return Ok(false);
    }

    let mut items: Vec<String> = store
        .entries()
        .iter()
        .map(|entry| {
            let preset = &entry.preset;
            let mut line = format!(
                "{}. {}  ({} → {})",
                entry.id,
                preset.name,
                preset.source.display(),
                preset.destination.display()
            );
            if let Some(desc) = preset.description.as_deref().filter(|d| !d.is_empty()) {
                line.push_str(&format!("  {}", desc));
            }
            line
        })
        .collect();
    items.push("Exit".to_string());

    let choice = Select::with_theme(&theme)
        .with_prompt("Select preset")
        .items(&items)
        .default(0)
        .interact_on(&term)?;

    if choice == items.len() - 1 {
        println!("Goodbye!");
        return Ok(true);
    }
    let preset = &store.entries()[choice].preset;

    let mode_labels: Vec<String> = MODES
        .iter()
        .map(|mode| format!("{} - {}", mode, mode.description()))
        .collect();
    let mode_idx = Select::with_theme(&theme)
        .with_prompt("Sync mode")
        .items(&mode_labels)
        .default(0)
        .interact_on(&term)?;

    let dry_run = Select::with_theme(&theme)
        .with_prompt("Execution")
        .items(&["Dry run", "Actual execution"])
        .default(0)
        .interact_on(&term)?
        == 0;

    let prune_empty_dirs = Select::with_theme(&theme)
        .with_prompt("Empty directory exclusion")
        .items(&["Enable (recommended)", "Disable"])
        .default(0)
        .interact_on(&term)?
        == 0;

    let plan = SyncPlan {
        mode: MODES[mode_idx],
        dry_run,
        prune_empty_dirs,
    };

    let orchestrator = SyncOrchestrator::new(config);
    orchestrator.validate_paths(&preset.source, &preset.destination, true)?;
    let prepared = prepare_with_spinner(&orchestrator, preset, plan, quiet)?;

    let mut reporter = Reporter::stdout(quiet);
    reporter.prepared(&prepared, orchestrator.config().empty_dir_display)?;

    if !plan.dry_run {
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt("Confirm sync operation?")
            .default(false)
            .interact_on(&term)?;
        if !confirmed {
            println!("{}", style("Operation cancelled").yellow());
            return Ok(false);
        }
    }

    let outcome = orchestrator.execute(prepared)?;
    reporter.outcome(&outcome)?;

    Ok(outcome.success)
}
