mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use crossync_lib::Config;
use std::io::Write;
use std::process::ExitCode;

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if !verbose {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = Config::new(cli.preset_dir.clone(), cli.config.clone())
        .context("Failed to load configuration")?;

    log::debug!("Preset directory: {}", config.preset_dir.display());

    let quiet = cli.quiet;
    let result = match cli.command.unwrap_or(cli::Commands::Interactive) {
        cli::Commands::Run {
            preset,
            plan,
            auto_create_dest,
            yes,
        } => cli::run::handle_run_command(config, &preset, &plan, auto_create_dest, yes, quiet),

        cli::Commands::Plan { preset, plan, json } => {
            cli::run::handle_plan_command(config, &preset, &plan, json, quiet)
        }

        cli::Commands::List => cli::list::handle_list_command(&config),

        cli::Commands::Probe { paths } => cli::probe::handle_probe_command(&config, &paths, quiet),

        cli::Commands::EmptyDirs { path } => {
            cli::probe::handle_empty_dirs_command(&config, &path, quiet)
        }

        cli::Commands::Interactive => cli::interactive::handle_interactive_command(config, quiet),
    };

    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            cli::report::print_error(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}
