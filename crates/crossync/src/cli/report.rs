use console::style;
use crossync_lib::util::{format_elapsed, format_timestamp};
use crossync_lib::{CrossyncError, EmptyDirectoryReport, PreparedSync, SyncOutcome};
use std::io::{self, Stdout, Write};

/// Writes the report blocks of a sync. A quiet reporter writes nothing.
pub struct Reporter<W: Write> {
    out: W,
    quiet: bool,
}

impl Reporter<Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    /// Scenario, empty directories and command, in that order.
    pub fn prepared(&mut self, prepared: &PreparedSync, display_limit: usize) -> io::Result<()> {
        self.scenario(prepared)?;
        self.empty_dirs(
            &prepared.empty_dirs,
            display_limit,
            prepared.plan.prune_empty_dirs,
        )?;
        self.command(prepared)
    }

    pub fn scenario(&mut self, prepared: &PreparedSync) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let scenario = &prepared.scenario;
        let out = &mut self.out;

        writeln!(out, "\n{}", style("Sync Scenario").bold().cyan())?;
        writeln!(out, "{}", style("═".repeat(60)).dim())?;
        writeln!(out, "  Preset: {}", style(&prepared.preset_name).bold())?;
        writeln!(
            out,
            "  Source: {} ({})",
            prepared.command.source().display(),
            style(prepared.source_fs.kind()).cyan()
        )?;
        writeln!(
            out,
            "  Destination: {} ({})",
            prepared.command.destination().display(),
            style(prepared.dest_fs.kind()).cyan()
        )?;
        writeln!(out, "  Type: {}", style(scenario.scenario_type).bold())?;
        writeln!(out, "  Mode: {}", prepared.plan.mode.description())?;

        if !scenario.recommendations.is_empty() {
            writeln!(out, "\n{}", style("Recommended parameters").bold())?;
            for rec in &scenario.recommendations {
                writeln!(out, "  {} {}", style("✓").green(), rec)?;
            }
        }

        if !scenario.warnings.is_empty() {
            writeln!(out, "\n{}", style("Warnings").bold())?;
            for warning in &scenario.warnings {
                writeln!(out, "  {} {}", style("!").yellow(), warning)?;
            }
        }
        Ok(())
    }

    pub fn empty_dirs(
        &mut self,
        report: &EmptyDirectoryReport,
        display_limit: usize,
        prune: bool,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let out = &mut self.out;

        writeln!(out, "\n{}", style("Empty directories").bold())?;

        if report.is_empty() {
            writeln!(out, "  None found")?;
            return Ok(());
        }

        let count = if report.is_truncated() {
            format!("{}+", report.len())
        } else {
            report.len().to_string()
        };

        if prune {
            writeln!(out, "  {} empty directories will not be synced", style(count).cyan())?;
        } else {
            writeln!(out, "  {} empty directories will be synced", style(count).yellow())?;
        }

        for dir in report.dirs().iter().take(display_limit) {
            writeln!(out, "    {}", style(dir.display()).dim())?;
        }
        if report.len() > display_limit {
            writeln!(out, "    ... and {} more", report.len() - display_limit)?;
        }
        Ok(())
    }

    pub fn command(&mut self, prepared: &PreparedSync) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "\n{}", style("Command").bold())?;
        writeln!(self.out, "  {}", prepared.command)?;
        if prepared.plan.dry_run {
            writeln!(self.out, "  {}", style("Mode: DRY RUN").yellow())?;
        }
        writeln!(self.out)
    }

    pub fn outcome(&mut self, outcome: &SyncOutcome) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        match outcome.exit_code {
            Some(_) if outcome.success => writeln!(
                self.out,
                "\n{} Sync completed at {} in {}",
                style("✓").green(),
                format_timestamp(&outcome.finished_at),
                format_elapsed(&outcome.started_at, &outcome.finished_at)
            ),
            Some(code) => writeln!(
                self.out,
                "\n{} Sync failed with exit code {}",
                style("✗").red(),
                code
            ),
            None => writeln!(self.out, "\n{} Nothing executed", style("-").dim()),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

pub fn print_error(err: &CrossyncError) {
    eprintln!("{} {}", style("Error:").red().bold(), err);
    eprintln!("  {} {}", style("Hint:").yellow(), err.remediation());
}
