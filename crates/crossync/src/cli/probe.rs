use crate::cli::report::Reporter;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use crossync_lib::util::with_spinner;
use crossync_lib::{probe_filesystem, scan_empty_directories, Config, CrossyncError, FsStyle, Result};
use std::path::{Path, PathBuf};

pub fn handle_probe_command(config: &Config, paths: &[PathBuf], quiet: bool) -> Result<bool> {
    let infos: Vec<_> = with_spinner("Probing filesystems...", quiet, || {
        paths
            .iter()
            .map(|path| (path, probe_filesystem(path, config.probe_timeout)))
            .collect()
    });

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Cyan),
        Cell::new("Kind").fg(Color::Cyan),
        Cell::new("Style").fg(Color::Cyan),
        Cell::new("Mount").fg(Color::Cyan),
        Cell::new("Device").fg(Color::Cyan),
    ]);

    let mut all_known = true;
    for (path, info) in &infos {
        let style_cell = match info.style() {
            FsStyle::Posix => Cell::new("POSIX").fg(Color::Green),
            FsStyle::Windows => Cell::new("Windows").fg(Color::Yellow),
            FsStyle::Unknown => {
                all_known = false;
                Cell::new("unknown").fg(Color::Red)
            }
        };
        table.add_row(vec![
            Cell::new(path.display()),
            Cell::new(info.kind()),
            style_cell,
            Cell::new(info.mount_point().display()),
            Cell::new(info.device()),
        ]);
    }

    println!("{table}");
    Ok(all_known)
}

/// The listing is the command's result, so it is printed even under `-q`.
pub fn handle_empty_dirs_command(config: &Config, path: &Path, quiet: bool) -> Result<bool> {
    if !path.is_dir() {
        return Err(CrossyncError::PathNotFound(path.to_path_buf()));
    }

    let message = format!("Scanning {}...", path.display());
    let report = with_spinner(&message, quiet, || scan_empty_directories(path));

    println!("{} {}", style(">>>").cyan(), path.display());
    Reporter::stdout(false).empty_dirs(&report, config.empty_dir_display, true)?;
    Ok(true)
}
