use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use crossync_lib::{Config, PresetStore, Result};

pub fn handle_list_command(config: &Config) -> Result<bool> {
    let store = PresetStore::load(&config.preset_dir)?;

    if store.is_empty() {
        println!(
            "{}",
            style(format!("No presets found in {}", store.dir().display())).yellow()
        );
        println!("  Create preset_<name>.json files there to get started");
        return Ok(true);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Source").fg(Color::Cyan),
        Cell::new("Destination").fg(Color::Cyan),
        Cell::new("Filters").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
    ]);

    for entry in store.entries() {
        let preset = &entry.preset;
        let spec = preset.filter_spec();
        let filters = if spec.is_empty() {
            "-".to_string()
        } else if spec.has_allow_list() {
            "allow-list".to_string()
        } else {
            "deny-list".to_string()
        };

        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(&preset.name),
            Cell::new(preset.source.display()),
            Cell::new(preset.destination.display()),
            Cell::new(filters),
            Cell::new(preset.description.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
    Ok(true)
}
