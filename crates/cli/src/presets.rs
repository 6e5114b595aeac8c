// billmerge presets - manage the saved extraction presets

use std::path::Path;

use billmerge_config::{Mapping, Preset, PresetStore, PresetUpdate};
use clap::Subcommand;

use crate::CliError;

#[derive(Subcommand)]
pub enum PresetCommands {
    /// List preset names in file order
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one preset's settings and mappings
    Show {
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a preset
    #[command(after_help = "\
Examples:
  billmerge presets add Hotel --map Date=A1 --map Guest=B2 --keyword 'after-discount total'
  billmerge presets add Utility --map Period=C4 --column F --keyword Due")]
    Add {
        name: String,

        /// Field mapping as NAME=CELL (repeatable, order kept)
        #[arg(long = "map", value_name = "NAME=CELL", required = true, value_parser = parse_mapping)]
        mappings: Vec<Mapping>,

        /// Column scanned for the settlement label
        #[arg(long)]
        column: Option<String>,

        /// Text the settlement label contains (case-sensitive)
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Change an existing preset; omitted options are left alone
    Edit {
        name: String,

        /// Replace all mappings (repeatable)
        #[arg(long = "map", value_name = "NAME=CELL", value_parser = parse_mapping)]
        mappings: Vec<Mapping>,

        #[arg(long)]
        column: Option<String>,

        #[arg(long)]
        keyword: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a preset
    Remove { name: String },

    /// Rename a preset, keeping its position
    Rename { old: String, new: String },

    /// Copy a preset under a new name
    Duplicate { name: String, new: String },
}

pub fn cmd_presets(config: &Path, command: PresetCommands) -> Result<(), CliError> {
    let mut store = PresetStore::open(config).map_err(CliError::config)?;

    match command {
        PresetCommands::List { json } => {
            if json {
                print_json(&store.list_preset_names())?;
            } else {
                for preset in store.presets() {
                    println!("{}  ({} fields)", preset.name, preset.mappings.len());
                }
            }
        }
        PresetCommands::Show { name, json } => {
            let preset = store
                .get_preset(&name)
                .ok_or_else(|| CliError::preset_not_found(&name))?;
            if json {
                print_json(preset)?;
            } else {
                print_preset(preset);
            }
        }
        PresetCommands::Add {
            name,
            mappings,
            column,
            keyword,
            description,
        } => {
            let mut preset = Preset::new(name.clone());
            preset.description = description;
            preset.mappings = mappings;
            if let Some(column) = column {
                preset.settlement_search_column = column;
            }
            if let Some(keyword) = keyword {
                preset.settlement_search_keyword = keyword;
            }
            store.add_preset(preset).map_err(CliError::config)?;
            println!("added preset '{name}'");
        }
        PresetCommands::Edit {
            name,
            mappings,
            column,
            keyword,
            description,
        } => {
            let update = PresetUpdate {
                description,
                mappings: (!mappings.is_empty()).then_some(mappings),
                settlement_search_column: column,
                settlement_search_keyword: keyword,
            };
            store.update_preset(&name, update).map_err(CliError::config)?;
            println!("updated preset '{name}'");
        }
        PresetCommands::Remove { name } => {
            store.delete_preset(&name).map_err(CliError::config)?;
            println!("removed preset '{name}'");
        }
        PresetCommands::Rename { old, new } => {
            store.rename_preset(&old, &new).map_err(CliError::config)?;
            println!("renamed preset '{old}' to '{new}'");
        }
        PresetCommands::Duplicate { name, new } => {
            store.duplicate_preset(&name, &new).map_err(CliError::config)?;
            println!("copied preset '{name}' to '{new}'");
        }
    }
    Ok(())
}

fn print_preset(preset: &Preset) {
    println!("name:        {}", preset.name);
    if !preset.description.is_empty() {
        println!("description: {}", preset.description);
    }
    println!(
        "settlement:  column {} containing \"{}\"",
        preset.settlement_search_column, preset.settlement_search_keyword
    );
    println!("mappings:");
    let width = preset.mapping_names().map(str::len).max().unwrap_or(0);
    for m in &preset.mappings {
        if m.description.is_empty() {
            println!("  {:<width$}  {}", m.name, m.cell);
        } else {
            println!("  {:<width$}  {:<6} {}", m.name, m.cell, m.description);
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("failed to serialize: {e}")))?;
    println!("{json}");
    Ok(())
}

/// `NAME=CELL`; the cell is checked later with the rest of the preset.
fn parse_mapping(arg: &str) -> Result<Mapping, String> {
    let (name, cell) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=CELL, got '{arg}'"))?;
    Ok(Mapping::new(name.trim(), cell.trim()))
}
