// billmerge CLI - merge bill workbooks into one summary sheet

mod exit_codes;
mod inputs;
mod logging;
mod merge;
mod presets;
mod preview;

use std::path::PathBuf;
use std::process::ExitCode;

use billmerge_config::{ConfigError, PresetStore};
use billmerge_core::{validate_cell_reference, CellAddress};
use billmerge_merge::MergeError;
use clap::{Parser, Subcommand};

use exit_codes::{
    EXIT_ERROR, EXIT_IO, EXIT_PRESET_INVALID, EXIT_PRESET_NOT_FOUND, EXIT_SUCCESS, EXIT_USAGE,
};
use merge::MergeArgs;
use presets::PresetCommands;

#[derive(Parser)]
#[command(name = "billmerge")]
#[command(about = "Pull fixed cells and a settlement amount out of many bill workbooks into one summary")]
#[command(version)]
struct Cli {
    /// Preset file (defaults to the user config directory)
    #[arg(long, global = true, env = "BILLMERGE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every input with a preset and write the summary workbook
    #[command(after_help = "\
Examples:
  billmerge merge march.xlsx april.xlsx --preset Hotel -o summary.xlsx
  billmerge merge --dir bills/2024 --preset Hotel -o 2024.xlsx --jobs 4
  billmerge merge --dir bills --preset Default -o out.xlsx --json --strict")]
    Merge {
        /// Workbooks to read, in summary order
        files: Vec<PathBuf>,

        /// Also read every .xlsx/.xls under this folder (repeatable)
        #[arg(long = "dir", value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Preset name
        #[arg(long, short = 'p', default_value = "Default")]
        preset: String,

        /// Summary workbook to write (replaced if it exists)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Read this many files at once
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Exit 6 if any input was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Show the top-left corner of a workbook's first sheet
    Preview {
        file: PathBuf,

        #[arg(long, default_value_t = 10)]
        rows: u32,

        #[arg(long, default_value_t = 10)]
        cols: u32,

        #[arg(long)]
        json: bool,
    },

    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Check that a cell reference like B12 is well formed
    CheckCell {
        reference: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let config = cli.config.unwrap_or_else(PresetStore::default_path);

    let result = match cli.command {
        Commands::Merge {
            files,
            dirs,
            preset,
            output,
            jobs,
            json,
            strict,
        } => merge::cmd_merge(
            &config,
            MergeArgs {
                files,
                dirs,
                preset,
                output,
                jobs,
                json,
                strict,
            },
        ),
        Commands::Preview { file, rows, cols, json } => preview::cmd_preview(&file, rows, cols, json),
        Commands::Presets { command } => presets::cmd_presets(&config, command),
        Commands::CheckCell { reference } => cmd_check_cell(&reference),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_check_cell(reference: &str) -> Result<(), CliError> {
    let normalized = reference.trim().to_ascii_uppercase();
    let parsed = if validate_cell_reference(reference) {
        CellAddress::parse(&normalized).ok()
    } else {
        None
    };

    match parsed {
        Some(addr) => {
            println!("{}  row {}, column {}", addr, addr.row + 1, addr.col + 1);
            Ok(())
        }
        None => Err(CliError::usage(format!("invalid cell reference '{}'", reference))
            .with_hint("use column letters followed by a row number, e.g. B12")),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn preset_not_found(name: &str) -> Self {
        Self {
            code: EXIT_PRESET_NOT_FOUND,
            message: format!("preset '{}' not found", name),
            hint: Some("run `billmerge presets list` to see saved presets".to_string()),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Create error from a preset store error with the matching exit code.
    pub fn config(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::NotFound(_) => EXIT_PRESET_NOT_FOUND,
            ConfigError::Invalid { .. } | ConfigError::Parse { .. } => EXIT_PRESET_INVALID,
            ConfigError::AlreadyExists(_) => EXIT_USAGE,
            ConfigError::Read { .. } | ConfigError::Write { .. } => EXIT_IO,
            ConfigError::Serialize(_) => EXIT_ERROR,
        };
        let hint = match &err {
            ConfigError::Parse { path, .. } => Some(format!("fix or remove {}", path.display())),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn merge(err: MergeError) -> Self {
        match err {
            MergeError::NoInputFiles => Self::usage("no input files")
                .with_hint("pass workbook paths or --dir with a folder containing .xlsx/.xls files"),
            MergeError::InvalidPreset(e) => Self::config(e),
        }
    }
}
