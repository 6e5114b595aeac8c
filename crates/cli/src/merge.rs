// billmerge merge - extract every input with one preset and write the summary

use std::path::{Path, PathBuf};

use billmerge_config::PresetStore;
use billmerge_merge::{merge, MergeOptions, MergeResult};

use crate::exit_codes::{EXIT_IO, EXIT_PARTIAL};
use crate::inputs::collect_inputs;
use crate::CliError;

pub struct MergeArgs {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
    pub preset: String,
    pub output: PathBuf,
    pub jobs: Option<usize>,
    pub json: bool,
    pub strict: bool,
}

pub fn cmd_merge(config: &Path, args: MergeArgs) -> Result<(), CliError> {
    let store = PresetStore::open(config).map_err(CliError::config)?;
    let preset = store.get_preset(&args.preset).ok_or_else(|| {
        CliError::preset_not_found(&args.preset).with_hint(format!(
            "available presets: {}",
            store.list_preset_names().join(", ")
        ))
    })?;

    let inputs = collect_inputs(&args.files, &args.dirs, &args.output)?;
    let options = MergeOptions::with_jobs(args.jobs.unwrap_or(1));

    let result = merge(&inputs, preset, &args.output, &options).map_err(CliError::merge)?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("failed to serialize result: {e}")))?;
        println!("{json}");
    } else {
        print_report(&result);
    }

    if !result.overall_success {
        return Err(CliError {
            code: EXIT_IO,
            // already reported on stdout
            message: String::new(),
            hint: Some("check that the output folder exists and the file is not open elsewhere".into()),
        });
    }
    if args.strict && result.has_failures() {
        return Err(CliError {
            code: EXIT_PARTIAL,
            message: format!("{} of {} inputs were skipped", result.error_count, result.processed()),
            hint: None,
        });
    }
    Ok(())
}

fn print_report(result: &MergeResult) {
    if result.overall_success {
        println!(
            "merged {} of {} files into {}",
            result.success_count,
            result.processed(),
            result.output.display()
        );
    } else {
        println!("{}", result.message);
        println!("processed: {}  failed: {}", result.success_count, result.error_count);
    }

    for failure in &result.failures {
        println!("  skipped {}: {}", failure.path.display(), failure.reason);
    }
    for fault in &result.cell_faults {
        println!("  blank {} in {}: {}", fault.field, fault.file_name, fault.reason);
    }
    for record in result.records.iter().filter(|r| !r.settlement.is_found()) {
        println!("  no settlement label in {}", record.file_name);
    }
}
