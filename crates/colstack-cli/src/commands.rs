use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colstack_ingest::write_csv_table;
use colstack_model::{ColumnOptions, ColumnStack};
use colstack_transform::StackHandler;
use tracing::{info, info_span};

use crate::cli::{BinsArgs, RunArgs};
use crate::types::{BinSummary, RunResult};

/// Ingests, renders and writes one CSV file.
pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", input = %args.input.display());
    let _guard = span.enter();

    let handler = load_handler(&args.input, &args.config)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    let export = handler.export_frame().context("convert output frame")?;
    write_csv_table(&export, &output)
        .with_context(|| format!("write output {}", output.display()))?;
    info!(path = %output.display(), rows = export.height(), "Wrote output");

    if let Some(path) = &args.dump_config {
        let dump = handler.dump().context("serialize configuration")?;
        let text = serde_json::to_string_pretty(&dump).context("serialize configuration")?;
        fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "Wrote configuration");
    }

    let bins = handler
        .stack()
        .binned_columns()
        .map(|options| bin_summary(&handler, &options.name))
        .collect::<Result<Vec<_>>>()?;

    Ok(RunResult {
        input: args.input.clone(),
        output,
        dump_config: args.dump_config.clone(),
        input_rows: handler.raw_frame().height(),
        rows: handler.frame().height(),
        columns: handler.frame().width(),
        bins,
    })
}

/// Renders and groups one binned column.
pub fn run_bins(args: &BinsArgs) -> Result<BinSummary> {
    let handler = load_handler(&args.input, &args.config)?;
    bin_summary(&handler, &args.column)
}

/// `<stem>_output.csv` in the input's directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "colstack".into(), |stem| stem.to_string_lossy());
    input.with_file_name(format!("{stem}_output.csv"))
}

fn load_handler(input: &Path, config: &Path) -> Result<StackHandler> {
    let json =
        fs::read_to_string(config).with_context(|| format!("read config {}", config.display()))?;
    let stack = ColumnStack::from_json(&json)
        .with_context(|| format!("parse config {}", config.display()))?;

    let mut handler = StackHandler::from_csv(input)
        .with_context(|| format!("ingest {}", input.display()))?;
    handler.load(stack).context("render column stack")?;
    Ok(handler)
}

fn bin_summary(handler: &StackHandler, column: &str) -> Result<BinSummary> {
    let label_column = handler
        .stack()
        .get(column)
        .filter(|options| !options.bins.is_empty())
        .map_or_else(|| column.to_string(), ColumnOptions::binned_column_name);
    let groups = handler
        .bin_groups(column)
        .with_context(|| format!("group bins of {column}"))?
        .into_iter()
        .map(|(label, rows)| (label, rows.len()))
        .collect();
    Ok(BinSummary {
        column: column.to_string(),
        label_column,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/study/patients.csv")),
            PathBuf::from("/data/study/patients_output.csv")
        );
        assert_eq!(
            default_output_path(Path::new("patients")),
            PathBuf::from("patients_output.csv")
        );
    }
}
