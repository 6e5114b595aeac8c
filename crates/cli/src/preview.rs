// billmerge preview - show the top-left corner of a workbook

use std::path::Path;

use billmerge_core::cell_reference;
use billmerge_io::{preview, Preview};

use crate::CliError;

/// Widest a column is drawn before its text is cut.
const MAX_CELL_WIDTH: usize = 24;

pub fn cmd_preview(file: &Path, rows: u32, cols: u32, json: bool) -> Result<(), CliError> {
    let grid = preview(file, rows, cols).map_err(|e| CliError::io(e.to_string()))?;

    if json {
        let out = serde_json::to_string_pretty(&grid)
            .map_err(|e| CliError::general(format!("failed to serialize preview: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    print!("{}", render(&grid));
    Ok(())
}

fn render(grid: &Preview) -> String {
    let mut out = String::new();

    if grid.total_rows == 0 {
        out.push_str(&format!("sheet '{}' is empty\n", grid.sheet));
        return out;
    }
    if grid.rows.is_empty() || grid.width() == 0 {
        out.push_str(&format!(
            "sheet '{}' has {} rows x {} cols; nothing within the requested bounds\n",
            grid.sheet, grid.total_rows, grid.total_cols
        ));
        return out;
    }

    let labels = grid.column_labels();
    let cells: Vec<Vec<String>> = grid
        .text_rows()
        .into_iter()
        .map(|row| row.into_iter().map(clip).collect())
        .collect();

    let widths: Vec<usize> = (0..labels.len())
        .map(|c| {
            cells
                .iter()
                .map(|row| row[c].chars().count())
                .chain(std::iter::once(labels[c].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let gutter = cells.len().to_string().len();

    let last = cell_reference(cells.len() as u32, labels.len() as u32);
    out.push_str(&format!("sheet '{}'  A1:{}", grid.sheet, last));
    if grid.is_truncated() {
        out.push_str(&format!(" of {} rows x {} cols", grid.total_rows, grid.total_cols));
    }
    out.push('\n');

    let mut line = " ".repeat(gutter);
    for (label, width) in labels.iter().zip(&widths) {
        line.push_str(&format!(" | {label:<width$}"));
    }
    push_line(&mut out, &line);

    for (i, row) in cells.iter().enumerate() {
        let mut line = format!("{:>gutter$}", i + 1);
        for (cell, width) in row.iter().zip(&widths) {
            line.push_str(&format!(" | {cell:<width$}"));
        }
        push_line(&mut out, &line);
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn clip(text: String) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('~');
    clipped
}
