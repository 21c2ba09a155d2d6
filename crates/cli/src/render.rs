//! Terminal rendering of previews, cleaning reports and chart series.

use anyhow::Result;
use colored::Colorize;
use comfy_table::Table as Grid;
use sweeper_core::table::CellValue;
use sweeper_core::viz::SeriesPair;
use sweeper_core::{CleanAction, CleanReport, FileSummary, TablePreview, UploadReport, UploadStatus};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Widest a rendered cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 32;

/// Print a preview in the specified format.
pub fn print_preview(preview: &TablePreview, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(preview)?),
        OutputFormat::Csv => print!("{}", preview_csv(preview)),
        OutputFormat::Table => {
            println!("{}", preview_table(preview));
            println!(
                "{}",
                format!(
                    "{}: showing {} of {} rows, {} missing values",
                    preview.file,
                    preview.shown_rows(),
                    preview.total_rows,
                    preview.missing
                )
                .dimmed()
            );
        }
    }
    Ok(())
}

/// Print the effect of a cleaning action, followed by the new preview.
pub fn print_clean_report(report: &CleanReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("{} {}", "✓".green().bold(), clean_summary(report));
    print_preview(&report.preview, format)
}

/// One-line description of a cleaning action's effect.
pub fn clean_summary(report: &CleanReport) -> String {
    match report.action {
        CleanAction::Deduplicate => format!(
            "Removed {} duplicate rows ({} left)",
            report.rows_removed(),
            report.rows_after
        ),
        CleanAction::FillMissing => {
            format!("Filled {} missing numeric values with 0", report.cells_filled())
        }
        CleanAction::SelectColumns => format!("Kept {} columns", report.preview.columns.len()),
    }
}

pub fn print_upload_reports(reports: &[UploadReport], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    for report in reports {
        match &report.status {
            UploadStatus::Loaded { preview, .. } => {
                println!(
                    "{} {} ({} rows, {} columns)",
                    "Loaded".green().bold(),
                    report.file,
                    preview.total_rows,
                    preview.columns.len()
                );
            }
            UploadStatus::Skipped { reason } => {
                println!("{} {}: {reason}", "Skipped".yellow().bold(), report.file);
            }
        }
    }
    Ok(())
}

pub fn print_files(files: &[FileSummary], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }
    if files.is_empty() {
        println!("(no files loaded)");
    }
    for file in files {
        println!(
            "{}  {} bytes, {}, {} rows: {}",
            file.metadata.name.cyan(),
            file.metadata.size,
            file.metadata.format,
            file.rows,
            file.columns.join(", ")
        );
    }
    Ok(())
}

/// Print the series selected for charting.
pub fn print_series(pair: &SeriesPair, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(pair)?),
        OutputFormat::Csv => print!("{}", series_csv(pair)),
        OutputFormat::Table => {
            let header: Vec<String> = std::iter::once("row".to_string())
                .chain(pair.series.iter().map(|s| s.name.clone()))
                .collect();
            let rows = series_rows(pair);
            println!("{}", grid(&header, None, &rows));
        }
    }
    Ok(())
}

fn series_rows(pair: &SeriesPair) -> Vec<Vec<String>> {
    pair.index
        .iter()
        .map(|&i| {
            std::iter::once(i.to_string())
                .chain(
                    pair.series
                        .iter()
                        .map(|s| s.values[i].map(|v| format!("{v:?}")).unwrap_or_default()),
                )
                .collect()
        })
        .collect()
}

fn series_csv(pair: &SeriesPair) -> String {
    let mut out = String::from("row");
    for series in &pair.series {
        out.push(',');
        out.push_str(&csv_field(&series.name));
    }
    out.push('\n');
    for row in series_rows(pair) {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Render a preview as a bordered grid with a type row under the header.
pub fn preview_table(preview: &TablePreview) -> String {
    let header: Vec<String> = preview.columns.iter().map(|c| c.name.clone()).collect();
    let types: Vec<String> = preview
        .columns
        .iter()
        .map(|c| format!("<{}>", c.dtype))
        .collect();
    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|record| record.values().map(display_cell).collect())
        .collect();
    grid(&header, Some(types.as_slice()), &rows)
}

fn display_cell(value: &CellValue) -> String {
    if value.is_null() {
        return "·".to_string();
    }
    truncate(&value.as_text())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.replace('\n', " ");
    }
    let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    format!("{}…", cut.replace('\n', " "))
}

/// Border layout of arrow's pretty printer: outer frame, header rule, no row rules.
const GRID_PRESET: &str = "||--+-++|    ++++++";

fn grid(header: &[String], types: Option<&[String]>, rows: &[Vec<String>]) -> String {
    let mut grid = Grid::new();
    grid.load_preset(GRID_PRESET).set_header(header);
    if let Some(types) = types {
        grid.add_row(types);
    }
    for row in rows {
        grid.add_row(row);
    }
    grid.to_string()
}

/// Render a preview as CSV.
pub fn preview_csv(preview: &TablePreview) -> String {
    let mut out = preview
        .columns
        .iter()
        .map(|c| csv_field(&c.name))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for record in &preview.rows {
        let line: Vec<String> = record.values().map(|v| csv_field(&v.as_text())).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Quote a CSV field if it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::table::Table;

    fn preview(csv: &str) -> TablePreview {
        TablePreview::new("t.csv", &Table::from_csv_str(csv).unwrap(), None)
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("hello"), "hello");
        assert_eq!(csv_field("hello,world"), "\"hello,world\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_truncate_long_cells() {
        let long = "x".repeat(MAX_CELL_WIDTH + 5);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_WIDTH);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_preview_csv() {
        let csv = preview_csv(&preview("name,score\n\"a,b\",1.5\nc,"));
        assert_eq!(csv, "name,score\n\"a,b\",1.5\nc,\n");
    }

    #[test]
    fn test_preview_table_layout() {
        let text = preview_table(&preview("name,score\nann,1\nbo,"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "+--------+-------+");
        assert_eq!(lines[1], "| name   | score |");
        assert_eq!(lines[2], "+--------+-------+");
        assert_eq!(lines[3], "| <text> | <int> |");
        assert_eq!(lines[4], "| ann    | 1     |");
        assert_eq!(lines[5], "| bo     | ·     |");
        assert_eq!(lines[6], "+--------+-------+");
    }

    #[test]
    fn test_clean_summary() {
        let mut pipeline = sweeper_core::Pipeline::default();
        pipeline
            .upload(&sweeper_core::UploadedFile::new("k.csv", b"k\na\na\nb".to_vec()))
            .unwrap();
        let report = pipeline.deduplicate("k.csv").unwrap();
        assert_eq!(clean_summary(&report), "Removed 1 duplicate rows (2 left)");
    }

    #[test]
    fn test_series_csv() {
        let table = Table::from_csv_str("a,b\n1,0.5\n,2.5").unwrap();
        let pair = SeriesPair::from_table(&table);
        assert_eq!(series_csv(&pair), "row,a,b\n0,1.0,0.5\n1,,2.5\n");
    }
}
