//! # sweeper-cli
//!
//! Command-line interface for cleaning CSV and Excel files.

mod render;
mod repl;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use render::OutputFormat;
use std::path::{Path, PathBuf};
use sweeper_core::viz::ChartSpec;
use sweeper_core::{Download, Pipeline, SweeperConfig, TargetFormat, UploadedFile};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// sweep - clean tabular files
#[derive(Parser)]
#[command(name = "sweep")]
#[command(author, version, about = "Deduplicate, fill and convert CSV and Excel files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (YAML); defaults to $SWEEPER_CONFIG
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (json, csv, table)
    #[arg(short = 'f', long = "format", global = true, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show the first rows, column types and missing values of a file
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rows to show (at least 10, at most all)
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },

    /// Clean a file and write the result
    Clean {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Replace missing numeric values with 0
        #[arg(long)]
        fill_missing: bool,

        /// Keep only these columns, in this order
        #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
        columns: Vec<String>,

        /// Target format (csv, excel)
        #[arg(long, default_value = "csv")]
        to: String,

        /// Directory for the converted file
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Chart the first two numeric columns of a file
    Chart {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write a standalone HTML chart instead of printing the series
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Start an interactive cleaning session
    Session {
        /// Files to load at start
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SweeperConfig::discover(cli.config.as_deref())
        .context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");
    let mut pipeline = Pipeline::new(config);

    match cli.command {
        Some(Command::Inspect { file, rows }) => {
            let name = load_path(&mut pipeline, &file)?;
            render::print_preview(&pipeline.preview(&name, rows)?, cli.format)
        }
        Some(Command::Clean {
            file,
            dedup,
            fill_missing,
            columns,
            to,
            output,
        }) => {
            let target: TargetFormat = to.parse()?;
            let options = CleanOptions {
                dedup,
                fill_missing,
                columns,
                target,
            };
            let written = run_clean(&mut pipeline, &file, &options, output.as_deref(), cli.format)?;
            println!("{} {}", "Wrote".green().bold(), written.display());
            Ok(())
        }
        Some(Command::Chart { file, output }) => {
            let name = load_path(&mut pipeline, &file)?;
            run_chart(&pipeline, &name, output.as_deref(), cli.format)
        }
        Some(Command::Session { files }) => repl::run(&mut pipeline, &files, cli.format),
        None => {
            // No arguments - show help
            Cli::parse_from(["sweep", "--help"]);
            Ok(())
        }
    }
}

/// Read a file from disk and load it into the pipeline, returning its name.
fn load_path(pipeline: &mut Pipeline, path: &Path) -> Result<String> {
    let file = UploadedFile::from_path(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    pipeline
        .upload(&file)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(file.name().to_string())
}

/// What `sweep clean` should do.
struct CleanOptions {
    dedup: bool,
    fill_missing: bool,
    columns: Vec<String>,
    target: TargetFormat,
}

/// Load, clean and export a file. Returns the path written.
fn run_clean(
    pipeline: &mut Pipeline,
    file: &Path,
    options: &CleanOptions,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let name = load_path(pipeline, file)?;

    let mut reports = Vec::new();
    if options.dedup {
        reports.push(pipeline.deduplicate(&name)?);
    }
    if options.fill_missing {
        reports.push(pipeline.fill_missing(&name)?);
    }
    if !options.columns.is_empty() {
        reports.push(pipeline.select_columns(&name, &options.columns)?);
    }
    if format != OutputFormat::Json {
        for report in &reports {
            println!("{} {}", "✓".green().bold(), render::clean_summary(report));
        }
    }

    let download = pipeline.export(&name, options.target)?;
    let dir = output.unwrap_or_else(|| Path::new("."));
    save_download(&download, dir, Some(file))
}

/// Write a download into `dir`, refusing to overwrite `source`.
pub(crate) fn save_download(download: &Download, dir: &Path, source: Option<&Path>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(&download.file_name);

    if let (Some(source), Ok(target)) = (source, path.canonicalize()) {
        if source.canonicalize().is_ok_and(|source| source == target) {
            bail!(
                "Refusing to overwrite the input file {}; choose another --output directory",
                path.display()
            );
        }
    }

    std::fs::write(&path, &download.bytes)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    debug!(path = %path.display(), mime = download.mime_type, "download saved");
    Ok(path)
}

/// Print or save the chart of a loaded file.
pub(crate) fn run_chart(
    pipeline: &Pipeline,
    name: &str,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let pair = pipeline.visualize(name)?;
    if pair.is_empty() {
        println!("{}", format!("{name} has no numeric columns to chart").yellow());
        return Ok(());
    }
    match output {
        Some(path) => {
            let html = ChartSpec::bar(name, &pair).to_html();
            std::fs::write(path, html)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            println!("{} {}", "Wrote".green().bold(), path.display());
            Ok(())
        }
        None => render::print_series(&pair, format),
    }
}
