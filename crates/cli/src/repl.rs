//! Interactive cleaning session.

use crate::render::{self, OutputFormat};
use crate::{run_chart, save_download};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashMap;
use std::path::PathBuf;
use sweeper_core::{Action, Outcome, Pipeline, TargetFormat, UploadedFile};

/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Load(Vec<PathBuf>),
    Files,
    Preview { file: String, rows: Option<usize> },
    Dedup { file: String },
    Fill { file: String },
    Select { file: String, columns: Vec<String> },
    Chart { file: String, output: Option<PathBuf> },
    Export { file: String, target: TargetFormat, dir: Option<PathBuf> },
    Help,
    Clear,
    Quit,
}

/// Parse one REPL line.
fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let file_arg = |usage: &str| -> Result<String> {
        args.first()
            .map(|s| (*s).to_string())
            .ok_or_else(|| anyhow!("Usage: {usage}"))
    };

    let command = match head {
        ":quit" | ":q" | ":exit" => Command::Quit,
        ":help" | ":h" | ":?" => Command::Help,
        ":clear" => Command::Clear,
        ":files" | ":ls" => Command::Files,
        ":load" => {
            if args.is_empty() {
                return Err(anyhow!("Usage: :load <path>..."));
            }
            Command::Load(args.iter().map(PathBuf::from).collect())
        }
        ":preview" | ":p" => {
            let file = file_arg(":preview <file> [rows]")?;
            let rows = args
                .get(1)
                .map(|n| n.parse::<usize>())
                .transpose()
                .context("Row count must be a non-negative integer")?;
            Command::Preview { file, rows }
        }
        ":dedup" => Command::Dedup {
            file: file_arg(":dedup <file>")?,
        },
        ":fill" => Command::Fill {
            file: file_arg(":fill <file>")?,
        },
        ":select" => {
            let file = file_arg(":select <file> <col,col,...>")?;
            let columns: Vec<String> = args[1..]
                .iter()
                .flat_map(|s| s.split(','))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if columns.is_empty() {
                return Err(anyhow!("Usage: :select <file> <col,col,...>"));
            }
            Command::Select { file, columns }
        }
        ":chart" => Command::Chart {
            file: file_arg(":chart <file> [out.html]")?,
            output: args.get(1).map(PathBuf::from),
        },
        ":export" => {
            let file = file_arg(":export <file> <csv|excel> [dir]")?;
            let target = args
                .get(1)
                .ok_or_else(|| anyhow!("Usage: :export <file> <csv|excel> [dir]"))?
                .parse::<TargetFormat>()?;
            Command::Export {
                file,
                target,
                dir: args.get(2).map(PathBuf::from),
            }
        }
        other => return Err(anyhow!("Unknown command: {other}")),
    };
    Ok(command)
}

/// Session state the REPL keeps besides the pipeline.
struct Session<'a> {
    pipeline: &'a mut Pipeline,
    format: OutputFormat,
    /// Where each loaded file came from, so exports never overwrite it.
    sources: HashMap<String, PathBuf>,
}

impl Session<'_> {
    fn load(&mut self, paths: &[PathBuf]) -> Result<()> {
        let mut files = Vec::new();
        for path in paths {
            match UploadedFile::from_path(path) {
                Ok(file) => {
                    self.sources.insert(file.name().to_string(), path.clone());
                    files.push(file);
                }
                Err(e) => println!("{} {}: {e}", "Skipped".yellow().bold(), path.display()),
            }
        }
        if let Outcome::Uploaded(reports) = self.pipeline.handle(Action::Upload(files))? {
            render::print_upload_reports(&reports, self.format)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        let action = match command {
            Command::Load(paths) => return self.load(&paths),
            Command::Chart { file, output } => {
                return run_chart(self.pipeline, &file, output.as_deref(), self.format)
            }
            Command::Export { file, target, dir } => {
                let outcome = self.pipeline.handle(Action::Export {
                    file: file.clone(),
                    target,
                })?;
                if let Outcome::Download(download) = outcome {
                    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                    let source = self.sources.get(&file).map(PathBuf::as_path);
                    let path = save_download(&download, &dir, source)?;
                    println!("{} {}", "Wrote".green().bold(), path.display());
                }
                return Ok(());
            }
            Command::Files => Action::ListFiles,
            Command::Preview { file, rows } => Action::Preview { file, rows },
            Command::Dedup { file } => Action::Deduplicate { file },
            Command::Fill { file } => Action::FillMissing { file },
            Command::Select { file, columns } => Action::SelectColumns { file, columns },
            Command::Help => {
                print_help();
                return Ok(());
            }
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                return Ok(());
            }
            Command::Quit => return Ok(()),
        };

        match self.pipeline.handle(action)? {
            Outcome::Files(files) => render::print_files(&files, self.format),
            Outcome::Preview(preview) => render::print_preview(&preview, self.format),
            Outcome::Cleaned(report) => render::print_clean_report(&report, self.format),
            Outcome::Uploaded(reports) => render::print_upload_reports(&reports, self.format),
            Outcome::Chart(pair) => render::print_series(&pair, self.format),
            Outcome::Download(download) => {
                println!("{} ({} bytes)", download.file_name, download.bytes.len());
                Ok(())
            }
        }
    }
}

/// Run the REPL.
pub fn run(pipeline: &mut Pipeline, initial: &[PathBuf], format: OutputFormat) -> Result<()> {
    println!(
        "{} {} - Interactive Session",
        "sweeper".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Type {} for help, {} to exit\n",
        ":help".yellow(),
        ":quit".yellow()
    );

    let mut session = Session {
        pipeline,
        format,
        sources: HashMap::new(),
    };
    if !initial.is_empty() {
        if let Err(e) = session.load(initial) {
            println!("{} {e:#}", "Error:".red().bold());
        }
    }

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = "sweep> ".green().bold().to_string();

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match parse_command(line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = session.execute(command) {
                            println!("{} {e:#}", "Error:".red().bold());
                        }
                    }
                    Err(e) => println!("{} {e}", "Error:".red().bold()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("sweeper");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

/// Print REPL help.
fn print_help() {
    println!("{}", "sweeper session commands:".cyan().bold());
    println!("  {}              Load CSV or XLSX files", ":load <path>...".yellow());
    println!("  {}                     List loaded files", ":files".yellow());
    println!("  {}      Show the first rows", ":preview <file> [n]".yellow());
    println!("  {}              Remove duplicate rows", ":dedup <file>".yellow());
    println!("  {}         Fill missing numbers with 0", ":fill <file>".yellow());
    println!("  {}  Keep only these columns", ":select <file> a,b".yellow());
    println!("  {}   Chart numeric columns", ":chart <file> [out.html]".yellow());
    println!("  {} Write as CSV or Excel", ":export <file> csv|excel [dir]".yellow());
    println!("  {}                     Clear screen", ":clear".yellow());
    println!("  {}             Show this help", ":help, :h, :?".yellow());
    println!("  {}          Exit the session", ":quit, :q, :exit".yellow());
}
