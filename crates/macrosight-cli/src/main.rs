//! Macrosight CLI
//!
//! Runs the analysis pipeline over translation-unit dump files produced by
//! a host front end.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use macrosight_analysis::{emit, Analyzer, TranslationUnit};
use macrosight_core::config::Config;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "macrosight")]
#[command(author, version, about = "Macro invocation analysis tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one translation-unit dump
    Analyze {
        /// Dump file to analyze
        #[arg(value_name = "DUMP")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Only report macros whose name matches this pattern
        #[arg(long)]
        filter: Option<String>,

        /// Suppress marker lines for nested and argument-interior
        /// invocations
        #[arg(long)]
        no_markers: bool,
    },

    /// Analyze every .json dump under a directory
    Batch {
        /// Directory to sweep
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            output,
            format,
            filter,
            no_markers,
        } => {
            let mut config = Config::default();
            config.analysis.macro_filter = filter;
            config.analysis.emit_markers = !no_markers;
            cmd_analyze(&file, output.as_deref(), format, config)
        }
        Commands::Batch { dir, format } => cmd_batch(&dir, format),
    }
}

fn render(records: &[macrosight_analysis::OutputRecord], format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(records.iter().map(emit::output_to_string).collect()),
        Format::Json => {
            let json = serde_json::to_string_pretty(records)?;
            Ok(json + "\n")
        }
    }
}

fn cmd_analyze(
    file: &Path,
    output: Option<&Path>,
    format: Format,
    config: Config,
) -> Result<()> {
    let tu = TranslationUnit::load(file)
        .with_context(|| format!("failed to load dump {}", file.display()))?;

    let analyzer = Analyzer::with_config(config);
    let records = analyzer
        .analyze(&tu)
        .with_context(|| format!("analysis of {} failed", file.display()))?;

    let rendered = render(&records, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            std::io::stdout().write_all(rendered.as_bytes())?;
        }
    }

    Ok(())
}

fn cmd_batch(dir: &Path, format: Format) -> Result<()> {
    let analyzer = Analyzer::new();
    let mut stdout = std::io::stdout();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |e| e != "json") {
            continue;
        }

        let tu = TranslationUnit::load(path)
            .with_context(|| format!("failed to load dump {}", path.display()))?;
        let records = analyzer
            .analyze(&tu)
            .with_context(|| format!("analysis of {} failed", path.display()))?;

        writeln!(stdout, "== {}", path.display())?;
        stdout.write_all(render(&records, format)?.as_bytes())?;
    }

    Ok(())
}
