//! ZIP to PDF CLI
//!
//! Command-line interface for converting ZIP archives of images into PDFs.

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zip2pdf::{run_batch, Algorithm, ArchiveSelection, ConvertOptions, FailurePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    /// Decode each image and draw it on an A4 page (skips non-images)
    #[value(alias = "reportlab")]
    Draw,
    /// Embed encoded images losslessly (fails on unsupported images)
    #[value(alias = "img2pdf")]
    Embed,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Draw => Algorithm::Draw,
            AlgorithmArg::Embed => Algorithm::Embed,
        }
    }
}

/// Convert ZIP archives of images into PDF documents, one image per page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more zip files to convert
    #[arg(short, long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// One or more directories to look for *.zip files (see --recursive)
    #[arg(short, long, num_args = 1..)]
    directories: Vec<PathBuf>,

    /// Recursively look under the directories given with --directories
    #[arg(short, long)]
    recursive: bool,

    /// Conversion algorithm
    #[arg(short, long, value_enum, default_value_t = AlgorithmArg::Draw)]
    algorithm: AlgorithmArg,

    /// Output directory for the PDFs (default: current directory)
    #[arg(short, long)]
    output_path: Option<PathBuf>,

    /// Keep converting the remaining archives after one fails
    #[arg(long)]
    continue_on_error: bool,

    /// Compress PDF page streams
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    compress_streams: bool,

    /// Verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let output_dir = match args.output_path {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create output directory {:?}", output_dir))?;

    let selection = ArchiveSelection {
        files: args.files,
        directories: args.directories,
        recursive: args.recursive,
    };
    let archives = selection.collect();
    if archives.is_empty() {
        println!("No zip archives selected");
        return Ok(());
    }

    let options = ConvertOptions {
        compress_streams: args.compress_streams,
    };
    let converter = Algorithm::from(args.algorithm).converter(options);
    let policy = if args.continue_on_error {
        FailurePolicy::ContinueOnError
    } else {
        FailurePolicy::FailFast
    };

    let report = run_batch(&converter, &archives, &output_dir, policy);

    println!(
        "\nDone! Converted {} of {} archives",
        report.converted.len(),
        archives.len()
    );
    for conversion in &report.converted {
        println!(
            "  {:?} -> {:?}: {} pages, {} skipped",
            conversion.archive,
            conversion.output,
            conversion.pages,
            conversion.skipped_entries.len()
        );
    }
    if !report.not_attempted.is_empty() {
        println!("  {} archives not attempted", report.not_attempted.len());
    }

    if !report.is_success() {
        anyhow::bail!("{} archive(s) failed to convert", report.failures.len());
    }
    Ok(())
}
