use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "d2srt")]
#[command(about = "Convert speaker-annotated dialogue JSON into colour-tagged SRT subtitles.")]
pub struct Args {
    /// Path to config TOML (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a dialogue JSON file to SRT
    Convert(ConvertCmd),
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Parser)]
pub struct ConvertCmd {
    /// Input file path, or '-' for stdin
    pub input: String,

    /// Output file path (defaults to the input path with an .srt extension)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Frames per second of the source timecodes (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting output file
    #[arg(long)]
    pub overwrite: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}
