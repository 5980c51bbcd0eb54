use anyhow::Result;
use clap::Parser;

use dialog2srt::{cli, config, pipeline};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    let dispatch = config::build_dispatch(&cfg.logging, args.log_level.as_deref());

    tracing::dispatcher::with_default(&dispatch, || {
        tracing::info!(
            level = args.log_level.as_deref().unwrap_or(cfg.logging.level.as_str()),
            format = cfg.logging.format.as_str(),
            "logging initialized"
        );
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "d2srt starting");

        match args.command {
            cli::Command::Convert(cmd) => pipeline::run_convert(cmd, &cfg),
            cli::Command::PrintDefaultConfig => {
                let s = cfg.to_toml_pretty()?;
                print!("{s}");
                Ok(())
            }
        }
    })
}
