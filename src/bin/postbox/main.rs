use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use spdlog::{error, info, warn};

use postbox::logger::configure_logger;
use postbox::pipeline::Pipeline;

use crate::config::open_config;
use crate::config_data::write_sample_cfg;

mod config;
mod config_data;

const CFG_FILE_NAME: &str = "postbox.toml";

#[derive(Parser, Debug)]
#[command(version, about = "Moves dropped markdown posts into the content store", long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingests the inbox and rebuilds the manifest (default)
    Run,
    /// Rebuilds the manifest from the content store only
    Manifest,
    /// Writes a sample configuration file
    Init {
        /// Where to write it. Defaults to postbox.toml in the current directory
        path: Option<String>,
    },
}

fn init_cmd(path: Option<String>) -> Result<()> {
    let path = PathBuf::from(path.unwrap_or_else(|| CFG_FILE_NAME.to_string()));
    write_sample_cfg(&path).with_context(|| format!("Error writing sample configuration {}", path.display()))?;
    println!("Sample configuration written to {}", path.display());
    Ok(())
}

fn open_pipeline(config_path: Option<String>) -> Result<Pipeline> {
    let config = open_config(config_path.map(PathBuf::from))
        .map_err(|err| anyhow!("{}. Please run postbox --help", err))?;

    if let Some(ref log) = config.log {
        if let Err(err) = configure_logger(log) {
            warn!("Error creating logger sinks. Using console instead. Desc={}", err);
        }
    }

    Ok(Pipeline::new(config.paths, config.defaults))
}

fn manifest_cmd(pipeline: Pipeline) -> Result<()> {
    info!("Rebuilding manifest =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    match pipeline.rebuild_manifest() {
        Ok(count) => {
            info!("Manifest rebuilt with {} entries", count);
            Ok(())
        }
        Err(err) => {
            error!("{}", err);
            Err(err.into())
        }
    }
}

fn run_cmd(pipeline: Pipeline) -> Result<()> {
    info!("Starting ingestion =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    match pipeline.run() {
        Ok(mut report) => {
            if report.stranded() > 0 {
                warn!("{} file(s) could not be moved and are still in {}",
                      report.stranded(), pipeline.paths().inbox_dir.display());
            }
            info!("{}", report);
            match report.manifest_error.take() {
                Some(err) => {
                    error!("Posts were processed, run postbox manifest once this is fixed: {}", err);
                    Err(err.into())
                }
                None => Ok(()),
            }
        }
        Err(err) => {
            error!("Nothing was processed: {}", err);
            Err(err.into())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { path }) => init_cmd(path),
        Some(Command::Manifest) => manifest_cmd(open_pipeline(args.config_path)?),
        Some(Command::Run) | None => run_cmd(open_pipeline(args.config_path)?),
    }
}
