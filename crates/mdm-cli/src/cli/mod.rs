//! CLI for the MDM media downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdm_core::config;
use std::path::PathBuf;

use commands::{run_config, run_download, run_dump, run_info, DownloadArgs};

/// Top-level CLI for the MDM media downloader.
#[derive(Debug, Parser)]
#[command(name = "mdm")]
#[command(about = "MDM: fetch media fragments and merge them into one file", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a media item described by an extractor JSON document.
    Download {
        /// Path to the media item JSON.
        item: PathBuf,

        /// Format to download (default: the largest one).
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Output file name without extension (default: the media title).
        #[arg(short = 'O', long)]
        output_name: Option<String>,

        /// Output directory (default: config `output_dir`, then the current directory).
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Referer header sent with every request.
        #[arg(short = 'r', long, default_value = "")]
        referer: String,

        /// Maximum fragments fetched at once (overrides config `thread_number`).
        #[arg(short = 'n', long, value_name = "N")]
        threads: Option<usize>,

        /// Overwrite existing files of unexpected size without asking.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print site, title, type and every available stream.
    Info {
        /// Path to the media item JSON.
        item: PathBuf,
    },

    /// Print the normalized media item as JSON.
    Dump {
        /// Path to the media item JSON.
        item: PathBuf,
    },

    /// Show the config file path and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                item,
                format,
                output_name,
                output_dir,
                referer,
                threads,
                yes,
            } => {
                let args = DownloadArgs {
                    item,
                    format,
                    output_name,
                    output_dir,
                    referer,
                    threads,
                    yes,
                };
                run_download(cfg, args).await?;
            }
            CliCommand::Info { item } => run_info(&item)?,
            CliCommand::Dump { item } => run_dump(&item)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
