//! `mdm download` – fetch one format of a media item and merge it.

use anyhow::{Context, Result};
use mdm_core::config::MdmConfig;
use mdm_core::info;
use mdm_core::media::MediaItem;
use mdm_core::pipeline::{DownloadOutcome, DownloadRequest, Pipeline};
use mdm_core::prompt::FixedAnswer;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub struct DownloadArgs {
    pub item: PathBuf,
    pub format: Option<String>,
    pub output_name: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub referer: String,
    pub threads: Option<usize>,
    pub yes: bool,
}

pub async fn run_download(cfg: MdmConfig, args: DownloadArgs) -> Result<()> {
    let media = MediaItem::load(&args.item)?
        .normalize()
        .with_context(|| format!("normalizing {}", args.item.display()))?;

    let output_dir = match args.output_dir.or_else(|| cfg.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let format = Pipeline::select(&media, args.format.as_deref())?;
    print!("{}", info::render_info(&media, Some(format)));

    let mut pipeline = Pipeline::new(&cfg, args.referer);
    if let Some(n) = args.threads {
        pipeline = pipeline.with_threads(n);
    }
    if args.yes {
        pipeline = pipeline.with_prompt(Arc::new(FixedAnswer(true)));
    }
    let request = DownloadRequest {
        format: args.format,
        output_name: args.output_name,
        output_dir,
    };

    // Fragment workers are OS threads doing blocking curl I/O.
    let outcome = tokio::task::spawn_blocking(move || pipeline.download(&media, &request))
        .await
        .context("download task panicked")??;

    match &outcome {
        DownloadOutcome::AlreadyMerged(path) => {
            println!("{}: file already exists, skipping", path.display())
        }
        DownloadOutcome::Single(path) | DownloadOutcome::Merged(path) => {
            println!("Saved {}", path.display())
        }
        DownloadOutcome::Parts(paths) => {
            for path in paths {
                println!("Saved {}", path.display());
            }
        }
    }
    tracing::info!(?outcome, "download finished");
    Ok(())
}
