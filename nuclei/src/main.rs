//! nuclei CLI: segment nucleus tiles into polygon feature files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use nuclei::{NucleusSegmenter, SegmentationConfig, SlideInfo};

#[derive(Parser)]
#[command(name = "nuclei")]
#[command(about = "Extract nucleus polygons from detection/segmentation confidence tiles")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also write daily-rolling log files into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment tiles named `<file_id>_SEG.png`; outputs are written next to each tile.
    Segment(SegmentArgs),
}

#[derive(Debug, Clone, Args)]
struct SegmentArgs {
    /// Tiles to process.
    #[arg(required = true)]
    tiles: Vec<PathBuf>,

    /// Slide identifier recorded in the metadata sidecar.
    #[arg(long)]
    image_id: String,

    /// Slide width in pixels.
    #[arg(long)]
    wsi_width: u64,

    /// Slide height in pixels.
    #[arg(long)]
    wsi_height: u64,

    /// Free-form method description recorded in the metadata sidecar.
    #[arg(long, default_value = "seed-driven compact watershed")]
    method_description: String,

    /// YAML file with segmentation parameters; missing fields keep defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Segmentation threshold as a fraction of the confidence range.
    #[arg(long)]
    seg_thres: Option<f32>,

    /// Detection threshold as a fraction of the confidence range.
    #[arg(long)]
    det_thres: Option<f32>,

    /// Half-width of the polygon extraction window in pixels.
    #[arg(long)]
    window_half_size: Option<usize>,

    /// Minimum nucleus area in working-resolution pixels.
    #[arg(long)]
    min_nucleus_size: Option<usize>,

    /// Seedless regions at or above this area are not given a seed.
    #[arg(long)]
    max_nucleus_size: Option<usize>,
}

impl SegmentArgs {
    fn load_config(&self) -> Result<SegmentationConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => SegmentationConfig::default(),
        };

        if let Some(v) = self.seg_thres {
            config.seg_thres = v;
        }
        if let Some(v) = self.det_thres {
            config.det_thres = v;
        }
        if let Some(v) = self.window_half_size {
            config.window_half_size = v;
        }
        if let Some(v) = self.min_nucleus_size {
            config.min_nucleus_size = v;
        }
        if let Some(v) = self.max_nucleus_size {
            config.max_nucleus_size = v;
        }
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<SegmentationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn run_segment(args: SegmentArgs) -> Result<()> {
    let config = args.load_config()?;
    tracing::debug!(?config, "Segmentation parameters");

    let slide = SlideInfo {
        image_id: args.image_id.clone(),
        width: args.wsi_width,
        height: args.wsi_height,
        method_description: args.method_description.clone(),
    };

    let segmenter = NucleusSegmenter::from_config(config);
    let results = segmenter.process_tiles(&args.tiles, &slide);

    let failed = results.iter().filter(|r| r.is_err()).count();
    let nuclei: usize = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|report| report.diagnostics.final_nucleus_count)
        .sum();
    tracing::info!(
        tiles = results.len(),
        failed,
        nuclei,
        "Segmentation finished"
    );

    if failed > 0 {
        bail!("{failed} of {} tiles failed", results.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    common::log_setup::setup_logging(&cli.log_level, cli.log_dir.as_deref(), "nuclei");

    match cli.command {
        Commands::Segment(args) => run_segment(args),
    }
}
