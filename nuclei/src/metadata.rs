//! JSON sidecar describing how a feature file was produced.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, SegmentationError};
use crate::tile::TileGeometry;

/// Slide-level information supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlideInfo {
    pub image_id: String,
    pub width: u64,
    pub height: u64,
    pub method_description: String,
}

/// Parameters echoed into the sidecar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmParameters {
    pub seg_thres: f32,
    pub det_thres: f32,
    pub window_half_size: usize,
    pub min_nucleus_size: usize,
    pub max_nucleus_size: usize,
}

impl From<&Config> for AlgorithmParameters {
    fn from(config: &Config) -> Self {
        Self {
            seg_thres: config.seg_thres,
            det_thres: config.det_thres,
            window_half_size: config.window_half_size,
            min_nucleus_size: config.min_nucleus_size,
            max_nucleus_size: config.max_nucleus_size,
        }
    }
}

/// Content of `<file_id>-algmeta.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmMetadata {
    pub input_file: String,
    pub output_file: String,
    pub image_id: String,
    pub image_width: u64,
    pub image_height: u64,
    pub method_description: String,
    pub tile: TileGeometry,
    pub parameters: AlgorithmParameters,
    pub nucleus_count: usize,
}

impl AlgorithmMetadata {
    pub fn new(
        input_file: &Path,
        output_file: &str,
        slide: &SlideInfo,
        geometry: TileGeometry,
        config: &Config,
        nucleus_count: usize,
    ) -> Self {
        Self {
            input_file: input_file.display().to_string(),
            output_file: output_file.to_string(),
            image_id: slide.image_id.clone(),
            image_width: slide.width,
            image_height: slide.height,
            method_description: slide.method_description.clone(),
            tile: geometry,
            parameters: AlgorithmParameters::from(config),
            nucleus_count,
        }
    }

    /// Write as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let io_error = |source| SegmentationError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            SegmentationError::Serialize {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)
    }
}
