use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort processing of a single tile.
///
/// Degenerate nuclei are not errors; they are counted in
/// [`SegmentationDiagnostics`](crate::SegmentationDiagnostics) and skipped.
#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("Malformed tile file name '{name}': {reason}")]
    FileName { name: String, reason: String },

    #[error("Failed to decode tile '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Tile '{path}' has unusable dimensions {width}x{height}")]
    EmptyTile {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write features '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Failed to serialize '{path}': {reason}")]
    Serialize { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
