//! Input tiles: file name geometry and raster decoding.
//!
//! A tile file is named `<file_id>_SEG.png`, where `file_id` is a list of
//! `_`-separated tokens. Token 0 and 1 are the tile's global X and Y offset in
//! the slide, token 5 is the integer resize factor the maps were produced at.
//! The red channel holds detection confidence, the green channel holds
//! segmentation confidence.


use std::path::Path;

use glam::DVec2;
use image::RgbImage;
use image::imageops::{self, FilterType};
use serde::Serialize;

use common::Buffer2;

use crate::error::{Result, SegmentationError};

/// File name suffix of a detection/segmentation tile.
pub const TILE_SUFFIX: &str = "_SEG.png";

const OFFSET_X_TOKEN: usize = 0;
const OFFSET_Y_TOKEN: usize = 1;
const RESIZE_FACTOR_TOKEN: usize = 5;

/// Placement of a tile within its slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileGeometry {
    pub offset_x: i64,
    pub offset_y: i64,
    /// Integer upsampling applied before the maps were computed.
    pub resize_factor: u32,
}

impl TileGeometry {
    #[inline]
    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.offset_x as f64, self.offset_y as f64)
    }
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            resize_factor: 1,
        }
    }
}

/// Parsed tile file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileName {
    /// File name without the `_SEG.png` suffix.
    pub file_id: String,
    pub geometry: TileGeometry,
}

impl TileName {
    pub fn parse(file_name: &str) -> Result<Self> {
        let malformed = |reason: String| SegmentationError::FileName {
            name: file_name.to_string(),
            reason,
        };

        let file_id = file_name
            .strip_suffix(TILE_SUFFIX)
            .ok_or_else(|| malformed(format!("missing '{TILE_SUFFIX}' suffix")))?;

        let tokens: Vec<&str> = file_id.split('_').collect();
        if tokens.len() <= RESIZE_FACTOR_TOKEN {
            return Err(malformed(format!(
                "expected at least {} '_'-separated tokens, found {}",
                RESIZE_FACTOR_TOKEN + 1,
                tokens.len()
            )));
        }

        let integer = |index: usize, what: &str| {
            tokens[index].parse::<i64>().map_err(|_| {
                malformed(format!(
                    "token {index} ({what}) is not an integer: '{}'",
                    tokens[index]
                ))
            })
        };

        let offset_x = integer(OFFSET_X_TOKEN, "x offset")?;
        let offset_y = integer(OFFSET_Y_TOKEN, "y offset")?;
        let resize_factor = integer(RESIZE_FACTOR_TOKEN, "resize factor")?;
        let resize_factor = u32::try_from(resize_factor)
            .ok()
            .filter(|&rf| rf >= 1)
            .ok_or_else(|| malformed(format!("resize factor must be >= 1, got {resize_factor}")))?;

        Ok(Self {
            file_id: file_id.to_string(),
            geometry: TileGeometry {
                offset_x,
                offset_y,
                resize_factor,
            },
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SegmentationError::FileName {
                name: path.display().to_string(),
                reason: "not a UTF-8 file name".to_string(),
            })?;
        Self::parse(file_name)
    }

    /// `<file_id>-features.csv`
    pub fn features_file_name(&self) -> String {
        format!("{}-features.csv", self.file_id)
    }

    /// `<file_id>-algmeta.json`
    pub fn metadata_file_name(&self) -> String {
        format!("{}-algmeta.json", self.file_id)
    }
}

/// Detection and segmentation maps of one tile at working resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMaps {
    pub detection: Buffer2<f32>,
    pub segmentation: Buffer2<f32>,
}

impl TileMaps {
    #[inline]
    pub fn width(&self) -> usize {
        self.detection.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.detection.height()
    }
}

/// Decode a tile and upsample it by `resize_factor` (nearest neighbour).
pub fn read_tile(path: &Path, resize_factor: u32) -> Result<TileMaps> {
    let decoded = image::open(path).map_err(|source| SegmentationError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded.to_rgb8();

    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(SegmentationError::EmptyTile {
            path: path.to_path_buf(),
            width,
            height,
        });
    }

    Ok(split_channels(&upsample(&rgb, resize_factor)))
}

/// Integer nearest-neighbour upsampling; factor 1 is a no-op.
pub fn upsample(rgb: &RgbImage, resize_factor: u32) -> RgbImage {
    if resize_factor <= 1 {
        return rgb.clone();
    }
    imageops::resize(
        rgb,
        rgb.width() * resize_factor,
        rgb.height() * resize_factor,
        FilterType::Nearest,
    )
}

/// Red channel to detection, green channel to segmentation.
pub fn split_channels(rgb: &RgbImage) -> TileMaps {
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let channel = |c: usize| {
        Buffer2::from_fn(width, height, |x, y| {
            rgb.get_pixel(x as u32, y as u32).0[c] as f32
        })
    };

    TileMaps {
        detection: channel(0),
        segmentation: channel(1),
    }
}
