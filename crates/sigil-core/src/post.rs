//! Raster post-processing: background classification, directional gradient,
//! nearest-index downsampling, and horizontal padding.
//!
//! Steps run in a fixed order on the rendered canvas; each derives from or
//! mutates the previous raster, matching the published reference assets.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::{error::Error, fmt};

/// A pixel is background when its red channel exceeds 50 % of the channel
/// maximum. The canvas is white and the domain disk black, so this separates
/// the white surround (and white cell walls) from the inked disk.
const BACKGROUND_RED_THRESHOLD: u8 = 127;

/// Directional gradient weights over (column, row-from-top).
const GRADIENT_COL_WEIGHT: f64 = -0.2;
const GRADIENT_ROW_WEIGHT: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResampleError {
    ZeroTarget,
    TargetExceedsSource { source: u32, target: u32 },
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleError::ZeroTarget => write!(f, "target resolution must be positive"),
            ResampleError::TargetExceedsSource { source, target } => write!(
                f,
                "target resolution ({target}) exceeds source resolution ({source})"
            ),
        }
    }
}

impl Error for ResampleError {}

pub fn is_background(pixel: &Rgba<u8>) -> bool {
    pixel[0] > BACKGROUND_RED_THRESHOLD
}

/// Per-pixel background flags in row-major order.
pub fn background_mask(image: &RgbaImage) -> Vec<bool> {
    image.pixels().map(is_background).collect()
}

/// Recolor the canvas in place.
///
/// Foreground pixels get `start`..`end` interpolated by the normalized score
/// `-0.2 * col + 0.9 * row` (row 0 at the top), so `start` shows at the
/// top-right and `end` at the bottom-left. Background pixels keep their RGB
/// but become fully transparent.
pub fn apply_gradient(image: &mut RgbaImage, start: [u8; 3], end: [u8; 3]) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let z_min = GRADIENT_COL_WEIGHT * (width - 1) as f64;
    let z_max = GRADIENT_ROW_WEIGHT * (height - 1) as f64;
    let span = z_max - z_min;
    let row_bytes = width as usize * 4;
    let buffer: &mut [u8] = &mut *image;
    buffer
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, px) in line.chunks_exact_mut(4).enumerate() {
                if px[0] > BACKGROUND_RED_THRESHOLD {
                    px[3] = 0;
                    continue;
                }
                let z = GRADIENT_COL_WEIGHT * col as f64 + GRADIENT_ROW_WEIGHT * row as f64;
                let score = if span > 0.0 { (z - z_min) / span } else { 0.0 };
                for ch in 0..3 {
                    px[ch] = ((1.0 - score) * start[ch] as f64 + score * end[ch] as f64) as u8;
                }
            }
        });
}

/// Evenly spaced nearest-index selection along one axis.
///
/// Index `k` maps to `floor(k * (source - 1) / (target - 1))`; the result is
/// non-decreasing, starts at 0, and ends at `source - 1`. No smoothing.
pub fn sample_indices(source: u32, target: u32) -> Result<Vec<u32>, ResampleError> {
    if target == 0 {
        return Err(ResampleError::ZeroTarget);
    }
    if target > source {
        return Err(ResampleError::TargetExceedsSource { source, target });
    }
    if target == 1 {
        return Ok(vec![0]);
    }
    let last = (source - 1) as f64;
    let div = (target - 1) as f64;
    Ok((0..target).map(|k| (k as f64 * last / div) as u32).collect())
}

/// Downsample to a square `target` resolution by nearest-index selection
/// along both axes.
pub fn resample(image: &RgbaImage, target: u32) -> Result<RgbaImage, ResampleError> {
    let (width, height) = image.dimensions();
    let cols = sample_indices(width, target)?;
    let rows = sample_indices(height, target)?;
    let mut out = RgbaImage::new(target, target);
    for (y, &src_y) in rows.iter().enumerate() {
        for (x, &src_x) in cols.iter().enumerate() {
            out.put_pixel(x as u32, y as u32, *image.get_pixel(src_x, src_y));
        }
    }
    Ok(out)
}

/// Concatenate fully transparent blocks of half the image's width (integer
/// truncated) on both the left and the right.
pub fn pad_horizontal(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let pad = width / 2;
    let mut out = RgbaImage::new(width + 2 * pad, height);
    for (x, y, px) in image.enumerate_pixels() {
        out.put_pixel(x + pad, y, *px);
    }
    out
}
