use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::Result, types::PixelGrid};

const FILLED_SUFFIX: &str = "_FILLED";
const DEFAULT_EXTENSION: &str = "png";

/// Load an image from disk as 8-bit RGB.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("not an image file: {}", path.display()),
        )
        .into());
    }
    Ok(image::open(path)?.to_rgb8())
}

/// `photo.jpg` becomes `photo_FILLED.jpg` in the same directory.
pub fn filled_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    input.with_file_name(format!("{stem}{FILLED_SUFFIX}.{extension}"))
}

/// Encode `grid` as 8-bit gray; the format follows the file extension.
pub fn save_grid<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<()> {
    let path = path.as_ref();
    grid.to_gray_image().save(path)?;
    info!(path = %path.display(), "saved filled image");
    Ok(())
}

/// Axis-aligned rectangle in image coordinates (x = column, y = row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaskRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// White mask with `hole` painted black.
pub fn rectangular_mask(width: u32, height: u32, hole: MaskRect) -> RgbImage {
    let mut mask = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    if hole.width > 0 && hole.height > 0 {
        let rect = Rect::at(hole.x as i32, hole.y as i32).of_size(hole.width, hole.height);
        draw_filled_rect_mut(&mut mask, rect, Rgb([0, 0, 0]));
    }
    mask
}
