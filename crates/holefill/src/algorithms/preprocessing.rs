use std::collections::BTreeSet;

use image::{Luma, RgbImage};
use tracing::debug;

use crate::{
    error::{HoleFillError, Result},
    types::{Connectivity, Coord, GrayF32Image, HOLE_VALUE, PixelGrid, ProcessedImage},
};

/// Mask intensities strictly below this mark a hole.
pub const MASK_THRESHOLD: f32 = 0.5;

const MAX_CHANNEL_VALUE: f64 = 255.0;
const RED_FACTOR: f64 = 0.299;
const GREEN_FACTOR: f64 = 0.587;
const BLUE_FACTOR: f64 = 0.114;

/// Luma projection of an 8-bit RGB triple, normalized to `[0, 1]`.
pub fn grayscale([r, g, b]: [u8; 3]) -> f32 {
    let weighted = r as f64 * RED_FACTOR + g as f64 * GREEN_FACTOR + b as f64 * BLUE_FACTOR;
    (weighted / MAX_CHANNEL_VALUE) as f32
}

/// Project every pixel of an RGB image through [`grayscale`].
pub fn to_gray_f32(image: &RgbImage) -> GrayF32Image {
    GrayF32Image::from_fn(image.width(), image.height(), |x, y| {
        Luma([grayscale(image.get_pixel(x, y).0)])
    })
}

pub fn is_hole_intensity(mask_intensity: f32) -> bool {
    mask_intensity < MASK_THRESHOLD
}

/// Turns an image and its mask into a [`ProcessedImage`].
///
/// Pixels whose mask intensity is below [`MASK_THRESHOLD`] become holes. A
/// non-hole pixel is on the boundary when one of its in-grid neighbours under
/// the configured connectivity is a hole; neighbours outside the grid are ignored.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    pub connectivity: Connectivity,
}

impl Preprocessor {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// Preprocess 8-bit RGB inputs.
    pub fn process(&self, image: &RgbImage, mask: &RgbImage) -> Result<ProcessedImage> {
        check_dimensions(image.dimensions(), mask.dimensions())?;
        self.process_gray(&to_gray_f32(image), &to_gray_f32(mask))
    }

    /// Preprocess inputs that are already grayscale in `[0, 1]`.
    pub fn process_gray(&self, image: &GrayF32Image, mask: &GrayF32Image) -> Result<ProcessedImage> {
        check_dimensions(image.dimensions(), mask.dimensions())?;
        let (width, height) = (mask.width() as usize, mask.height() as usize);
        if width == 0 || height == 0 {
            return Err(HoleFillError::EmptyImage);
        }

        let mask_at = |coord: Coord| mask.get_pixel(coord.col as u32, coord.row as u32).0[0];

        let mut holes = BTreeSet::new();
        let mut boundary = BTreeSet::new();
        let grid = PixelGrid::from_fn(width, height, |coord| {
            if is_hole_intensity(mask_at(coord)) {
                holes.insert(coord);
                return HOLE_VALUE;
            }
            let touches_hole = self
                .connectivity
                .directions()
                .iter()
                .filter_map(|&dir| coord.offset(dir, height, width))
                .any(|neighbor| is_hole_intensity(mask_at(neighbor)));
            if touches_hole {
                boundary.insert(coord);
            }
            image.get_pixel(coord.col as u32, coord.row as u32).0[0]
        });

        debug!(
            width,
            height,
            connectivity = %self.connectivity,
            holes = holes.len(),
            boundary = boundary.len(),
            "preprocessed image"
        );

        Ok(ProcessedImage::new(grid, holes, boundary))
    }
}

fn check_dimensions(image: (u32, u32), mask: (u32, u32)) -> Result<()> {
    if image != mask {
        return Err(HoleFillError::DimensionMismatch { image, mask });
    }
    Ok(())
}
