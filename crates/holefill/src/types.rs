use std::collections::BTreeSet;

use image::{GrayImage, ImageBuffer, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{HoleFillError, Result};

/// Intensity stored in every pixel that still waits for a value.
pub const HOLE_VALUE: f32 = -1.0;

/// Single-channel image of real samples, the form external decoders hand in.
pub type GrayF32Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Neighbour offsets as `(row, col)` deltas: up, right, down, left, then the diagonals.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Grid position. Ordered by row, then column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step by `(d_row, d_col)`, returning `None` when that leaves a `height` x `width` grid.
    pub fn offset(self, (d_row, d_col): (isize, isize), height: usize, width: usize) -> Option<Coord> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row < height && col < width).then_some(Coord { row, col })
    }

    /// Squared Euclidean distance in pixel space.
    pub fn distance_squared(self, other: Coord) -> f32 {
        let d_row = self.row as f32 - other.row as f32;
        let d_col = self.col as f32 - other.col as f32;
        d_row * d_row + d_col * d_col
    }
}

/// Neighbour model used to decide which pixels touch a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

impl Connectivity {
    /// How many leading entries of [`DIRECTIONS`] count as neighbours.
    pub fn neighbor_count(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    pub fn directions(self) -> &'static [(isize, isize)] {
        &DIRECTIONS[..self.neighbor_count()]
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = HoleFillError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(HoleFillError::InvalidConnectivity(other)),
        }
    }
}

impl From<Connectivity> for u8 {
    fn from(value: Connectivity) -> Self {
        value.neighbor_count() as u8
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.neighbor_count())
    }
}

impl JsonSchema for Connectivity {
    fn schema_name() -> String {
        "Connectivity".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <u8 as JsonSchema>::json_schema(generator)
    }
}

/// A pixel position with its current intensity.
///
/// The coordinate never changes after creation; the intensity is either in
/// `[0, 1]` or [`HOLE_VALUE`]. Sets and maps key pixels by [`PixelSample::key`]
/// so that writing a filled value never invalidates a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSample {
    coord: Coord,
    intensity: f32,
}

impl PixelSample {
    pub fn new(row: usize, col: usize, intensity: f32) -> Self {
        Self {
            coord: Coord { row, col },
            intensity,
        }
    }

    pub fn at(coord: Coord, intensity: f32) -> Self {
        Self { coord, intensity }
    }

    pub fn hole(coord: Coord) -> Self {
        Self::at(coord, HOLE_VALUE)
    }

    pub fn key(&self) -> Coord {
        self.coord
    }

    pub fn row(&self) -> usize {
        self.coord.row
    }

    pub fn col(&self) -> usize {
        self.coord.col
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn is_hole(&self) -> bool {
        self.intensity == HOLE_VALUE
    }
}

/// Row-major owning grid of pixel samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<PixelSample>,
}

impl PixelGrid {
    /// Build a grid by asking `intensity` for the value at every coordinate.
    pub fn from_fn(width: usize, height: usize, mut intensity: impl FnMut(Coord) -> f32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let coord = Coord { row, col };
                pixels.push(PixelSample::at(coord, intensity(coord)));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord).then(|| coord.row * self.width + coord.col)
    }

    pub fn get(&self, coord: Coord) -> Option<&PixelSample> {
        self.index(coord).map(|i| &self.pixels[i])
    }

    pub fn intensity(&self, coord: Coord) -> Option<f32> {
        self.get(coord).map(PixelSample::intensity)
    }

    /// Overwrite the intensity at `coord`. Returns `false` if `coord` lies outside the grid.
    pub fn set_intensity(&mut self, coord: Coord, intensity: f32) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.pixels[i].set_intensity(intensity);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PixelSample> {
        self.pixels.iter()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[PixelSample]> {
        self.pixels.chunks(self.width.max(1))
    }

    /// Coordinates still carrying the hole sentinel.
    pub fn hole_coords(&self) -> Vec<Coord> {
        self.pixels
            .iter()
            .filter(|p| p.is_hole())
            .map(PixelSample::key)
            .collect()
    }

    /// 8-bit encoding for image writers. Remaining holes become black.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let sample = &self.pixels[y as usize * self.width + x as usize];
            let value = if sample.is_hole() {
                0
            } else {
                (sample.intensity().clamp(0.0, 1.0) * 255.0).round() as u8
            };
            Luma([value])
        })
    }

    /// Real-valued copy; holes keep [`HOLE_VALUE`].
    pub fn to_luma32f(&self) -> GrayF32Image {
        GrayF32Image::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.pixels[y as usize * self.width + x as usize].intensity()])
        })
    }
}

/// Output of preprocessing: the grid plus the hole and boundary coordinate sets.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    grid: PixelGrid,
    holes: BTreeSet<Coord>,
    boundary: BTreeSet<Coord>,
}

impl ProcessedImage {
    pub(crate) fn new(grid: PixelGrid, holes: BTreeSet<Coord>, boundary: BTreeSet<Coord>) -> Self {
        Self {
            grid,
            holes,
            boundary,
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn holes(&self) -> &BTreeSet<Coord> {
        &self.holes
    }

    pub fn boundary(&self) -> &BTreeSet<Coord> {
        &self.boundary
    }

    /// Boundary pixels with their current grid intensities, in coordinate order.
    pub fn boundary_samples(&self) -> Vec<PixelSample> {
        self.boundary
            .iter()
            .filter_map(|&coord| self.grid.get(coord).copied())
            .collect()
    }

    pub(crate) fn into_parts(self) -> (PixelGrid, BTreeSet<Coord>, BTreeSet<Coord>) {
        (self.grid, self.holes, self.boundary)
    }

    pub fn into_grid(self) -> PixelGrid {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_stays_inside_grid() {
        let corner = Coord::new(0, 0);
        assert_eq!(corner.offset((-1, 0), 3, 3), None);
        assert_eq!(corner.offset((0, -1), 3, 3), None);
        assert_eq!(corner.offset((1, 1), 3, 3), Some(Coord::new(1, 1)));
        assert_eq!(Coord::new(2, 2).offset((0, 1), 3, 3), None);
    }

    #[test]
    fn test_coord_ordering_is_row_major() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(0, 5), Coord::new(0, 1)];
        coords.sort();
        assert_eq!(coords, vec![Coord::new(0, 1), Coord::new(0, 5), Coord::new(1, 0)]);
    }

    #[test]
    fn test_connectivity_from_number() {
        assert_eq!(Connectivity::try_from(4).unwrap(), Connectivity::Four);
        assert_eq!(Connectivity::try_from(8).unwrap(), Connectivity::Eight);
        for bad in [0u8, 3, 6, 9] {
            assert!(matches!(
                Connectivity::try_from(bad),
                Err(HoleFillError::InvalidConnectivity(n)) if n == bad
            ));
        }
        assert_eq!(Connectivity::Four.directions(), &DIRECTIONS[..4]);
    }

    #[test]
    fn test_connectivity_serde_roundtrip_as_number() {
        let json = serde_json::to_string(&Connectivity::Four).unwrap();
        assert_eq!(json, "4");
        assert!(serde_json::from_str::<Connectivity>("6").is_err());
    }

    #[test]
    fn test_identity_survives_intensity_change() {
        let mut grid = PixelGrid::from_fn(2, 2, |_| HOLE_VALUE);
        let key = Coord::new(1, 0);
        let holes: BTreeSet<Coord> = grid.hole_coords().into_iter().collect();

        assert!(grid.set_intensity(key, 0.25));
        assert!(holes.contains(&grid.get(key).unwrap().key()));
        assert_eq!(grid.intensity(key), Some(0.25));
        assert!(!grid.set_intensity(Coord::new(2, 0), 0.5));
    }

    #[test]
    fn test_gray_encoding() {
        let grid = PixelGrid::from_fn(3, 1, |c| match c.col {
            0 => 1.0,
            1 => 0.5,
            _ => HOLE_VALUE,
        });
        let encoded = grid.to_gray_image();
        assert_eq!(encoded.get_pixel(0, 0).0, [255]);
        assert_eq!(encoded.get_pixel(1, 0).0, [128]);
        assert_eq!(encoded.get_pixel(2, 0).0, [0]);
        assert_eq!(grid.to_luma32f().get_pixel(2, 0).0, [HOLE_VALUE]);
    }
}
