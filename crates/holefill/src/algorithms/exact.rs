use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::{
    error::Result,
    traits::{FillingAlgorithm, WeightFunction},
    types::{Coord, PixelGrid, PixelSample, ProcessedImage},
};

/// Weighted average over the full boundary set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactFiller;

impl ExactFiller {
    pub const NAME: &'static str = "Exact";
}

impl FillingAlgorithm for ExactFiller {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fill(&self, image: ProcessedImage, weight: &dyn WeightFunction) -> Result<PixelGrid> {
        let sources = image.boundary_samples();
        let (mut grid, holes, _) = image.into_parts();
        debug!(holes = holes.len(), sources = sources.len(), "exact fill");
        weighted_fill(&mut grid, &holes, &sources, weight);
        Ok(grid)
    }
}

/// Write `sum(w * value) / sum(w)` over `sources` into every hole pixel.
///
/// A hole whose weight sum is not positive keeps its sentinel value. Returns
/// how many holes were left unfilled.
pub fn weighted_fill(
    grid: &mut PixelGrid,
    holes: &BTreeSet<Coord>,
    sources: &[PixelSample],
    weight: &dyn WeightFunction,
) -> usize {
    let mut unfilled = 0;
    for &coord in holes {
        let hole = PixelSample::hole(coord);
        let (numerator, denominator) =
            sources
                .iter()
                .fold((0.0f64, 0.0f64), |(num, den), source| {
                    let w = weight.weight(&hole, source) as f64;
                    (num + w * source.intensity() as f64, den + w)
                });

        let value = numerator / denominator;
        if denominator > 0.0 && value.is_finite() {
            grid.set_intensity(coord, value as f32);
        } else {
            unfilled += 1;
        }
    }

    if unfilled > 0 {
        warn!(unfilled, "hole pixels left unfilled: weight sum was zero");
    }
    unfilled
}
