use crate::{
    error::Result,
    types::{PixelGrid, PixelSample, ProcessedImage},
};

/// Scores how much a source pixel influences a hole pixel.
///
/// Any `Fn(&PixelSample, &PixelSample) -> f32` closure is a weight function.
/// Returned weights are expected to be non-negative.
pub trait WeightFunction: Send + Sync {
    fn weight(&self, hole: &PixelSample, source: &PixelSample) -> f32;
}

impl<F> WeightFunction for F
where
    F: Fn(&PixelSample, &PixelSample) -> f32 + Send + Sync,
{
    fn weight(&self, hole: &PixelSample, source: &PixelSample) -> f32 {
        self(hole, source)
    }
}

/// Trait for hole filling strategies
pub trait FillingAlgorithm: Send + Sync {
    /// Display name of the strategy
    fn name(&self) -> &'static str;

    /// Fill every hole pixel in place and hand the grid back
    fn fill(&self, image: ProcessedImage, weight: &dyn WeightFunction) -> Result<PixelGrid>;
}
