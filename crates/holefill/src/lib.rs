//! # Hole Filling Library
//!
//! Fills the pixels a binary mask marks as missing in a grayscale image by
//! interpolating from the pixels that border the hole.
//!
//! ## Core Features
//!
//! - **Preprocessing**: grayscale projection and hole/boundary classification under 4- or 8-connectivity
//! - **Pluggable weighting**: any `Fn(&PixelSample, &PixelSample) -> f32` works as a weight function
//! - **Two strategies**: an exact weighted average over the whole boundary, and an
//!   approximate one over a boundary compressed into a few averaged points
//! - **Pipeline System**: preprocess and fill in one call, with a report of what was filled
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use holefill::{Pipeline, io};
//!
//! let pipeline = Pipeline::builder()
//!     .exponent(3.0)
//!     .epsilon(0.01)
//!     .build()?;
//!
//! let image = io::load_rgb("photo.png")?;
//! let mask = io::load_rgb("mask.png")?;
//! let outcome = pipeline.process(&image, &mask)?;
//!
//! io::save_grid(&outcome.grid, io::filled_output_path("photo.png"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Weighting
//!
//! ```rust,no_run
//! use holefill::{Pipeline, PixelSample, Connectivity};
//!
//! let pipeline = Pipeline::builder()
//!     .connectivity(Connectivity::Four)
//!     .approximate(16)
//!     .weight_function(|hole: &PixelSample, source: &PixelSample| {
//!         let d = hole.row().abs_diff(source.row()) + hole.col().abs_diff(source.col());
//!         1.0 / (d as f32 + 0.5)
//!     })
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod manager;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{HoleFillError, Result};
pub use types::{
    Connectivity, Coord, GrayF32Image, HOLE_VALUE, PixelGrid, PixelSample, ProcessedImage,
};
pub use traits::*;
pub use algorithms::*;
pub use manager::{AlgorithmManager, FillParameters, FillingStrategy, WeightSource};
pub use pipeline::{FillOutcome, FillReport, Pipeline, builder::PipelineBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Horizontal gradient with a masked square in the middle.
    fn create_test_images() -> (RgbImage, RgbImage) {
        let image = RgbImage::from_fn(40, 30, |x, _| {
            let v = (x * 255 / 39) as u8;
            Rgb([v, v, v])
        });
        let mask = io::rectangular_mask(40, 30, io::MaskRect { x: 15, y: 10, width: 10, height: 8 });
        (image, mask)
    }

    fn boundary_range(processed: &ProcessedImage) -> (f32, f32) {
        processed
            .boundary_samples()
            .iter()
            .map(PixelSample::intensity)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    #[test]
    fn test_pipeline_basic() {
        let (image, mask) = create_test_images();
        let pipeline = Pipeline::builder().build().expect("default parameters are valid");

        let outcome = pipeline.process(&image, &mask).expect("Should fill successfully");
        assert_eq!(outcome.report.holes, 80);
        assert_eq!(outcome.report.width, 40);
        assert_eq!(outcome.report.height, 30);
        assert!(outcome.report.is_complete());
        assert!(outcome.grid.hole_coords().is_empty());
        assert_eq!(outcome.report.strategy, "Exact");
    }

    #[test]
    fn test_both_strategies_preserve_known_pixels_and_stay_convex() {
        let (image, mask) = create_test_images();
        let processed = Preprocessor::new(Connectivity::Eight).process(&image, &mask).unwrap();
        let (lo, hi) = boundary_range(&processed);

        for strategy in [FillingStrategy::Exact, FillingStrategy::Approximate { clusters: 8 }] {
            let pipeline = Pipeline::builder().strategy(strategy).build().unwrap();
            let outcome = pipeline.fill(processed.clone()).unwrap();

            for (before, after) in processed.grid().iter().zip(outcome.grid.iter()) {
                if processed.holes().contains(&before.key()) {
                    let v = after.intensity();
                    assert!(v >= lo - 1e-5 && v <= hi + 1e-5, "{strategy}: {v} outside [{lo}, {hi}]");
                } else {
                    assert_eq!(before, after);
                }
            }
        }
    }

    #[test]
    fn test_gradient_is_roughly_recovered() {
        let (image, mask) = create_test_images();
        let pipeline = PipelineBuilder::build_exact(2.0, 0.01).unwrap();
        let outcome = pipeline.process(&image, &mask).unwrap();

        // Left edge of the hole should stay darker than the right edge.
        let left = outcome.grid.intensity(Coord::new(14, 15)).unwrap();
        let right = outcome.grid.intensity(Coord::new(14, 24)).unwrap();
        assert!(left < right);
    }

    #[test]
    fn test_approximate_preset_uses_connectivity_cluster_count() {
        let pipeline = PipelineBuilder::build_approximate(Connectivity::Four, 3.0, 0.01).unwrap();
        assert_eq!(
            pipeline.manager().strategy(),
            FillingStrategy::Approximate { clusters: 4 }
        );

        let named = Pipeline::builder().strategy_named("ApproximateAlgorithm").build().unwrap();
        assert_eq!(
            named.manager().strategy(),
            FillingStrategy::Approximate { clusters: 8 }
        );
        assert!(named.info().contains("Approximate"));
    }

    #[test]
    fn test_invalid_configuration_fails_before_work() {
        assert!(matches!(
            Pipeline::builder().approximate(0).build(),
            Err(HoleFillError::InvalidClusterTarget(0))
        ));
        assert!(matches!(
            Pipeline::builder().epsilon(0.0).build(),
            Err(HoleFillError::InvalidEpsilon(_))
        ));

        let pipeline = Pipeline::builder().build().unwrap();
        let image = RgbImage::new(5, 5);
        let mask = RgbImage::new(5, 4);
        assert!(matches!(
            pipeline.process(&image, &mask),
            Err(HoleFillError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_all_hole_mask_reports_unfilled() {
        let image = RgbImage::from_pixel(3, 3, Rgb([90, 90, 90]));
        let mask = RgbImage::new(3, 3);
        let outcome = Pipeline::builder().build().unwrap().process(&image, &mask).unwrap();

        assert_eq!(outcome.report.boundary, 0);
        assert_eq!(outcome.report.unfilled, 9);
        assert!(!outcome.report.is_complete());
        assert!(outcome.grid.iter().all(PixelSample::is_hole));
    }

    #[test]
    fn test_custom_weight_through_builder() {
        let (image, mask) = create_test_images();
        let pipeline = Pipeline::builder()
            .weight_function(|_: &PixelSample, source: &PixelSample| {
                if source.col() < 20 { 1.0f32 } else { 0.0 }
            })
            .build()
            .unwrap();
        let outcome = pipeline.process(&image, &mask).unwrap();

        // Only the dark half of the boundary contributes.
        let right = outcome.grid.intensity(Coord::new(12, 24)).unwrap();
        assert!(right < 0.5);
    }

    #[test]
    fn test_report_json() {
        let (image, mask) = create_test_images();
        let outcome = Pipeline::builder().build().unwrap().process(&image, &mask).unwrap();
        let json = outcome.report.to_json().unwrap();
        let parsed: FillReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome.report);
    }
}
