pub mod builder;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    algorithms::Preprocessor,
    error::Result,
    manager::AlgorithmManager,
    types::{GrayF32Image, PixelGrid, ProcessedImage},
};

/// Summary of one fill run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub width: usize,
    pub height: usize,
    pub holes: usize,
    pub boundary: usize,
    /// Hole pixels still carrying the sentinel because their weight sum was zero
    pub unfilled: usize,
    pub strategy: String,
}

impl FillReport {
    pub fn is_complete(&self) -> bool {
        self.unfilled == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Filled grid plus its report
#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub grid: PixelGrid,
    pub report: FillReport,
}

/// Preprocessing and filling in one call
pub struct Pipeline {
    preprocessor: Preprocessor,
    manager: AlgorithmManager,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(manager: AlgorithmManager) -> Self {
        Self {
            preprocessor: Preprocessor::new(manager.connectivity()),
            manager,
        }
    }

    pub fn manager(&self) -> &AlgorithmManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut AlgorithmManager {
        &mut self.manager
    }

    /// Fill the holes `mask` marks in `image`.
    pub fn process(&self, image: &RgbImage, mask: &RgbImage) -> Result<FillOutcome> {
        let processed = self.preprocessor.process(image, mask)?;
        self.fill(processed)
    }

    /// Same as [`Pipeline::process`] for inputs already projected to grayscale.
    pub fn process_gray(&self, image: &GrayF32Image, mask: &GrayF32Image) -> Result<FillOutcome> {
        let processed = self.preprocessor.process_gray(image, mask)?;
        self.fill(processed)
    }

    /// Fill an already preprocessed image.
    pub fn fill(&self, processed: ProcessedImage) -> Result<FillOutcome> {
        let holes = processed.holes().len();
        let boundary = processed.boundary().len();
        let grid = self.manager.run(processed)?;

        let report = FillReport {
            width: grid.width(),
            height: grid.height(),
            holes,
            boundary,
            unfilled: grid.hole_coords().len(),
            strategy: self.manager.strategy_name().to_string(),
        };
        info!(
            holes = report.holes,
            unfilled = report.unfilled,
            strategy = %report.strategy,
            "fill complete"
        );

        Ok(FillOutcome { grid, report })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let params = self.manager.parameters();
        format!(
            "Pipeline: connectivity {}, z = {}, e = {}, strategy {}",
            params.connectivity,
            params.z,
            params.e,
            self.manager.strategy_name()
        )
    }
}
