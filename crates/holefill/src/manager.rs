use std::{fmt, sync::Arc};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};
use tracing::{debug, info};

use crate::{
    algorithms::{
        ApproximateFiller, DistanceWeight, ExactFiller,
        weighting::{validate_epsilon, validate_exponent},
    },
    error::{HoleFillError, Result},
    traits::{FillingAlgorithm, WeightFunction},
    types::{Connectivity, PixelGrid, ProcessedImage},
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
    PartialEq, Eq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum FillingStrategy {
    /// Weighted average over every boundary pixel
    #[strum(to_string = "Exact", serialize = "HoleFillingAlgorithm")]
    Exact,

    /// Weighted average over a boundary compressed into `clusters` points
    #[strum(to_string = "Approximate", serialize = "ApproximateAlgorithm")]
    Approximate {
        #[schemars(range(min = 1))]
        clusters: usize,
    },
}

impl Default for FillingStrategy {
    fn default() -> Self {
        Self::Exact
    }
}

impl FillingStrategy {
    /// Resolve a strategy by name.
    ///
    /// Unknown names resolve to [`FillingStrategy::Exact`].
    pub fn from_name(name: &str, clusters: usize) -> Self {
        match name.parse::<Self>() {
            Ok(Self::Approximate { .. }) => Self::Approximate { clusters },
            Ok(Self::Exact) => Self::Exact,
            Err(_) => {
                debug!(strategy = name, "unknown strategy name, using exact");
                Self::Exact
            }
        }
    }

    /// Get the JSON schema for all strategies
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FillingStrategy)
    }

    /// Get a list of all strategy names
    pub fn strategy_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Exact => "Weighted average of every boundary pixel, O(holes * boundary)",
            Self::Approximate { .. } => "Weighted average of clustered boundary points, O(holes * clusters)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => ExactFiller::NAME,
            Self::Approximate { .. } => ApproximateFiller::NAME,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Approximate { clusters: 0 } => Err(HoleFillError::InvalidClusterTarget(0)),
            _ => Ok(()),
        }
    }

    pub fn algorithm(&self) -> Box<dyn FillingAlgorithm> {
        match *self {
            Self::Exact => Box::new(ExactFiller),
            Self::Approximate { clusters } => Box::new(ApproximateFiller::new(clusters)),
        }
    }

    /// Validate, then fill every hole of `image` with this strategy.
    pub fn evaluate(&self, image: ProcessedImage, weight: &dyn WeightFunction) -> Result<PixelGrid> {
        self.validate()?;
        self.algorithm().fill(image, weight)
    }
}

/// Tunable parameters of a fill run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FillParameters {
    /// Neighbour model for boundary detection (4 or 8)
    pub connectivity: Connectivity,
    /// Distance exponent of the default weight function
    pub z: f32,
    /// Epsilon added to the weight denominator
    #[schemars(range(min = 0.0))]
    pub e: f32,
    pub strategy: FillingStrategy,
}

impl Default for FillParameters {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            z: 3.0,
            e: 0.01,
            strategy: FillingStrategy::Exact,
        }
    }
}

/// Where the manager takes its weight function from.
#[derive(Clone)]
pub enum WeightSource {
    /// [`DistanceWeight`] built from the manager's current `z` and `e` at run time
    Default,
    Custom(Arc<dyn WeightFunction>),
}

impl fmt::Debug for WeightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Holds the fill parameters, the weight function and the active strategy.
#[derive(Debug, Clone)]
pub struct AlgorithmManager {
    connectivity: Connectivity,
    z: f32,
    e: f32,
    weight: WeightSource,
    strategy: FillingStrategy,
}

impl AlgorithmManager {
    pub fn new(connectivity: Connectivity, z: f32, e: f32) -> Result<Self> {
        validate_exponent(z)?;
        validate_epsilon(e)?;
        Ok(Self {
            connectivity,
            z,
            e,
            weight: WeightSource::Default,
            strategy: FillingStrategy::Exact,
        })
    }

    pub fn from_parameters(parameters: &FillParameters) -> Result<Self> {
        let mut manager = Self::new(parameters.connectivity, parameters.z, parameters.e)?;
        manager.set_strategy(parameters.strategy)?;
        Ok(manager)
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn set_z(&mut self, z: f32) -> Result<()> {
        validate_exponent(z)?;
        self.z = z;
        Ok(())
    }

    pub fn e(&self) -> f32 {
        self.e
    }

    pub fn set_e(&mut self, e: f32) -> Result<()> {
        validate_epsilon(e)?;
        self.e = e;
        Ok(())
    }

    /// The weight function the next run will use.
    pub fn weight_function(&self) -> Arc<dyn WeightFunction> {
        match &self.weight {
            WeightSource::Default => Arc::new(DistanceWeight { z: self.z, e: self.e }),
            WeightSource::Custom(weight) => Arc::clone(weight),
        }
    }

    pub fn weight_source(&self) -> &WeightSource {
        &self.weight
    }

    /// Install a custom weight function. `None` is rejected.
    ///
    /// A custom function ignores later `set_z`/`set_e` calls until
    /// [`AlgorithmManager::use_default_weight`] is called.
    pub fn set_weight_function(&mut self, weight: Option<Arc<dyn WeightFunction>>) -> Result<()> {
        let weight = weight.ok_or(HoleFillError::MissingWeightFunction)?;
        self.weight = WeightSource::Custom(weight);
        Ok(())
    }

    pub fn use_default_weight(&mut self) {
        self.weight = WeightSource::Default;
    }

    /// Select a strategy by name; see [`FillingStrategy::from_name`].
    ///
    /// The approximate strategy gets one cluster per neighbour direction.
    pub fn select_strategy(&mut self, name: &str) -> FillingStrategy {
        self.strategy = FillingStrategy::from_name(name, self.connectivity.neighbor_count());
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: FillingStrategy) -> Result<()> {
        strategy.validate()?;
        self.strategy = strategy;
        Ok(())
    }

    pub fn strategy(&self) -> FillingStrategy {
        self.strategy
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn parameters(&self) -> FillParameters {
        FillParameters {
            connectivity: self.connectivity,
            z: self.z,
            e: self.e,
            strategy: self.strategy,
        }
    }

    /// Run the active strategy against `image`.
    pub fn run(&self, image: ProcessedImage) -> Result<PixelGrid> {
        self.strategy.validate()?;
        info!(
            strategy = self.strategy_name(),
            z = self.z,
            e = self.e,
            custom_weight = matches!(self.weight, WeightSource::Custom(_)),
            holes = image.holes().len(),
            boundary = image.boundary().len(),
            "filling holes"
        );
        let weight = self.weight_function();
        self.strategy.evaluate(image, weight.as_ref())
    }
}
