use std::sync::Arc;

use crate::{
    error::Result,
    manager::{AlgorithmManager, FillParameters, FillingStrategy},
    pipeline::Pipeline,
    traits::WeightFunction,
    types::Connectivity,
};

/// Builder for fill pipelines with a fluent API
pub struct PipelineBuilder {
    parameters: FillParameters,
    strategy_name: Option<String>,
    weight: Option<Arc<dyn WeightFunction>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with [`FillParameters::default`]
    pub fn new() -> Self {
        Self {
            parameters: FillParameters::default(),
            strategy_name: None,
            weight: None,
        }
    }

    /// Replace every parameter at once
    pub fn parameters(mut self, parameters: FillParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.parameters.connectivity = connectivity;
        self
    }

    pub fn exponent(mut self, z: f32) -> Self {
        self.parameters.z = z;
        self
    }

    pub fn epsilon(mut self, e: f32) -> Self {
        self.parameters.e = e;
        self
    }

    pub fn strategy(mut self, strategy: FillingStrategy) -> Self {
        self.parameters.strategy = strategy;
        self.strategy_name = None;
        self
    }

    /// Select the strategy by name when building, see [`AlgorithmManager::select_strategy`]
    pub fn strategy_named(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = Some(name.into());
        self
    }

    /// Use the approximate strategy with `clusters` boundary points
    pub fn approximate(self, clusters: usize) -> Self {
        self.strategy(FillingStrategy::Approximate { clusters })
    }

    /// Use a custom weight function instead of the distance default
    pub fn weight_function<W>(mut self, weight: W) -> Self
    where
        W: WeightFunction + 'static,
    {
        self.weight = Some(Arc::new(weight));
        self
    }

    /// Build the pipeline, validating every parameter
    pub fn build(self) -> Result<Pipeline> {
        let mut manager = AlgorithmManager::from_parameters(&self.parameters)?;
        if let Some(name) = &self.strategy_name {
            manager.select_strategy(name);
        }
        if let Some(weight) = self.weight {
            manager.set_weight_function(Some(weight))?;
        }
        Ok(Pipeline::new(manager))
    }

    /// Exact strategy with the default weight function
    pub fn build_exact(z: f32, e: f32) -> Result<Pipeline> {
        Self::new().exponent(z).epsilon(e).build()
    }

    /// Approximate strategy with one cluster per neighbour direction
    pub fn build_approximate(connectivity: Connectivity, z: f32, e: f32) -> Result<Pipeline> {
        Self::new()
            .connectivity(connectivity)
            .exponent(z)
            .epsilon(e)
            .approximate(connectivity.neighbor_count())
            .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
