use serde::{Deserialize, Serialize};

use crate::{
    error::{HoleFillError, Result},
    traits::WeightFunction,
    types::PixelSample,
};

pub fn euclidean_distance(u: &PixelSample, v: &PixelSample) -> f32 {
    u.key().distance_squared(v.key()).sqrt()
}

/// Default weighting: `1 / (distance^z + e)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceWeight {
    pub z: f32,
    pub e: f32,
}

impl DistanceWeight {
    pub fn new(z: f32, e: f32) -> Result<Self> {
        validate_exponent(z)?;
        validate_epsilon(e)?;
        Ok(Self { z, e })
    }
}

impl WeightFunction for DistanceWeight {
    fn weight(&self, hole: &PixelSample, source: &PixelSample) -> f32 {
        1.0 / (euclidean_distance(hole, source).powf(self.z) + self.e)
    }
}

pub(crate) fn validate_exponent(z: f32) -> Result<()> {
    if !z.is_finite() {
        return Err(HoleFillError::InvalidExponent(z));
    }
    Ok(())
}

pub(crate) fn validate_epsilon(e: f32) -> Result<()> {
    if !e.is_finite() || e <= 0.0 {
        return Err(HoleFillError::InvalidEpsilon(e));
    }
    Ok(())
}
