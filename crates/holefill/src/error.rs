use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoleFillError {
    #[error("Image is {image:?} but mask is {mask:?} (width, height)")]
    DimensionMismatch { image: (u32, u32), mask: (u32, u32) },

    #[error("Invalid connectivity {0}: expected 4 or 8")]
    InvalidConnectivity(u8),

    #[error("No weight function supplied")]
    MissingWeightFunction,

    #[error("Invalid cluster target {0}: the approximate strategy needs at least one cluster")]
    InvalidClusterTarget(usize),

    #[error("Invalid epsilon {0}: must be finite and strictly positive")]
    InvalidEpsilon(f32),

    #[error("Invalid exponent {0}: must be finite")]
    InvalidExponent(f32),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HoleFillError {
    /// Errors raised by configuration checks before any pixel work starts.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidConnectivity(_)
                | Self::MissingWeightFunction
                | Self::InvalidClusterTarget(_)
                | Self::InvalidEpsilon(_)
                | Self::InvalidExponent(_)
                | Self::EmptyImage
        )
    }
}

pub type Result<T> = std::result::Result<T, HoleFillError>;
