pub mod preprocessing;
pub mod weighting;
pub mod exact;
pub mod approximate;

pub use preprocessing::*;
pub use weighting::*;
pub use exact::*;
pub use approximate::*;
