pub mod fusion;
pub mod units;

pub use fusion::{accel_angles, AngleEstimator, EstimatorState};
pub use units::UnitConverter;
