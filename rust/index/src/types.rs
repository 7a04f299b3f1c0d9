use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vafile_distance::DistanceError;
use vafile_error::{ErrorCodes, VaError};

/// A stored point. Shared so that search results can hand points back
/// without copying coordinates.
pub type Point = Arc<[f32]>;

/// Closed interval `[lo, hi]` every coordinate must lie in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub lo: f32,
    pub hi: f32,
}

impl DataRange {
    pub fn new(lo: f32, hi: f32) -> Result<Self, ConfigurationError> {
        let range = Self { lo, hi };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.lo.is_finite() || !self.hi.is_finite() || self.lo > self.hi {
            return Err(ConfigurationError::InvalidRange {
                lo: self.lo,
                hi: self.hi,
            });
        }
        Ok(())
    }

    /// NaN is never contained.
    pub fn contains(&self, value: f32) -> bool {
        (self.lo..=self.hi).contains(&value)
    }

    /// Width of the range, computed in `f64` so it stays finite for any
    /// pair of finite bounds.
    pub fn extent(&self) -> f64 {
        f64::from(self.hi) - f64::from(self.lo)
    }
}

impl Default for DataRange {
    fn default() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Expected a point with {expected} dimensions, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Coordinate {value} in dimension {dim} lies outside [{lo}, {hi}]")]
    OutOfRange { dim: usize, value: f32, lo: f32, hi: f32 },
    #[error("Expected {expected} weights, got {got}")]
    WeightsLength { expected: usize, got: usize },
    #[error("Weight {weight} for dimension {dim} must be finite and non-negative")]
    InvalidWeight { dim: usize, weight: f32 },
    #[error("Bulk load requires at least one point")]
    EmptyBulk,
}

impl VaError for ValidationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Number of dimensions must be positive")]
    ZeroDimensions,
    #[error("Bit budget must be positive")]
    ZeroBits,
    #[error("Number of requested neighbors must be positive")]
    ZeroK,
    #[error("Invalid data range [{lo}, {hi}]")]
    InvalidRange { lo: f32, hi: f32 },
    #[error("Bit budget {num_bit} exceeds the maximum of {max}")]
    TooManyBits { num_bit: u32, max: u32 },
    #[error("{bits} bits for a single dimension exceeds the maximum of {max}")]
    TooManyBitsPerDimension { bits: u32, max: u32 },
    #[error(transparent)]
    InvalidOrder(#[from] DistanceError),
}

impl VaError for ConfigurationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}
