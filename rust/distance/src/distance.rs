//! Weighted Minkowski distance.
//!
//! `d(a, b) = (sum_i |w_i * (a_i - b_i)|^p)^(1/p)`
//!
//! Coordinates are `f32`; differences, terms and sums are `f64`. Before the
//! power is taken every weighted difference is multiplied by a power-of-two
//! `scale`, chosen with [`MinkowskiDistance::normalized_for`] so that the
//! largest possible weighted difference lands in `(1/2, 1]`. Scaling by a
//! power of two is exact, so the terms never overflow and only underflow for
//! differences many orders of magnitude below the data range.
//!
//! The per-dimension terms and the final aggregation are exposed separately
//! so that box bounds can be assembled with exactly the same arithmetic as
//! the point-to-point distance. Terms are always accumulated in dimension
//! order, which keeps a bound computed from smaller per-dimension
//! differences no larger than the true distance, bit for bit.

use thiserror::Error;
use vafile_error::{ErrorCodes, VaError};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DistanceError {
    #[error("Minkowski order must be a positive finite number, got {0}")]
    InvalidOrder(f32),
}

impl VaError for DistanceError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

/// Minkowski metric of order `p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinkowskiDistance {
    order: f32,
    scale: f64,
}

impl MinkowskiDistance {
    pub fn new(order: f32) -> Result<Self, DistanceError> {
        if !order.is_finite() || order <= 0.0 {
            return Err(DistanceError::InvalidOrder(order));
        }
        Ok(Self { order, scale: 1.0 })
    }

    pub fn manhattan() -> Self {
        Self {
            order: 1.0,
            scale: 1.0,
        }
    }

    pub fn euclidean() -> Self {
        Self {
            order: 2.0,
            scale: 1.0,
        }
    }

    pub fn order(&self) -> f32 {
        self.order
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Same metric with `scale` set to the power of two closest above
    /// `1 / max_weighted_diff`. Values that are zero or not finite leave the
    /// scale at `1`.
    pub fn normalized_for(self, max_weighted_diff: f64) -> Self {
        if !max_weighted_diff.is_finite() || max_weighted_diff <= 0.0 {
            return Self { scale: 1.0, ..self };
        }
        let exponent = max_weighted_diff.log2().ceil() as i32;
        Self {
            scale: 2f64.powi(-exponent),
            ..self
        }
    }

    /// Contribution of one dimension: `(weight * diff * scale)^p`.
    /// `diff` is expected to be non-negative.
    #[inline]
    pub fn term(&self, weight: f32, diff: f64) -> f64 {
        (f64::from(weight) * diff * self.scale).powf(f64::from(self.order))
    }

    /// Folds per-dimension `(weight, diff)` pairs into a distance.
    #[inline]
    pub fn aggregate<I>(&self, diffs: I) -> f64
    where
        I: IntoIterator<Item = (f32, f64)>,
    {
        let sum = diffs
            .into_iter()
            .fold(0.0_f64, |acc, (weight, diff)| acc + self.term(weight, diff));
        sum.powf(1.0 / f64::from(self.order)) / self.scale
    }

    /// Distance between `a` and `b`. Unit weights are used when `weights` is
    /// `None`. Lengths are not checked here, callers validate them.
    pub fn distance(&self, a: &[f32], b: &[f32], weights: Option<&[f32]>) -> f64 {
        let diffs = a
            .iter()
            .zip(b)
            .map(|(x, y)| (f64::from(*x) - f64::from(*y)).abs());
        match weights {
            Some(weights) => self.aggregate(weights.iter().copied().zip(diffs)),
            None => self.aggregate(diffs.map(|diff| (1.0, diff))),
        }
    }

    /// Largest possible distance between two points of a `num_dim`
    /// dimensional box whose sides all have length `extent`.
    pub fn diameter(&self, num_dim: usize, extent: f64, weights: Option<&[f32]>) -> f64 {
        match weights {
            Some(weights) => self.aggregate(weights.iter().map(|w| (*w, extent))),
            None => self.aggregate((0..num_dim).map(|_| (1.0, extent))),
        }
    }
}

impl Default for MinkowskiDistance {
    fn default() -> Self {
        Self::euclidean()
    }
}

impl TryFrom<f32> for MinkowskiDistance {
    type Error = DistanceError;

    fn try_from(order: f32) -> Result<Self, Self::Error> {
        Self::new(order)
    }
}
