//! Box-level distance bounds.
//!
//! For a query `q` in bin `rq` and a box in bin `r` of some dimension with
//! edges `[lo_r, hi_r]`, the per-dimension differences are
//!
//! | case     | lower bound   | upper bound                     |
//! |----------|---------------|---------------------------------|
//! | `rq > r` | `q - hi_r`    | `q - lo_r`                      |
//! | `rq = r` | `0`           | `max(q - lo_r, hi_r - q)`       |
//! | `rq < r` | `lo_r - q`    | `hi_r - q`                      |
//!
//! and both are folded with the same Minkowski aggregation as the exact
//! distance. Every point `x` stored in the box satisfies
//! `lower <= d(q, x) <= upper`.

use vafile_distance::MinkowskiDistance;

use crate::{Approximation, Approximator, Partition};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Bound computation for one query. Construction bins the query once.
pub struct BoundCalculator<'a> {
    approximator: Approximator<'a>,
    partitions: &'a [Partition],
    metric: MinkowskiDistance,
    weights: Option<&'a [f32]>,
    query: &'a [f32],
    query_bins: Vec<u32>,
}

impl<'a> BoundCalculator<'a> {
    /// `query` and `weights` must already be validated.
    pub fn new(
        approximator: Approximator<'a>,
        partitions: &'a [Partition],
        metric: MinkowskiDistance,
        query: &'a [f32],
        weights: Option<&'a [f32]>,
    ) -> Self {
        let query_bins = approximator.bins(query);
        Self {
            approximator,
            partitions,
            metric,
            weights,
            query,
            query_bins,
        }
    }

    fn weight(&self, dim: usize) -> f32 {
        self.weights.map_or(1.0, |weights| weights[dim])
    }

    /// Box edges and query coordinate of `dim`, widened to `f64`.
    fn edges(&self, key: Approximation, dim: usize) -> (u32, f64, f64, f64) {
        let bin = self.approximator.decode(key, dim);
        let partition = &self.partitions[dim];
        (
            bin,
            f64::from(partition.lower(bin)),
            f64::from(partition.upper(bin)),
            f64::from(self.query[dim]),
        )
    }

    fn lower_diff(&self, key: Approximation, dim: usize) -> f64 {
        let (bin, lo, hi, q) = self.edges(key, dim);
        match self.query_bins[dim].cmp(&bin) {
            std::cmp::Ordering::Greater => q - hi,
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => lo - q,
        }
    }

    fn upper_diff(&self, key: Approximation, dim: usize) -> f64 {
        let (bin, lo, hi, q) = self.edges(key, dim);
        match self.query_bins[dim].cmp(&bin) {
            std::cmp::Ordering::Greater => q - lo,
            std::cmp::Ordering::Equal => (q - lo).max(hi - q),
            std::cmp::Ordering::Less => hi - q,
        }
    }

    pub fn lower_bound(&self, key: Approximation) -> f64 {
        self.metric.aggregate(
            (0..self.query.len()).map(|dim| (self.weight(dim), self.lower_diff(key, dim))),
        )
    }

    pub fn upper_bound(&self, key: Approximation) -> f64 {
        self.metric.aggregate(
            (0..self.query.len()).map(|dim| (self.weight(dim), self.upper_diff(key, dim))),
        )
    }

    pub fn bounds(&self, key: Approximation) -> BoxBounds {
        BoxBounds {
            lower: self.lower_bound(key),
            upper: self.upper_bound(key),
        }
    }
}
