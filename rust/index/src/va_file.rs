use std::collections::HashMap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::instrument;
use vafile_distance::MinkowskiDistance;
use vafile_error::{ErrorCodes, VaError};

use crate::search::{exhaustive_search, SearchEngine};
use crate::{
    Approximation, Approximator, BitPlan, BoundCalculator, BoxIndex, ConfigurationError,
    DataRange, Partition, PartitionBuilder, Point, SearchResult, ValidationError, VaFileConfig,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaFileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("The index has not been bulk loaded")]
    IncompleteIndex,
    #[error("The index has already been bulk loaded")]
    AlreadyLoaded,
}

impl VaError for VaFileError {
    fn code(&self) -> ErrorCodes {
        match self {
            VaFileError::Validation(e) => e.code(),
            VaFileError::Configuration(e) => e.code(),
            VaFileError::IncompleteIndex => ErrorCodes::FailedPrecondition,
            VaFileError::AlreadyLoaded => ErrorCodes::FailedPrecondition,
        }
    }
}

struct LoadedIndex {
    partitions: Vec<Partition>,
    boxes: BoxIndex,
}

/// Vector approximation file over a fixed bulk of points.
///
/// # Description
/// Construction fixes the dimensionality, data range and bit plan. A single
/// [`VaFile::bulk_load`] then builds the partitions and boxes; afterwards
/// the index is read-only and may be queried from many threads at once.
pub struct VaFile {
    config: VaFileConfig,
    plan: BitPlan,
    loaded: Option<LoadedIndex>,
}

impl VaFile {
    pub fn construct(
        num_dim: usize,
        num_points: usize,
        num_bit: u32,
        data_range: DataRange,
    ) -> Result<Self, VaFileError> {
        Self::from_config(&VaFileConfig::new(num_dim, num_points, num_bit, data_range))
    }

    pub fn from_config(config: &VaFileConfig) -> Result<Self, VaFileError> {
        config.data_range.validate()?;
        let plan = BitPlan::allocate(config.num_bit, config.num_dim)?;
        Ok(Self {
            config: config.clone(),
            plan,
            loaded: None,
        })
    }

    pub fn config(&self) -> &VaFileConfig {
        &self.config
    }

    pub fn num_dim(&self) -> usize {
        self.config.num_dim
    }

    pub fn data_range(&self) -> DataRange {
        self.config.data_range
    }

    pub fn bit_plan(&self) -> &BitPlan {
        &self.plan
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn partitions(&self) -> Option<&[Partition]> {
        self.loaded.as_ref().map(|loaded| loaded.partitions.as_slice())
    }

    pub fn boxes(&self) -> Option<&BoxIndex> {
        self.loaded.as_ref().map(|loaded| &loaded.boxes)
    }

    /// Number of non-empty boxes, `0` before loading.
    pub fn box_count(&self) -> usize {
        self.boxes().map_or(0, BoxIndex::box_count)
    }

    /// Number of stored points, `0` before loading.
    pub fn len(&self) -> usize {
        self.boxes().map_or(0, BoxIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn loaded(&self) -> Result<&LoadedIndex, VaFileError> {
        self.loaded.as_ref().ok_or(VaFileError::IncompleteIndex)
    }

    /// Checks dimensionality and that every coordinate lies in the data range.
    pub fn check_valid(&self, point: &[f32]) -> Result<(), ValidationError> {
        if point.len() != self.config.num_dim {
            return Err(ValidationError::DimensionMismatch {
                expected: self.config.num_dim,
                got: point.len(),
            });
        }
        let range = self.config.data_range;
        match point.iter().position(|value| !range.contains(*value)) {
            Some(dim) => Err(ValidationError::OutOfRange {
                dim,
                value: point[dim],
                lo: range.lo,
                hi: range.hi,
            }),
            None => Ok(()),
        }
    }

    fn check_weights(&self, weights: Option<&[f32]>) -> Result<(), ValidationError> {
        let Some(weights) = weights else {
            return Ok(());
        };
        if weights.len() != self.config.num_dim {
            return Err(ValidationError::WeightsLength {
                expected: self.config.num_dim,
                got: weights.len(),
            });
        }
        match weights
            .iter()
            .position(|weight| !weight.is_finite() || *weight < 0.0)
        {
            Some(dim) => Err(ValidationError::InvalidWeight {
                dim,
                weight: weights[dim],
            }),
            None => Ok(()),
        }
    }

    /// `metric` rescaled so that the widest weighted coordinate difference
    /// this index can see is close to `1`. `weights` must be validated.
    fn normalized(&self, metric: MinkowskiDistance, weights: Option<&[f32]>) -> MinkowskiDistance {
        let max_weight = weights.map_or(1.0, |weights| {
            weights
                .iter()
                .fold(0.0_f64, |max, weight| max.max(f64::from(*weight)))
        });
        metric.normalized_for(self.config.data_range.extent() * max_weight)
    }

    /// Builds partitions from `points` and assigns every point to its box.
    /// Returns the number of non-empty boxes.
    ///
    /// All points are validated before anything is built, so a failed load
    /// leaves the index unloaded.
    #[instrument(skip(self, points), fields(num_dim = self.config.num_dim, num_bit = self.plan.num_bit()))]
    pub fn bulk_load<I, P>(&mut self, points: I) -> Result<usize, VaFileError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        if self.loaded.is_some() {
            return Err(VaFileError::AlreadyLoaded);
        }
        let points = points.into_iter();
        let mut bulk = Vec::with_capacity(points.size_hint().0);
        for point in points {
            let point = point.into();
            self.check_valid(&point)?;
            bulk.push(point);
        }
        if bulk.is_empty() {
            return Err(ValidationError::EmptyBulk.into());
        }
        if self.config.num_points != 0 && self.config.num_points != bulk.len() {
            tracing::warn!(
                expected = self.config.num_points,
                got = bulk.len(),
                "Bulk size differs from the configured number of points"
            );
        }

        let partitions = PartitionBuilder::new(&self.plan, self.config.data_range).build(&bulk);
        let approximator = Approximator::new(&self.plan, &partitions);
        let keys = bulk
            .par_iter()
            .map(|point| approximator.approximate(point))
            .collect::<Vec<_>>();
        let boxes = BoxIndex::assemble(bulk, keys);
        let box_count = boxes.box_count();
        tracing::info!(points = boxes.len(), boxes = box_count, "Bulk load complete");

        self.loaded = Some(LoadedIndex { partitions, boxes });
        Ok(box_count)
    }

    /// Approximation of `point` under the loaded partitions.
    pub fn approximate(&self, point: &[f32]) -> Result<Approximation, VaFileError> {
        let loaded = self.loaded()?;
        self.check_valid(point)?;
        Ok(Approximator::new(&self.plan, &loaded.partitions).approximate(point))
    }

    /// Bin index of `key` in dimension `dim`.
    pub fn decode(&self, key: Approximation, dim: usize) -> Result<u32, VaFileError> {
        let loaded = self.loaded()?;
        if dim >= self.config.num_dim {
            return Err(ValidationError::DimensionMismatch {
                expected: self.config.num_dim,
                got: dim + 1,
            }
            .into());
        }
        Ok(Approximator::new(&self.plan, &loaded.partitions).decode(key, dim))
    }

    /// Minkowski distance of order `p` between two valid points.
    pub fn distance(
        &self,
        p: f32,
        a: &[f32],
        b: &[f32],
        weights: Option<&[f32]>,
    ) -> Result<f64, VaFileError> {
        let metric = MinkowskiDistance::new(p).map_err(ConfigurationError::from)?;
        self.check_valid(a)?;
        self.check_valid(b)?;
        self.check_weights(weights)?;
        Ok(self.normalized(metric, weights).distance(a, b, weights))
    }

    fn with_bounds<F>(
        &self,
        p: f32,
        query: &[f32],
        weights: Option<&[f32]>,
        f: F,
    ) -> Result<HashMap<Approximation, f64>, VaFileError>
    where
        F: Fn(&BoundCalculator<'_>, Approximation) -> f64 + Sync,
    {
        let metric = MinkowskiDistance::new(p).map_err(ConfigurationError::from)?;
        let loaded = self.loaded()?;
        self.check_valid(query)?;
        self.check_weights(weights)?;
        let metric = self.normalized(metric, weights);
        let approximator = Approximator::new(&self.plan, &loaded.partitions);
        let calculator =
            BoundCalculator::new(approximator, &loaded.partitions, metric, query, weights);
        Ok(loaded
            .boxes
            .boxes()
            .par_iter()
            .map(|point_box| (point_box.key(), f(&calculator, point_box.key())))
            .collect())
    }

    /// Lower bound distance from `query` to every box.
    pub fn lower_bounds(
        &self,
        p: f32,
        query: &[f32],
        weights: Option<&[f32]>,
    ) -> Result<HashMap<Approximation, f64>, VaFileError> {
        self.with_bounds(p, query, weights, |calculator, key| {
            calculator.lower_bound(key)
        })
    }

    /// Upper bound distance from `query` to every box.
    pub fn upper_bounds(
        &self,
        p: f32,
        query: &[f32],
        weights: Option<&[f32]>,
    ) -> Result<HashMap<Approximation, f64>, VaFileError> {
        self.with_bounds(p, query, weights, |calculator, key| {
            calculator.upper_bound(key)
        })
    }

    /// The `k` nearest stored points to `query` under the order-`p` Minkowski
    /// distance, ascending. Fewer than `k` are returned when fewer points are
    /// stored.
    pub fn nearest_search(
        &self,
        p: f32,
        query: &[f32],
        k: usize,
    ) -> Result<SearchResult, VaFileError> {
        self.search(p, query, k, None)
    }

    /// [`VaFile::nearest_search`] with per-dimension weights.
    pub fn nearest_search_weighted(
        &self,
        p: f32,
        query: &[f32],
        k: usize,
        weights: &[f32],
    ) -> Result<SearchResult, VaFileError> {
        self.search(p, query, k, Some(weights))
    }

    #[instrument(skip(self, query, weights))]
    fn search(
        &self,
        p: f32,
        query: &[f32],
        k: usize,
        weights: Option<&[f32]>,
    ) -> Result<SearchResult, VaFileError> {
        let metric = MinkowskiDistance::new(p).map_err(ConfigurationError::from)?;
        if k == 0 {
            return Err(ConfigurationError::ZeroK.into());
        }
        let loaded = self.loaded()?;
        self.check_valid(query)?;
        self.check_weights(weights)?;

        let metric = self.normalized(metric, weights);
        let approximator = Approximator::new(&self.plan, &loaded.partitions);
        let calculator =
            BoundCalculator::new(approximator, &loaded.partitions, metric, query, weights);
        let seed = metric.diameter(self.config.num_dim, self.config.data_range.extent(), weights);
        let engine = SearchEngine::new(&loaded.boxes, &calculator, metric, query, weights);
        Ok(engine.run(k, seed))
    }

    /// Linear scan over all stored points; same contract as
    /// [`VaFile::nearest_search`], with `visited` equal to the point count.
    pub fn exhaustive_search(
        &self,
        p: f32,
        query: &[f32],
        k: usize,
        weights: Option<&[f32]>,
    ) -> Result<SearchResult, VaFileError> {
        let metric = MinkowskiDistance::new(p).map_err(ConfigurationError::from)?;
        if k == 0 {
            return Err(ConfigurationError::ZeroK.into());
        }
        let loaded = self.loaded()?;
        self.check_valid(query)?;
        self.check_weights(weights)?;
        Ok(exhaustive_search(
            loaded.boxes.points(),
            self.normalized(metric, weights),
            query,
            k,
            weights,
        ))
    }
}
