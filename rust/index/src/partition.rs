//! Equi-depth quantization boundaries, one [`Partition`] per dimension.
//!
//! A partition over `2^b` bins holds `2^b + 1` non-decreasing marks with
//! `marks[0] == lo` and `marks[2^b] == hi`. Bin `t` covers
//! `[marks[t], marks[t + 1])`, except the last bin which also includes `hi`.
//! A value equal to an interior mark therefore falls into the upper bin.

use rayon::prelude::*;

use crate::{BitPlan, DataRange, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    marks: Vec<f32>,
}

impl Partition {
    /// Caller guarantees the marks are sorted and have `2^b + 1` entries.
    pub(crate) fn from_marks(marks: Vec<f32>) -> Self {
        debug_assert!(marks.len() >= 2);
        debug_assert!(marks.windows(2).all(|w| w[0] <= w[1]));
        Self { marks }
    }

    pub fn marks(&self) -> &[f32] {
        &self.marks
    }

    pub fn num_bins(&self) -> usize {
        self.marks.len() - 1
    }

    /// Left edge of `bin`.
    pub fn lower(&self, bin: u32) -> f32 {
        self.marks[bin as usize]
    }

    /// Right edge of `bin`.
    pub fn upper(&self, bin: u32) -> f32 {
        self.marks[bin as usize + 1]
    }

    /// Bin holding `value`. `value` must lie within the data range.
    ///
    /// Counts the interior marks that are `<= value`, which is the index of
    /// the last bin whose left edge does not exceed `value`.
    pub fn bin_of(&self, value: f32) -> u32 {
        let interior = &self.marks[1..self.num_bins()];
        interior.partition_point(|mark| *mark <= value) as u32
    }
}

/// Builds partitions from a bulk of points by sorting each dimension and
/// sampling every `n / 2^b`-th value.
pub struct PartitionBuilder<'plan> {
    plan: &'plan BitPlan,
    range: DataRange,
}

impl<'plan> PartitionBuilder<'plan> {
    pub fn new(plan: &'plan BitPlan, range: DataRange) -> Self {
        Self { plan, range }
    }

    /// `points` must be non-empty and already validated.
    pub fn build(&self, points: &[Point]) -> Vec<Partition> {
        (0..self.plan.num_dim())
            .into_par_iter()
            .map(|dim| self.build_dimension(points, dim))
            .collect()
    }

    fn build_dimension(&self, points: &[Point], dim: usize) -> Partition {
        let mut column = points.iter().map(|p| p[dim]).collect::<Vec<_>>();
        column.sort_unstable_by(f32::total_cmp);

        let size = self.plan.bins(dim);
        let div = column.len() / size;
        let mut marks = Vec::with_capacity(size + 1);
        marks.push(self.range.lo);
        marks.extend((1..size).map(|t| column[t * div]));
        marks.push(self.range.hi);

        tracing::trace!(dim, bins = size, step = div, "Built partition");
        Partition::from_marks(marks)
    }
}
