//! Branch-and-bound k-NN over boxes.
//!
//! 1. Bounds for every box are computed on the rayon pool.
//! 2. Filter: boxes whose lower bound does not exceed the running threshold
//!    are queued by lower bound, and their upper bounds are offered as
//!    placeholders to tighten the threshold. Each box holds at least one
//!    point, so the k-th smallest upper bound is never below the true k-th
//!    nearest distance.
//! 3. Refine: the candidate list is reseeded to infinity and boxes are
//!    scanned in ascending lower bound until the next lower bound reaches
//!    the k-th best exact distance.
//!
//! Ties: a point whose distance equals the final k-th distance may or may
//! not be reported, depending on scan order. The reported distances are
//! always the k smallest.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use vafile_distance::MinkowskiDistance;

use crate::{BoundCalculator, BoxBounds, BoxIndex, CandidateList, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the bulk it was loaded from.
    pub id: usize,
    pub point: Point,
    pub distance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResult {
    /// Ascending by distance. Shorter than `k` when fewer points exist.
    pub neighbors: Vec<Neighbor>,
    /// Number of exact distance computations.
    pub visited: usize,
    /// Number of boxes scanned during refinement.
    pub boxes_visited: usize,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.neighbors.iter().map(|neighbor| &neighbor.point)
    }

    pub fn distances(&self) -> Vec<f64> {
        self.neighbors
            .iter()
            .map(|neighbor| neighbor.distance)
            .collect()
    }

    pub fn ids(&self) -> Vec<usize> {
        self.neighbors.iter().map(|neighbor| neighbor.id).collect()
    }
}

/// Min-heap entry keyed on the lower bound.
#[derive(Debug)]
struct QueuedBox {
    lower: f64,
    slot: usize,
}

impl PartialEq for QueuedBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedBox {}

impl PartialOrd for QueuedBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedBox {
    // Reversed so that BinaryHeap pops the smallest lower bound first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .lower
            .total_cmp(&self.lower)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

pub(crate) struct SearchEngine<'a> {
    index: &'a BoxIndex,
    calculator: &'a BoundCalculator<'a>,
    metric: MinkowskiDistance,
    query: &'a [f32],
    weights: Option<&'a [f32]>,
}

impl<'a> SearchEngine<'a> {
    pub(crate) fn new(
        index: &'a BoxIndex,
        calculator: &'a BoundCalculator<'a>,
        metric: MinkowskiDistance,
        query: &'a [f32],
        weights: Option<&'a [f32]>,
    ) -> Self {
        Self {
            index,
            calculator,
            metric,
            query,
            weights,
        }
    }

    /// `optimistic_seed` must be at least the largest possible lower bound.
    pub(crate) fn run(&self, k: usize, optimistic_seed: f64) -> SearchResult {
        let bounds = self
            .index
            .boxes()
            .par_iter()
            .map(|point_box| self.calculator.bounds(point_box.key()))
            .collect::<Vec<BoxBounds>>();

        let mut candidates = CandidateList::new(k, optimistic_seed);
        let mut queue = BinaryHeap::with_capacity(bounds.len());
        let mut delta = candidates.threshold();
        for (slot, bound) in bounds.iter().enumerate() {
            if bound.lower <= delta {
                delta = candidates.offer(bound.upper, slot);
                queue.push(QueuedBox {
                    lower: bound.lower,
                    slot,
                });
            }
        }
        tracing::debug!(
            boxes = bounds.len(),
            queued = queue.len(),
            threshold = delta,
            "Filter phase done"
        );

        candidates.reseed(f64::INFINITY);
        let mut visited = 0;
        let mut boxes_visited = 0;
        while let Some(QueuedBox { lower, slot }) = queue.pop() {
            if lower >= candidates.threshold() {
                break;
            }
            boxes_visited += 1;
            for id in self.index.boxes()[slot].members() {
                visited += 1;
                let point = &self.index.points()[*id];
                let distance = self.metric.distance(self.query, point, self.weights);
                candidates.offer(distance, *id);
            }
        }

        let neighbors = candidates
            .into_filled()
            .map(|(distance, id)| Neighbor {
                id,
                point: self.index.points()[id].clone(),
                distance,
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            found = neighbors.len(),
            visited,
            boxes_visited,
            "Refinement done"
        );
        SearchResult {
            neighbors,
            visited,
            boxes_visited,
        }
    }
}

/// Linear scan over every point with the same distance kernel as the
/// branch-and-bound search. Serves as ground truth.
pub(crate) fn exhaustive_search(
    points: &[Point],
    metric: MinkowskiDistance,
    query: &[f32],
    k: usize,
    weights: Option<&[f32]>,
) -> SearchResult {
    let mut candidates = CandidateList::new(k, f64::INFINITY);
    for (id, point) in points.iter().enumerate() {
        candidates.offer(metric.distance(query, point, weights), id);
    }
    let neighbors = candidates
        .into_filled()
        .map(|(distance, id)| Neighbor {
            id,
            point: points[id].clone(),
            distance,
        })
        .collect();
    SearchResult {
        neighbors,
        visited: points.len(),
        boxes_visited: 0,
    }
}
