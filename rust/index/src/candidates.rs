/// One slot of a [`CandidateList`]. Seeded slots carry no payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<T> {
    pub distance: f64,
    pub payload: Option<T>,
}

/// Fixed-capacity top-k accumulator kept sorted by ascending distance.
///
/// The distance of the last slot is the pruning threshold: anything at or
/// beyond it is rejected. Among equal distances the entry offered first
/// keeps the better position, so an entry tied with the current threshold
/// never displaces it.
#[derive(Clone, Debug)]
pub struct CandidateList<T> {
    entries: Vec<Candidate<T>>,
}

impl<T> CandidateList<T> {
    pub fn new(k: usize, seed: f64) -> Self {
        let mut list = Self {
            entries: Vec::with_capacity(k),
        };
        list.fill(k, seed);
        list
    }

    /// Clears every slot back to `seed`, keeping the capacity.
    pub fn reseed(&mut self, seed: f64) {
        let k = self.entries.len();
        self.entries.clear();
        self.fill(k, seed);
    }

    fn fill(&mut self, k: usize, seed: f64) {
        self.entries.extend((0..k).map(|_| Candidate {
            distance: seed,
            payload: None,
        }));
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Current k-th best distance. An empty list accepts nothing.
    pub fn threshold(&self) -> f64 {
        self.entries
            .last()
            .map_or(f64::NEG_INFINITY, |entry| entry.distance)
    }

    /// Inserts `payload` if it beats the threshold, dropping the worst entry.
    /// Returns the (possibly tightened) threshold.
    pub fn offer(&mut self, distance: f64, payload: T) -> f64 {
        if distance.is_nan() || distance >= self.threshold() {
            return self.threshold();
        }
        let position = self
            .entries
            .partition_point(|entry| entry.distance <= distance);
        self.entries.pop();
        self.entries.insert(
            position,
            Candidate {
                distance,
                payload: Some(payload),
            },
        );
        self.threshold()
    }

    pub fn entries(&self) -> &[Candidate<T>] {
        &self.entries
    }

    /// Filled slots in ascending distance; unfilled seed slots are dropped.
    pub fn into_filled(self) -> impl Iterator<Item = (f64, T)> {
        self.entries
            .into_iter()
            .filter_map(|entry| entry.payload.map(|payload| (entry.distance, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_k_best_in_order() {
        let mut list = CandidateList::new(3, f64::INFINITY);
        assert_eq!(list.threshold(), f64::INFINITY);
        assert_eq!(list.offer(0.5, "a"), f64::INFINITY);
        assert_eq!(list.offer(0.2, "b"), f64::INFINITY);
        assert_eq!(list.offer(0.9, "c"), 0.9);
        assert_eq!(list.offer(0.1, "d"), 0.5);
        assert_eq!(list.offer(0.7, "e"), 0.5);

        let filled = list.into_filled().collect::<Vec<_>>();
        assert_eq!(filled, vec![(0.1, "d"), (0.2, "b"), (0.5, "a")]);
    }

    #[test]
    fn rejects_distances_at_threshold() {
        let mut list = CandidateList::new(2, f64::INFINITY);
        list.offer(0.3, 1);
        list.offer(0.4, 2);
        assert_eq!(list.offer(0.4, 3), 0.4);
        assert_eq!(list.offer(f64::NAN, 4), 0.4);
        let payloads = list.into_filled().map(|(_, p)| p).collect::<Vec<_>>();
        assert_eq!(payloads, vec![1, 2]);
    }

    #[test]
    fn first_seen_wins_ties() {
        let mut list = CandidateList::new(3, f64::INFINITY);
        list.offer(0.3, "first");
        list.offer(0.3, "second");
        list.offer(0.1, "third");
        let payloads = list.into_filled().map(|(_, p)| p).collect::<Vec<_>>();
        assert_eq!(payloads, vec!["third", "first", "second"]);
    }

    #[test]
    fn unfilled_slots_are_not_reported() {
        let mut list = CandidateList::new(5, f64::INFINITY);
        list.offer(0.3, 'x');
        list.offer(0.1, 'y');
        assert_eq!(list.capacity(), 5);
        assert_eq!(list.threshold(), f64::INFINITY);
        assert_eq!(list.into_filled().count(), 2);
    }

    #[test]
    fn finite_seed_rejects_far_entries() {
        let mut list = CandidateList::new(2, 1.0);
        assert_eq!(list.offer(1.5, 0), 1.0);
        assert_eq!(list.offer(0.5, 1), 1.0);
        assert_eq!(list.offer(0.6, 2), 0.6);
        list.reseed(f64::INFINITY);
        assert_eq!(list.threshold(), f64::INFINITY);
        assert!(list.entries().iter().all(|entry| entry.payload.is_none()));
    }

    #[test]
    fn zero_capacity_accepts_nothing() {
        let mut list = CandidateList::new(0, f64::INFINITY);
        assert_eq!(list.offer(0.0, ()), f64::NEG_INFINITY);
        assert_eq!(list.into_filled().count(), 0);
    }

    proptest! {
        #[test]
        fn stays_sorted_with_exactly_k_entries(
            k in 1usize..20,
            offers in prop::collection::vec(0.0f64..100.0, 0..200),
        ) {
            let mut list = CandidateList::new(k, f64::INFINITY);
            for (i, distance) in offers.iter().enumerate() {
                let before = list.threshold();
                let after = list.offer(*distance, i);
                prop_assert!(after <= before);
                prop_assert_eq!(list.entries().len(), k);
                prop_assert!(list.entries().windows(2).all(|w| w[0].distance <= w[1].distance));
            }

            let mut expected = offers.clone();
            expected.sort_by(f64::total_cmp);
            expected.truncate(k);
            let got = list.into_filled().map(|(d, _)| d).collect::<Vec<_>>();
            prop_assert_eq!(got, expected);
        }
    }
}
