use std::fmt;

use crate::{BitPlan, Partition};

/// Concatenation of per-dimension bin indices, dimension 0 in the most
/// significant bits. Points sharing an approximation share a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Approximation {
    bits: u128,
    len: u32,
}

impl Approximation {
    pub fn new(bits: u128, len: u32) -> Self {
        Self { bits, len }
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero-padded binary rendering, `len` characters wide.
    pub fn bit_string(&self) -> String {
        if self.len == 0 {
            return String::new();
        }
        format!("{:0width$b}", self.bits, width = self.len as usize)
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bit_string())
    }
}

/// Maps points to approximations and back to per-dimension bins.
#[derive(Clone, Copy)]
pub struct Approximator<'a> {
    plan: &'a BitPlan,
    partitions: &'a [Partition],
}

impl<'a> Approximator<'a> {
    pub fn new(plan: &'a BitPlan, partitions: &'a [Partition]) -> Self {
        debug_assert_eq!(plan.num_dim(), partitions.len());
        Self { plan, partitions }
    }

    /// Bin index of every coordinate. The point must already be validated.
    pub fn bins(&self, point: &[f32]) -> Vec<u32> {
        point
            .iter()
            .zip(self.partitions)
            .map(|(value, partition)| partition.bin_of(*value))
            .collect()
    }

    /// The point must already be validated.
    pub fn approximate(&self, point: &[f32]) -> Approximation {
        let bits = point
            .iter()
            .zip(self.partitions)
            .enumerate()
            .fold(0u128, |acc, (dim, (value, partition))| {
                acc | (u128::from(partition.bin_of(*value)) << self.plan.shift(dim))
            });
        Approximation::new(bits, self.plan.num_bit())
    }

    /// Bin index of `key` in dimension `dim`.
    pub fn decode(&self, key: Approximation, dim: usize) -> u32 {
        ((key.bits >> self.plan.shift(dim)) & self.plan.mask(dim)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataRange, PartitionBuilder, Point};

    fn fixture() -> (BitPlan, Vec<Partition>) {
        // 3 bits for dimension 0, 2 bits for dimension 1.
        let plan = BitPlan::allocate(5, 2).unwrap();
        let data = (0..16)
            .map(|i| Point::from(vec![i as f32 / 15.0, i as f32 / 15.0]))
            .collect::<Vec<_>>();
        let partitions = PartitionBuilder::new(&plan, DataRange::default()).build(&data);
        (plan, partitions)
    }

    #[test]
    fn packs_bins_most_significant_first() {
        let (plan, partitions) = fixture();
        let approximator = Approximator::new(&plan, &partitions);

        let point = [1.0, 0.0];
        let key = approximator.approximate(&point);
        assert_eq!(key.bit_string(), "11100");
        assert_eq!(key.to_string(), "11100");
        assert_eq!(approximator.decode(key, 0), 7);
        assert_eq!(approximator.decode(key, 1), 0);

        let point = [0.0, 1.0];
        let key = approximator.approximate(&point);
        assert_eq!(key.bit_string(), "00011");
        assert_eq!(approximator.decode(key, 0), 0);
        assert_eq!(approximator.decode(key, 1), 3);
    }

    #[test]
    fn decode_round_trips_bins() {
        let (plan, partitions) = fixture();
        let approximator = Approximator::new(&plan, &partitions);
        for i in 0..=20 {
            let point = [i as f32 / 20.0, 1.0 - i as f32 / 20.0];
            let key = approximator.approximate(&point);
            let bins = approximator.bins(&point);
            assert_eq!(approximator.decode(key, 0), bins[0]);
            assert_eq!(approximator.decode(key, 1), bins[1]);
            assert_eq!(key, approximator.approximate(&point));
        }
    }

    #[test]
    fn empty_approximation_renders_as_empty_string() {
        let key = Approximation::new(0, 0);
        assert!(key.is_empty());
        assert_eq!(key.bit_string(), "");
    }

    #[test]
    fn wide_keys_keep_leading_zeros() {
        let key = Approximation::new(1, 100);
        let rendered = key.bit_string();
        assert_eq!(rendered.len(), 100);
        assert!(rendered.starts_with("000"));
        assert!(rendered.ends_with('1'));
    }
}
