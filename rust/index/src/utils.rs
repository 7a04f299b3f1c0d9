use rand::Rng;

use crate::DataRange;

/// `n` points with `num_dim` coordinates drawn uniformly from `range`.
pub fn generate_uniform_points<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    num_dim: usize,
    range: DataRange,
) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| {
            (0..num_dim)
                .map(|_| rng.gen_range(range.lo..=range.hi))
                .collect()
        })
        .collect()
}
