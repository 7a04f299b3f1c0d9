use rand::Rng;
use std::time::Instant;
use vafile_index::utils::generate_uniform_points;
use vafile_index::{SearchConfig, SearchResult, VaFile, VaFileConfig, VaFileError};

/// Generates `config.num_points` uniform points and bulk loads them.
pub(crate) fn build_index<R: Rng + ?Sized>(
    config: &VaFileConfig,
    rng: &mut R,
) -> Result<VaFile, VaFileError> {
    let mut index = VaFile::from_config(config)?;
    let points = generate_uniform_points(rng, config.num_points, config.num_dim, config.data_range);
    let started = Instant::now();
    let box_count = index.bulk_load(points)?;
    tracing::info!(
        num_points = config.num_points,
        box_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Index loaded"
    );
    Ok(index)
}

pub(crate) fn search(
    index: &VaFile,
    config: &SearchConfig,
    query: &[f32],
) -> Result<SearchResult, VaFileError> {
    match &config.weights {
        Some(weights) => index.nearest_search_weighted(config.order, query, config.k, weights),
        None => index.nearest_search(config.order, query, config.k),
    }
}

pub(crate) fn exhaustive_search(
    index: &VaFile,
    config: &SearchConfig,
    query: &[f32],
) -> Result<SearchResult, VaFileError> {
    index.exhaustive_search(config.order, query, config.k, config.weights.as_deref())
}
