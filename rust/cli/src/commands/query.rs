use crate::config::RootConfig;
use crate::error::CliError;
use crate::utils::{build_index, search};
use clap::Parser;
use colored::Colorize;
use rand::{rngs::StdRng, SeedableRng};
use vafile_index::SearchResult;

#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        required = true,
        help = "Query point as comma separated coordinates"
    )]
    pub point: Vec<f32>,
    #[arg(long, help = "Number of neighbors to return")]
    pub k: Option<usize>,
    #[arg(long, help = "Minkowski order of the distance")]
    pub order: Option<f32>,
    #[arg(long, help = "Number of points to generate and load")]
    pub num_points: Option<usize>,
    #[arg(long, help = "Seed for data generation")]
    pub seed: Option<u64>,
}

impl QueryArgs {
    fn apply(&self, config: &mut RootConfig) {
        if let Some(k) = self.k {
            config.search.k = k;
        }
        if let Some(order) = self.order {
            config.search.order = order;
        }
        if let Some(num_points) = self.num_points {
            config.index.num_points = num_points;
        }
        if let Some(seed) = self.seed {
            config.experiment.seed = seed;
        }
    }
}

fn print_result(query: &[f32], result: &SearchResult) {
    println!("{} {:?}", "Query".bold(), query);
    for (rank, neighbor) in result.neighbors.iter().enumerate() {
        println!(
            "{:>4}. id {:<8} distance {:.6}  {:?}",
            rank + 1,
            neighbor.id,
            neighbor.distance,
            &neighbor.point[..]
        );
    }
    println!(
        "visited {} points in {} boxes",
        result.visited, result.boxes_visited
    );
}

pub fn query(args: QueryArgs, mut config: RootConfig) -> Result<SearchResult, CliError> {
    args.apply(&mut config);
    let mut rng = StdRng::seed_from_u64(config.experiment.seed);
    let index = build_index(&config.index, &mut rng)?;
    let result = search(&index, &config.search, &args.point)?;
    tracing::debug!(
        neighbors = result.len(),
        visited = result.visited,
        "Query finished"
    );
    print_result(&args.point, &result);
    Ok(result)
}
