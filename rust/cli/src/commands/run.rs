use crate::config::RootConfig;
use crate::error::CliError;
use crate::utils::{build_index, exhaustive_search, search};
use clap::Parser;
use colored::Colorize;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use vafile_index::utils::generate_uniform_points;
use vafile_index::{SearchConfig, VaFile};

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    #[arg(long, help = "Number of points to generate and load")]
    pub num_points: Option<usize>,
    #[arg(long, help = "Number of random queries to run")]
    pub num_queries: Option<usize>,
    #[arg(long, help = "Number of neighbors per query")]
    pub k: Option<usize>,
    #[arg(long, help = "Seed for data and query generation")]
    pub seed: Option<u64>,
}

impl RunArgs {
    fn apply(&self, config: &mut RootConfig) {
        if let Some(num_points) = self.num_points {
            config.index.num_points = num_points;
        }
        if let Some(num_queries) = self.num_queries {
            config.experiment.num_queries = num_queries;
        }
        if let Some(k) = self.k {
            config.search.k = k;
        }
        if let Some(seed) = self.seed {
            config.experiment.seed = seed;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub num_points: usize,
    pub box_count: usize,
    pub num_queries: usize,
    pub mean_visited: f64,
    pub mean_boxes_visited: f64,
    /// Share of exhaustive-scan neighbor ids also returned by the index.
    pub recall: f64,
    pub elapsed_ms: u64,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", "VA-File run".bold())?;
        writeln!(f, "  points:        {}", self.num_points)?;
        writeln!(f, "  boxes:         {}", self.box_count)?;
        writeln!(f, "  queries:       {}", self.num_queries)?;
        writeln!(
            f,
            "  mean visited:  {:.1} points, {:.1} boxes",
            self.mean_visited, self.mean_boxes_visited
        )?;
        writeln!(f, "  recall:        {:.4}", self.recall)?;
        write!(f, "  query time:    {} ms", self.elapsed_ms)
    }
}

pub(crate) fn evaluate(
    index: &VaFile,
    queries: &[Vec<f32>],
    config: &SearchConfig,
) -> Result<RunReport, CliError> {
    if queries.is_empty() {
        return Err(CliError::NoQueries);
    }

    let started = Instant::now();
    let results = queries
        .par_iter()
        .map(|query| search(index, config, query))
        .collect::<Result<Vec<_>, _>>()?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let mut visited = 0;
    let mut boxes_visited = 0;
    let mut hits = 0;
    let mut expected = 0;
    for (query, result) in queries.iter().zip(&results) {
        let truth = exhaustive_search(index, config, query)?;
        let truth_ids = truth.ids().into_iter().collect::<HashSet<_>>();
        hits += result
            .ids()
            .iter()
            .filter(|id| truth_ids.contains(id))
            .count();
        expected += truth_ids.len();
        visited += result.visited;
        boxes_visited += result.boxes_visited;
    }

    let num_queries = queries.len() as f64;
    Ok(RunReport {
        num_points: index.len(),
        box_count: index.box_count(),
        num_queries: queries.len(),
        mean_visited: visited as f64 / num_queries,
        mean_boxes_visited: boxes_visited as f64 / num_queries,
        recall: if expected == 0 {
            1.0
        } else {
            hits as f64 / expected as f64
        },
        elapsed_ms,
    })
}

pub fn run(args: RunArgs, mut config: RootConfig) -> Result<RunReport, CliError> {
    args.apply(&mut config);
    let mut rng = StdRng::seed_from_u64(config.experiment.seed);
    let index = build_index(&config.index, &mut rng)?;
    let queries = generate_uniform_points(
        &mut rng,
        config.experiment.num_queries,
        config.index.num_dim,
        config.index.data_range,
    );

    let report = evaluate(&index, &queries, &config.search)?;
    tracing::info!(
        num_queries = report.num_queries,
        mean_visited = report.mean_visited,
        mean_boxes_visited = report.mean_boxes_visited,
        recall = report.recall,
        "Run finished"
    );
    println!("{report}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vafile_index::DataRange;

    fn small_config() -> RootConfig {
        let mut config = RootConfig::default();
        config.index.num_dim = 3;
        config.index.num_points = 600;
        config.index.num_bit = 9;
        config.search.k = 5;
        config.experiment.num_queries = 12;
        config
    }

    #[test]
    fn run_reports_exact_recall() {
        let report = run(RunArgs::default(), small_config()).unwrap();
        assert_eq!(report.num_points, 600);
        assert_eq!(report.num_queries, 12);
        assert_eq!(report.recall, 1.0);
        assert!(report.mean_visited >= 5.0);
        assert!(report.mean_visited <= 600.0);
        assert!(report.box_count <= 512);
    }

    #[test]
    fn args_override_config() {
        let args = RunArgs {
            num_points: Some(200),
            num_queries: Some(3),
            k: Some(2),
            seed: Some(9),
        };
        let mut config = small_config();
        args.apply(&mut config);
        assert_eq!(config.index.num_points, 200);
        assert_eq!(config.experiment.num_queries, 3);
        assert_eq!(config.search.k, 2);
        assert_eq!(config.experiment.seed, 9);
    }

    #[test]
    fn weighted_run_on_custom_range() {
        let mut config = small_config();
        config.index.data_range = DataRange::new(-5.0, 5.0).unwrap();
        config.search.order = 1.0;
        config.search.weights = Some(vec![1.0, 0.0, 2.0]);
        let report = run(RunArgs::default(), config).unwrap();
        assert_eq!(report.recall, 1.0);
    }

    #[test]
    fn zero_queries_is_an_error() {
        let args = RunArgs {
            num_queries: Some(0),
            ..Default::default()
        };
        let err = run(args, small_config()).unwrap_err();
        assert!(matches!(err, CliError::NoQueries));
    }
}
