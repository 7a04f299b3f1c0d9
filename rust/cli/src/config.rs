use crate::error::CliError;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use vafile_index::{DataRange, SearchConfig, VaFileConfig};
use vafile_tracing::LogFilterLevel;

pub const DEFAULT_CONFIG_PATH: &str = "./vafile_config.yaml";
const ENV_PREFIX: &str = "VAFILE_";

/// Workload driven by `vafile run` and `vafile query`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    #[serde(default = "ExperimentConfig::default_num_queries")]
    pub num_queries: usize,
    #[serde(default = "ExperimentConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "ExperimentConfig::default_log_level")]
    pub log_level: LogFilterLevel,
}

impl ExperimentConfig {
    fn default_num_queries() -> usize {
        100
    }

    fn default_seed() -> u64 {
        42
    }

    fn default_log_level() -> LogFilterLevel {
        LogFilterLevel::Info
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_queries: Self::default_num_queries(),
            seed: Self::default_seed(),
            log_level: Self::default_log_level(),
        }
    }
}

/// # Description
/// Root config for the CLI. Read from a YAML file, then overridden by
/// environment variables prefixed with `VAFILE_`, where `__` separates
/// nested keys (`VAFILE_INDEX__NUM_BIT=40` sets `index.num_bit`).
/// Anything left unset keeps its default, so a missing file is fine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RootConfig {
    pub index: VaFileConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub experiment: ExperimentConfig,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            index: VaFileConfig::new(20, 500_000, 80, DataRange::default()),
            search: SearchConfig::default(),
            experiment: ExperimentConfig::default(),
        }
    }
}

impl RootConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from_path(path: &str) -> Result<Self, CliError> {
        let mut f = figment::Figment::from(Serialized::defaults(RootConfig::default()));
        if std::path::Path::new(path).exists() {
            f = f.merge(Yaml::file(path));
        }
        f = f.merge(Env::prefixed(ENV_PREFIX).map(|k| k.as_str().replace("__", ".").into()));
        Ok(f.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_| {
            let config = RootConfig::load().unwrap();
            assert_eq!(config, RootConfig::default());
            assert_eq!(config.index.num_dim, 20);
            assert_eq!(config.index.num_points, 500_000);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vafile_config.yaml",
                r#"
                index:
                    num_dim: 4
                    num_bit: 16
                    data_range:
                        lo: -1.0
                        hi: 1.0
                search:
                    order: 1.0
                    k: 3
                    weights: [1.0, 1.0, 0.5, 0.0]
                experiment:
                    num_queries: 7
                    log_level: debug
                "#,
            )?;
            let config = RootConfig::load().unwrap();
            assert_eq!(config.index.num_dim, 4);
            assert_eq!(config.index.num_bit, 16);
            assert_eq!(config.index.num_points, 500_000);
            assert_eq!(config.index.data_range, DataRange { lo: -1.0, hi: 1.0 });
            assert_eq!(config.search.order, 1.0);
            assert_eq!(config.search.k, 3);
            assert_eq!(config.search.weights, Some(vec![1.0, 1.0, 0.5, 0.0]));
            assert_eq!(config.experiment.num_queries, 7);
            assert_eq!(config.experiment.seed, 42);
            assert_eq!(config.experiment.log_level, LogFilterLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.yaml",
                r#"
                index:
                    num_dim: 8
                    num_bit: 24
                "#,
            )?;
            jail.set_env("VAFILE_INDEX__NUM_BIT", 40);
            jail.set_env("VAFILE_EXPERIMENT__SEED", 7);
            let config = RootConfig::load_from_path("custom.yaml").unwrap();
            assert_eq!(config.index.num_dim, 8);
            assert_eq!(config.index.num_bit, 40);
            assert_eq!(config.experiment.seed, 7);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_errors() {
        Jail::expect_with(|jail| {
            jail.set_env("VAFILE_INDEX__NUM_DIM", "many");
            let err = RootConfig::load().unwrap_err();
            assert!(matches!(err, CliError::Config(_)));
            Ok(())
        });
    }
}
