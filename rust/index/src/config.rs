use serde::{Deserialize, Serialize};

use crate::DataRange;

/// Shape of a VA-File. `num_points` is a sizing hint, `0` when unknown.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct VaFileConfig {
    pub num_dim: usize,
    #[serde(default)]
    pub num_points: usize,
    pub num_bit: u32,
    #[serde(default)]
    pub data_range: DataRange,
}

impl VaFileConfig {
    pub fn new(num_dim: usize, num_points: usize, num_bit: u32, data_range: DataRange) -> Self {
        Self {
            num_dim,
            num_points,
            num_bit,
            data_range,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Minkowski order `p`.
    #[serde(default = "SearchConfig::default_order")]
    pub order: f32,
    #[serde(default = "SearchConfig::default_k")]
    pub k: usize,
    #[serde(default)]
    pub weights: Option<Vec<f32>>,
}

impl SearchConfig {
    fn default_order() -> f32 {
        2.0
    }

    fn default_k() -> usize {
        10
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            order: Self::default_order(),
            k: Self::default_k(),
            weights: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: VaFileConfig =
            serde_json::from_str(r#"{"num_dim": 20, "num_bit": 80}"#).unwrap();
        assert_eq!(config, VaFileConfig::new(20, 0, 80, DataRange::default()));

        let search: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(search, SearchConfig::default());
        assert_eq!(search.order, 2.0);
        assert_eq!(search.k, 10);
    }

    #[test]
    fn explicit_range_and_weights() {
        let config: VaFileConfig = serde_json::from_str(
            r#"{"num_dim": 2, "num_points": 8, "num_bit": 4, "data_range": {"lo": -1.0, "hi": 1.0}}"#,
        )
        .unwrap();
        assert_eq!(config.data_range, DataRange { lo: -1.0, hi: 1.0 });
        assert_eq!(config.num_points, 8);

        let search: SearchConfig =
            serde_json::from_str(r#"{"order": 1.0, "k": 3, "weights": [1.0, 0.5]}"#).unwrap();
        assert_eq!(search.weights, Some(vec![1.0, 0.5]));
    }
}
