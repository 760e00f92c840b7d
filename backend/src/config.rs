//! Simulation configuration
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Distribution defaults were measured from leaked-transaction
//! datasets and are in currency units (amounts) and days (inter-arrival).
//!
//! # Example
//!
//! ```
//! use kleptosyn_core::SimulationConfig;
//!
//! let config = SimulationConfig::from_json(r#"{ "rng_seed": 7, "num_patterns": 2 }"#).unwrap();
//! assert_eq!(config.rng_seed, Some(7));
//! assert_eq!(config.min_clique_size, 3);
//! assert!(config.is_sanctioned(Some("RU")));
//! ```

use crate::text::is_country_code;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration validation error
#[derive(Debug, Error, PartialEq)]
#[error("Invalid config: {0}")]
pub struct ConfigError(pub String);

/// Sampling parameters for amounts and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionParams {
    /// Median gap between transfers, in days
    pub inter_arrival_median: f64,
    /// Recorded for provenance only; sampling does not read it
    pub inter_arrival_stdev: f64,

    /// Median single transfer, in currency units
    pub transfer_chunk_median: f64,
    /// Recorded for provenance only; sampling does not read it
    pub transfer_chunk_stdev: f64,

    /// Median total moved by one laundering network, in currency units
    pub transfer_total_median: f64,
    /// Recorded for provenance only; sampling does not read it
    pub transfer_total_stdev: f64,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            inter_arrival_median: 8.7,
            inter_arrival_stdev: 32.745006,
            transfer_chunk_median: 1.963890e5,
            transfer_chunk_stdev: 5.301957e5,
            transfer_total_median: 1.408894e6,
            transfer_total_stdev: 8.014517e7,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed (None = draw one from OS entropy)
    pub rng_seed: Option<u64>,

    /// Simulation start (None = now)
    pub start: Option<NaiveDateTime>,

    /// Number of fraud episodes to simulate
    pub num_patterns: usize,

    /// Countries whose entities are never used as shells or legit traffic
    pub sanctioned_countries: BTreeSet<String>,

    /// Fraud share of all traffic; legit volume = fraud volume / rate
    pub approx_fraud_rate: f64,

    /// Minimum shells in a viable pattern, and the shortest path length
    pub min_clique_size: usize,

    /// Exclusive upper bound on path length
    pub max_path_len: usize,

    /// Paths sampled per fraud batch
    pub paths_per_batch: usize,

    pub distributions: DistributionParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            start: None,
            num_patterns: 1,
            sanctioned_countries: ["RU".to_string()].into_iter().collect(),
            approx_fraud_rate: 0.02,
            min_clique_size: 3,
            max_path_len: 7,
            paths_per_batch: 4,
            distributions: DistributionParams::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Whether a country is in the sanctioned set (no country never is)
    pub fn is_sanctioned(&self, country: Option<&str>) -> bool {
        country.map_or(false, |c| self.sanctioned_countries.contains(c))
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.distributions;
        let positives = [
            ("inter_arrival_median", d.inter_arrival_median),
            ("inter_arrival_stdev", d.inter_arrival_stdev),
            ("transfer_chunk_median", d.transfer_chunk_median),
            ("transfer_chunk_stdev", d.transfer_chunk_stdev),
            ("transfer_total_median", d.transfer_total_median),
            ("transfer_total_stdev", d.transfer_total_stdev),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError(format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(self.approx_fraud_rate > 0.0 && self.approx_fraud_rate <= 1.0) {
            return Err(ConfigError(format!(
                "approx_fraud_rate must be in (0, 1], got {}",
                self.approx_fraud_rate
            )));
        }

        if self.min_clique_size < 2 {
            return Err(ConfigError("min_clique_size must be at least 2".to_string()));
        }

        if self.max_path_len <= self.min_clique_size {
            return Err(ConfigError(format!(
                "max_path_len ({}) must exceed min_clique_size ({})",
                self.max_path_len, self.min_clique_size
            )));
        }

        if self.paths_per_batch == 0 {
            return Err(ConfigError("paths_per_batch must be positive".to_string()));
        }

        if self.num_patterns == 0 {
            return Err(ConfigError("num_patterns must be positive".to_string()));
        }

        if let Some(code) = self.sanctioned_countries.iter().find(|c| !is_country_code(c)) {
            return Err(ConfigError(format!("malformed sanctioned country code {:?}", code)));
        }

        Ok(())
    }

    /// Deterministic SHA256 hash of the config
    ///
    /// Uses canonical JSON with sorted keys, so the hash identifies the
    /// parameters a dataset was generated with.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        use serde_json::Value;
        use std::collections::BTreeMap;

        let value = serde_json::to_value(self).map_err(|e| ConfigError(format!("serialization failed: {}", e)))?;

        fn canonicalize(value: Value) -> Value {
            match value {
                Value::Object(map) => {
                    let sorted: BTreeMap<String, Value> =
                        map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                    Value::Object(sorted.into_iter().collect())
                }
                Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
                other => other,
            }
        }

        let json = serde_json::to_string(&canonicalize(value))
            .map_err(|e| ConfigError(format!("serialization failed: {}", e)))?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
