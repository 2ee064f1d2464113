//! Calculator configuration.
//!
//! Configuration is optional. Without a file the calculator opens with the
//! built-in seed values; a JSON file can override any seed and the size of
//! the undo history:
//!
//! ```json
//! { "seed": { "clicks": 500, "cpc": 12.5 }, "undo_limit": 50 }
//! ```
//!
//! Seed overrides are applied as given. They are not run through the
//! recalculator, so a file that overrides `clicks` alone starts with an
//! `adCost` that no longer matches `clicks * cpc` until the next edit.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::calculator::MetricSet;
use crate::error::{CalcError, CalcResult};
use crate::metric::{MetricId, MetricValue};

pub const DEFAULT_UNDO_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    /// Seed overrides keyed by metric name (`adCost`, `cr1`, ...).
    pub seed: BTreeMap<String, f64>,
    /// Maximum number of undo steps kept; 0 disables undo.
    pub undo_limit: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            seed: BTreeMap::new(),
            undo_limit: DEFAULT_UNDO_LIMIT,
        }
    }
}

impl CalculatorConfig {
    pub fn from_path(path: &Path) -> CalcResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CalcError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CalculatorConfig =
            serde_json::from_str(&contents).map_err(|source| CalcError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when one is given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> CalcResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => {
                debug!("No config given. Using default config.");
                Ok(CalculatorConfig::default())
            }
        }
    }

    /// Checks seed names and values. Names match ignoring case, so two keys
    /// naming the same metric (`Clicks` and `clicks`) are rejected.
    pub fn validate(&self) -> CalcResult<()> {
        let mut seen = BTreeSet::new();
        for (name, value) in &self.seed {
            let id = MetricId::from_name(name)
                .ok_or_else(|| CalcError::UnknownMetric(name.clone()))?;
            if !seen.insert(id) {
                return Err(CalcError::Config(format!("seed {} is given more than once", id)));
            }
            if !value.is_finite() {
                return Err(CalcError::Config(format!("seed {} is not finite", name)));
            }
        }
        Ok(())
    }

    /// Built-in seed with this config's overrides applied.
    pub fn seed_metrics(&self) -> MetricSet {
        let mut metrics = MetricSet::seeded();
        for (name, value) in &self.seed {
            match MetricId::from_name(name) {
                Some(id) => metrics.insert(id, MetricValue::Parsed(*value)),
                None => warn!("Ignoring seed for unknown metric {}", name),
            }
        }
        metrics
    }
}
