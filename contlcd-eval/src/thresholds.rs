//! Acceptance region for candidate scores.
//!
//! ```toml
//! [bounds.correlation]
//! lower = 0.65
//! upper = 1.0
//!
//! [bounds.area_perc]
//! lower = 0.1
//! upper = 1.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EvalError, Result};

/// Named scores attached to a candidate.
pub type CandidateScores = BTreeMap<String, f64>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBound {
    pub lower: f64,
    pub upper: f64,
}

impl ScoreBound {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, score: f64) -> bool {
        self.lower <= score && score <= self.upper
    }
}

/// A candidate is accepted only when every named score is inside its bound.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholdEnsemble {
    #[serde(default)]
    bounds: BTreeMap<String, ScoreBound>,
}

impl ScoreThresholdEnsemble {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| EvalError::ThresholdConfig {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let ensemble = Self::from_toml_str(&text).map_err(config_error)?;
        log::info!(
            "loaded {} score bounds from {}",
            ensemble.len(),
            path.display()
        );
        Ok(ensemble)
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, String> {
        let ensemble: Self = toml::from_str(text).map_err(|e| e.to_string())?;
        if let Some((name, bound)) = ensemble
            .bounds
            .iter()
            .find(|(_, b)| !(b.lower <= b.upper))
        {
            return Err(format!(
                "bound {name} is empty: lower {} > upper {}",
                bound.lower, bound.upper
            ));
        }
        Ok(ensemble)
    }

    pub fn with_bound(mut self, name: impl Into<String>, lower: f64, upper: f64) -> Self {
        self.bounds.insert(name.into(), ScoreBound::new(lower, upper));
        self
    }

    pub fn bound(&self, name: &str) -> Option<&ScoreBound> {
        self.bounds.get(name)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoreBound)> {
        self.bounds.iter().map(|(name, bound)| (name.as_str(), bound))
    }

    /// Names of the bounds `scores` fails. A score missing from `scores` fails
    /// its bound.
    pub fn violations<'a>(&'a self, scores: &CandidateScores) -> Vec<&'a str> {
        self.bounds
            .iter()
            .filter(|(name, bound)| !scores.get(*name).is_some_and(|s| bound.contains(*s)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn accepts(&self, scores: &CandidateScores) -> bool {
        self.violations(scores).is_empty()
    }
}
