use std::fmt;

use contlcd_core::pose::PoseError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeLabel {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

impl OutcomeLabel {
    pub fn short_name(&self) -> &'static str {
        match self {
            OutcomeLabel::TruePositive => "TP",
            OutcomeLabel::FalsePositive => "FP",
            OutcomeLabel::TrueNegative => "TN",
            OutcomeLabel::FalseNegative => "FN",
        }
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Classification of one query against ground truth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PredictionOutcome {
    /// Accepted candidate that is a real revisit; carries the error of the
    /// estimated relative transform.
    TruePositive(PoseError),
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

impl PredictionOutcome {
    pub fn label(&self) -> OutcomeLabel {
        match self {
            PredictionOutcome::TruePositive(_) => OutcomeLabel::TruePositive,
            PredictionOutcome::FalsePositive => OutcomeLabel::FalsePositive,
            PredictionOutcome::TrueNegative => OutcomeLabel::TrueNegative,
            PredictionOutcome::FalseNegative => OutcomeLabel::FalseNegative,
        }
    }

    pub fn error(&self) -> Option<&PoseError> {
        match self {
            PredictionOutcome::TruePositive(error) => Some(error),
            _ => None,
        }
    }
}

/// Cumulative outcome counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, label: OutcomeLabel) {
        match label {
            OutcomeLabel::TruePositive => self.tp += 1,
            OutcomeLabel::FalsePositive => self.fp += 1,
            OutcomeLabel::TrueNegative => self.tn += 1,
            OutcomeLabel::FalseNegative => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// `None` until at least one positive prediction was made.
    pub fn precision(&self) -> Option<f64> {
        let predicted = self.tp + self.fp;
        (predicted > 0).then(|| self.tp as f64 / predicted as f64)
    }

    pub fn recall(&self) -> Option<f64> {
        let actual = self.tp + self.fn_;
        (actual > 0).then(|| self.tp as f64 / actual as f64)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> Option<f64> {
        let (precision, recall) = (self.precision()?, self.recall()?);
        (precision + recall > 0.0).then(|| 2.0 * precision * recall / (precision + recall))
    }
}
