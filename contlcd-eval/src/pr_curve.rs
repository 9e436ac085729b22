//! Precision/recall over a sweep of similarity thresholds, rebuilt from the
//! prediction report.
//!
//! At threshold `t` a recorded candidate counts as a detection only when its
//! similarity is strictly above `t`. The set of real revisits (recorded TP
//! plus FN) does not change with `t`, so a TP that falls below the threshold
//! turns into a miss.

use serde::{Deserialize, Serialize};

use crate::evaluator::PredictionRecord;
use crate::outcome::{OutcomeCounts, OutcomeLabel};

pub const SWEEP_START: f64 = 0.5;
pub const SWEEP_STEP: f64 = 0.01;
pub const SWEEP_STEPS: usize = 50;

/// 0.50, 0.51, ..., 0.99
pub fn default_thresholds() -> Vec<f64> {
    (0..SWEEP_STEPS)
        .map(|i| SWEEP_START + i as f64 * SWEEP_STEP)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    pub threshold: f64,
    pub counts: OutcomeCounts,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrTable {
    pub points: Vec<PrPoint>,
}

pub fn pr_table(records: &[PredictionRecord], thresholds: &[f64]) -> PrTable {
    let revisits = records
        .iter()
        .filter(|r| matches!(r.label, OutcomeLabel::TruePositive | OutcomeLabel::FalseNegative))
        .count();

    let points = thresholds
        .iter()
        .map(|&threshold| {
            let detected = |label: OutcomeLabel| {
                records
                    .iter()
                    .filter(|r| r.label == label && r.candidate_seq.is_some())
                    .filter(|r| r.similarity.is_some_and(|s| s > threshold))
                    .count()
            };
            let tp = detected(OutcomeLabel::TruePositive);
            let fp = detected(OutcomeLabel::FalsePositive);
            let fn_ = revisits.saturating_sub(tp);
            PrPoint {
                threshold,
                counts: OutcomeCounts {
                    tp,
                    fp,
                    tn: records.len().saturating_sub(tp + fp + fn_),
                    fn_,
                },
            }
        })
        .collect();
    PrTable { points }
}

impl PrTable {
    /// Point with the highest F1, earliest threshold on ties.
    pub fn best_f1(&self) -> Option<&PrPoint> {
        self.points
            .iter()
            .filter(|p| p.counts.f1().is_some())
            .fold(None, |best: Option<&PrPoint>, p| match best {
                Some(b) if b.counts.f1() >= p.counts.f1() => Some(b),
                _ => Some(p),
            })
    }

    pub fn print(&self) {
        let fmt_rate = |r: Option<f64>| r.map_or("n/a".to_string(), |v| format!("{v:.4}"));
        println!("=== Precision / recall sweep ===");
        println!(
            "{:>9} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
            "threshold", "TP", "FP", "FN", "precision", "recall", "F1"
        );
        for point in &self.points {
            println!(
                "{:>9.4} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
                point.threshold,
                point.counts.tp,
                point.counts.fp,
                point.counts.fn_,
                fmt_rate(point.counts.precision()),
                fmt_rate(point.counts.recall()),
                fmt_rate(point.counts.f1())
            );
        }
        if let Some(best) = self.best_f1() {
            println!(
                "Best F1 {} at threshold {:.4}",
                fmt_rate(best.counts.f1()),
                best.threshold
            );
        }
    }
}
