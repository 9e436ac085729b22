//! Ground-truth classification of match decisions and the prediction report.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use contlcd_core::pose::{relative_transform, translation_distance, PoseError};
use contlcd_core::Trajectory;
use contlcd_sensor::ScanRecord;
use serde::{Deserialize, Serialize};

use crate::matcher::Candidate;
use crate::outcome::{OutcomeLabel, PredictionOutcome};
use crate::EvalError;

pub trait PredictionEvaluator {
    /// Label the decision made for `query`. `candidate` is the accepted match,
    /// if any.
    fn classify(
        &mut self,
        query: &ScanRecord,
        candidate: Option<&Candidate>,
    ) -> anyhow::Result<PredictionOutcome>;

    /// Write every prediction made so far to `report_path`.
    fn persist(&self, report_path: &Path) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroundTruthEvaluatorCfg {
    /// Two frames closer than this are the same place.
    pub max_match_distance_m: f64,
    /// Frames this close in sequence to the query never count as revisits.
    pub exclude_recent_frames: usize,
    pub max_translation_error_m: f64,
    pub max_rotation_error_deg: f64,
}

impl Default for GroundTruthEvaluatorCfg {
    fn default() -> Self {
        Self {
            max_match_distance_m: 5.0,
            exclude_recent_frames: 150,
            max_translation_error_m: 2.0,
            max_rotation_error_deg: 10.0,
        }
    }
}

impl GroundTruthEvaluatorCfg {
    pub fn finalize(self, trajectory: Arc<Trajectory>) -> GroundTruthEvaluator {
        GroundTruthEvaluator {
            cfg: self,
            trajectory,
            records: Vec::new(),
        }
    }
}

/// One row of the prediction report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub seq: usize,
    pub candidate_seq: Option<usize>,
    pub label: OutcomeLabel,
    pub similarity: Option<f64>,
    pub translation_error_m: Option<f64>,
    pub rotation_error_deg: Option<f64>,
}

pub struct GroundTruthEvaluator {
    cfg: GroundTruthEvaluatorCfg,
    trajectory: Arc<Trajectory>,
    records: Vec<PredictionRecord>,
}

impl GroundTruthEvaluator {
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Whether some frame old enough to be a loop closure for `query` lies
    /// within the match distance.
    fn has_true_revisit(&self, query: &ScanRecord) -> bool {
        let Some(newest) = query.seq.checked_sub(self.cfg.exclude_recent_frames) else {
            return false;
        };
        self.trajectory
            .iter()
            .take_while(|(seq, _)| *seq < newest)
            .any(|(_, pose)| translation_distance(pose, &query.pose) <= self.cfg.max_match_distance_m)
    }

    fn classify_candidate(
        &self,
        query: &ScanRecord,
        candidate: &Candidate,
    ) -> anyhow::Result<PredictionOutcome> {
        let candidate_pose = self
            .trajectory
            .get(candidate.seq)
            .ok_or(EvalError::MissingGroundTruth { seq: candidate.seq })?;

        let true_relative = relative_transform(candidate_pose, &query.pose);
        let error = PoseError::between(&candidate.relative_transform, &true_relative);
        let distance = translation_distance(candidate_pose, &query.pose);
        log::debug!(
            "candidate {} for {}: gt distance {:.3} m, error t {:.3} m r {:.3} deg",
            candidate.seq,
            query.seq,
            distance,
            error.translation_m,
            error.rotation_deg
        );

        let same_place = distance <= self.cfg.max_match_distance_m;
        let registered = error.translation_m <= self.cfg.max_translation_error_m
            && error.rotation_deg <= self.cfg.max_rotation_error_deg;
        Ok(if same_place && registered {
            PredictionOutcome::TruePositive(error)
        } else {
            PredictionOutcome::FalsePositive
        })
    }
}

impl PredictionEvaluator for GroundTruthEvaluator {
    fn classify(
        &mut self,
        query: &ScanRecord,
        candidate: Option<&Candidate>,
    ) -> anyhow::Result<PredictionOutcome> {
        let outcome = match candidate {
            Some(candidate) => self.classify_candidate(query, candidate)?,
            None if self.has_true_revisit(query) => PredictionOutcome::FalseNegative,
            None => PredictionOutcome::TrueNegative,
        };

        self.records.push(PredictionRecord {
            seq: query.seq,
            candidate_seq: candidate.map(|c| c.seq),
            label: outcome.label(),
            similarity: candidate.map(|c| c.similarity),
            translation_error_m: outcome.error().map(|e| e.translation_m),
            rotation_error_deg: outcome.error().map(|e| e.rotation_deg),
        });
        Ok(outcome)
    }

    fn persist(&self, report_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut writer = csv::Writer::from_path(report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        log::info!(
            "saved {} predictions to {}",
            self.records.len(),
            report_path.display()
        );
        Ok(())
    }
}
