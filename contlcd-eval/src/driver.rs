//! Sequential loop-closure evaluation.
//!
//! Each iteration loads one scan, queries the matcher, labels the answer
//! against ground truth, accumulates statistics and grows the matcher's index.
//! Iterations never overlap. The loop ends when the source runs dry or the
//! iteration cap is hit, after which the evaluator's report is written once.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use contlcd_core::{Pose, Real};
use contlcd_sensor::ScanRecord;
use serde::{Deserialize, Serialize};

use crate::evaluator::PredictionEvaluator;
use crate::matcher::{Candidate, PlaceMatcher, QueryResult};
use crate::outcome::{OutcomeCounts, OutcomeLabel, PredictionOutcome};
use crate::stats::TpErrorStats;
use crate::thresholds::ScoreThresholdEnsemble;
use crate::{EvalError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationDriverCfg {
    pub max_iterations: usize,
    /// Pacing between iterations for callers that replay in real time.
    pub poll_interval_ms: u64,
    /// Extra wait after an iteration that could not load its sweep.
    pub retry_delay_ms: u64,
    pub threshold_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for EvaluationDriverCfg {
    fn default() -> Self {
        Self {
            max_iterations: 123_456,
            poll_interval_ms: 33,
            retry_delay_ms: 1000,
            threshold_path: PathBuf::from("config/score_thresholds.toml"),
            report_path: PathBuf::from("results/outcome_txt/outcome.csv"),
        }
    }
}

impl EvaluationDriverCfg {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Load the score thresholds and set up a driver with zeroed counters.
    pub fn finalize<S, M, E>(
        self,
        source: S,
        matcher: M,
        evaluator: E,
    ) -> Result<EvaluationDriver<S, M, E>>
    where
        S: Iterator<Item = ScanRecord>,
        M: PlaceMatcher,
        E: PredictionEvaluator,
    {
        let thresholds = ScoreThresholdEnsemble::load(&self.threshold_path)?;
        Ok(EvaluationDriver::new(
            source,
            matcher,
            evaluator,
            thresholds,
            self.max_iterations,
            self.report_path,
        ))
    }
}

/// Receives poses and detected loops for display. Failures are logged and
/// otherwise ignored.
pub trait PoseObserver {
    /// `display_offset` grows by 1 per minute of drive time.
    fn on_pose(&mut self, seq: usize, pose: &Pose, display_offset: Real) -> anyhow::Result<()>;

    fn on_loop_closure(
        &mut self,
        _query_seq: usize,
        _candidate_seq: usize,
        _label: OutcomeLabel,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    Processed {
        seq: usize,
        outcome: PredictionOutcome,
    },
    /// The sweep for `seq` was absent; nothing was queried or indexed.
    Skipped { seq: usize },
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    SourceExhausted,
    IterationCap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub iterations: usize,
    pub skipped: usize,
    pub counts: OutcomeCounts,
    pub tp_errors: TpErrorStats,
    pub stop_reason: Option<StopReason>,
}

impl DriverSummary {
    pub fn print(&self) {
        println!("=== Loop closure evaluation ===");
        println!(
            "Iterations: {} ({} skipped), stop: {:?}",
            self.iterations, self.skipped, self.stop_reason
        );
        println!(
            "TP: {}  FP: {}  TN: {}  FN: {}",
            self.counts.tp, self.counts.fp, self.counts.tn, self.counts.fn_
        );
        let fmt_rate = |r: Option<f64>| r.map_or("n/a".to_string(), |v| format!("{v:.4}"));
        println!(
            "Precision: {}  Recall: {}  F1: {}",
            fmt_rate(self.counts.precision()),
            fmt_rate(self.counts.recall()),
            fmt_rate(self.counts.f1())
        );
        println!(
            "TP error mean: t {:7.4} m, r {:7.4} deg",
            self.tp_errors.translation.mean(),
            self.tp_errors.rotation.mean()
        );
        println!(
            "TP error rmse: t {:7.4} m, r {:7.4} deg",
            self.tp_errors.translation.rmse(),
            self.tp_errors.rotation.rmse()
        );
    }
}

pub struct EvaluationDriver<S, M, E> {
    source: S,
    matcher: M,
    evaluator: E,
    thresholds: ScoreThresholdEnsemble,
    max_iterations: usize,
    report_path: PathBuf,
    observers: Vec<Box<dyn PoseObserver>>,

    counts: OutcomeCounts,
    tp_errors: TpErrorStats,
    iterations: usize,
    skipped: usize,
    first_timestamp: Option<Real>,
    stop_reason: Option<StopReason>,
    persisted: bool,
}

impl<S, M, E> EvaluationDriver<S, M, E>
where
    S: Iterator<Item = ScanRecord>,
    M: PlaceMatcher,
    E: PredictionEvaluator,
{
    pub fn new(
        source: S,
        matcher: M,
        evaluator: E,
        thresholds: ScoreThresholdEnsemble,
        max_iterations: usize,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            matcher,
            evaluator,
            thresholds,
            max_iterations,
            report_path: report_path.into(),
            observers: Vec::new(),
            counts: OutcomeCounts::default(),
            tp_errors: TpErrorStats::default(),
            iterations: 0,
            skipped: 0,
            first_timestamp: None,
            stop_reason: None,
            persisted: false,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn PoseObserver>) {
        self.observers.push(observer);
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn thresholds(&self) -> &ScoreThresholdEnsemble {
        &self.thresholds
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn counts(&self) -> &OutcomeCounts {
        &self.counts
    }

    pub fn tp_errors(&self) -> &TpErrorStats {
        &self.tp_errors
    }

    pub fn is_capped(&self) -> bool {
        self.iterations >= self.max_iterations
    }

    /// Process one scan end to end.
    ///
    /// Returns [`EvalError::MultiCandidateViolation`] without touching the
    /// counters or the index if the matcher proposes more than one candidate.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let Some(record) = self.source.next() else {
            self.stop_reason.get_or_insert(StopReason::SourceExhausted);
            return Ok(StepOutcome::Exhausted);
        };
        self.iterations += 1;
        log::debug!("loaded seq {} at {:.3} s", record.seq, record.timestamp);

        let first_timestamp = *self.first_timestamp.get_or_insert(record.timestamp);
        let display_offset = (record.timestamp - first_timestamp) / 60.0;
        self.notify(|o| o.on_pose(record.seq, &record.pose, display_offset));

        let Some(frame) = record.points.as_ref() else {
            log::warn!("no sweep for seq {}, skipping", record.seq);
            self.skipped += 1;
            return Ok(StepOutcome::Skipped { seq: record.seq });
        };

        let clock = Instant::now();
        let QueryResult {
            descriptor,
            candidates,
        } = self
            .matcher
            .query(record.seq, frame, &self.thresholds)
            .map_err(EvalError::Matcher)?;
        log::info!(
            "seq {}: {} candidates in {:.5} s",
            record.seq,
            candidates.len(),
            clock.elapsed().as_secs_f64()
        );

        if candidates.len() > 1 {
            log::error!(
                "matcher returned {} candidates for seq {}",
                candidates.len(),
                record.seq
            );
            return Err(EvalError::MultiCandidateViolation {
                seq: record.seq,
                count: candidates.len(),
            });
        }
        let candidate = candidates
            .into_iter()
            .next()
            .filter(|c| self.within_thresholds(record.seq, c));

        let outcome = self
            .evaluator
            .classify(&record, candidate.as_ref())
            .map_err(EvalError::Evaluator)?;
        self.accumulate(&outcome);
        if let Some(candidate) = &candidate {
            let label = outcome.label();
            self.notify(|o| o.on_loop_closure(record.seq, candidate.seq, label));
        }

        self.matcher
            .insert(record.seq, record.timestamp, descriptor)
            .map_err(EvalError::Matcher)?;
        let clock = Instant::now();
        self.matcher
            .rebalance(record.seq, record.timestamp)
            .map_err(EvalError::Matcher)?;
        log::debug!("rebalance cost: {:.5} s", clock.elapsed().as_secs_f64());

        Ok(StepOutcome::Processed {
            seq: record.seq,
            outcome,
        })
    }

    /// Step until the source is exhausted or the cap is reached, then persist.
    pub fn run(&mut self) -> Result<DriverSummary> {
        while self.poll_step()?.is_some() {}
        self.finalize()
    }

    /// [`Self::step`] guarded by the iteration cap. `None` once the loop is
    /// over.
    pub fn poll_step(&mut self) -> Result<Option<StepOutcome>> {
        if self.stop_reason.is_some() {
            return Ok(None);
        }
        if self.is_capped() {
            log::info!(
                "max iterations {} reached, exiting the loop",
                self.max_iterations
            );
            self.stop_reason = Some(StopReason::IterationCap);
            return Ok(None);
        }
        match self.step()? {
            StepOutcome::Exhausted => {
                log::info!("source exhausted after {} iterations", self.iterations);
                Ok(None)
            }
            outcome => Ok(Some(outcome)),
        }
    }

    /// Write the evaluator's report. Only the first call persists.
    pub fn finalize(&mut self) -> Result<DriverSummary> {
        if !self.persisted {
            self.evaluator
                .persist(&self.report_path)
                .map_err(EvalError::Evaluator)?;
            self.persisted = true;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> DriverSummary {
        DriverSummary {
            iterations: self.iterations,
            skipped: self.skipped,
            counts: self.counts,
            tp_errors: self.tp_errors,
            stop_reason: self.stop_reason,
        }
    }

    fn within_thresholds(&self, seq: usize, candidate: &Candidate) -> bool {
        let violations = self.thresholds.violations(&candidate.named_scores());
        if !violations.is_empty() {
            log::debug!(
                "dropping candidate {} for seq {}: outside bounds {:?}",
                candidate.seq,
                seq,
                violations
            );
        }
        violations.is_empty()
    }

    fn accumulate(&mut self, outcome: &PredictionOutcome) {
        self.counts.record(outcome.label());
        if let Some(error) = outcome.error() {
            self.tp_errors.push(error);
        }

        log::info!("prediction outcome: {}", outcome.label());
        log::info!(
            "TP error mean: t:{:7.4} m, r:{:7.4} deg",
            self.tp_errors.translation.mean(),
            self.tp_errors.rotation.mean()
        );
        log::info!(
            "TP error rmse: t:{:7.4} m, r:{:7.4} deg",
            self.tp_errors.translation.rmse(),
            self.tp_errors.rotation.rmse()
        );
        log::info!(
            "accumulated tp: {}, fn: {}, fp: {}",
            self.counts.tp,
            self.counts.fn_,
            self.counts.fp
        );
    }

    fn notify(&mut self, mut event: impl FnMut(&mut Box<dyn PoseObserver>) -> anyhow::Result<()>) {
        for observer in self.observers.iter_mut() {
            if let Err(e) = event(observer) {
                log::debug!("pose observer failed: {e:#}");
            }
        }
    }
}
