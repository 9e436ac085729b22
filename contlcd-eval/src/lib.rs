mod error;
pub use error::{EvalError, Result};
pub mod driver;
pub mod evaluator;
pub mod matcher;
pub mod outcome;
pub mod pr_curve;
pub mod stats;
pub mod thresholds;

pub use driver::{
    DriverSummary, EvaluationDriver, EvaluationDriverCfg, PoseObserver, StepOutcome, StopReason,
};
pub use evaluator::{
    GroundTruthEvaluator, GroundTruthEvaluatorCfg, PredictionEvaluator, PredictionRecord,
};
pub use matcher::{Candidate, NullMatcher, PlaceMatcher, QueryResult, SIMILARITY_SCORE};
pub use outcome::{OutcomeCounts, OutcomeLabel, PredictionOutcome};
pub use pr_curve::{default_thresholds, pr_table, PrPoint, PrTable};
pub use stats::{RunningStats, TpErrorStats};
pub use thresholds::{CandidateScores, ScoreBound, ScoreThresholdEnsemble};
