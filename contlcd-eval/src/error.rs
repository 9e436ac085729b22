use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("matcher returned {count} candidates for seq {seq}, at most one is allowed")]
    MultiCandidateViolation { seq: usize, count: usize },

    #[error("cannot load score thresholds from {}: {message}", .path.display())]
    ThresholdConfig { path: PathBuf, message: String },

    #[error("no ground truth pose for seq {seq}")]
    MissingGroundTruth { seq: usize },

    #[error("matcher failed: {0:#}")]
    Matcher(anyhow::Error),

    #[error("evaluator failed: {0:#}")]
    Evaluator(anyhow::Error),
}
