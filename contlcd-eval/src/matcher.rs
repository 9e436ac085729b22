//! Contract of the place-recognition backend the driver queries.

use contlcd_core::{Pose, Real};
use contlcd_sensor::SensorFrame;

use crate::thresholds::{CandidateScores, ScoreThresholdEnsemble};

/// Name under which [`Candidate::similarity`] is checked against the ensemble.
pub const SIMILARITY_SCORE: &str = "similarity";

/// A previously indexed frame proposed as a revisit of the query.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub seq: usize,
    pub similarity: f64,
    pub scores: CandidateScores,
    /// Estimated pose of the query frame expressed in the candidate frame.
    pub relative_transform: Pose,
}

impl Candidate {
    /// `scores` plus the similarity under [`SIMILARITY_SCORE`]. An explicit
    /// `similarity` entry in `scores` wins.
    pub fn named_scores(&self) -> CandidateScores {
        let mut scores = self.scores.clone();
        scores
            .entry(SIMILARITY_SCORE.to_string())
            .or_insert(self.similarity);
        scores
    }
}

pub struct QueryResult<D> {
    pub descriptor: D,
    pub candidates: Vec<Candidate>,
}

/// Descriptor extraction plus a nearest-neighbour index over past frames.
///
/// Calls are made one at a time from a single driver.
pub trait PlaceMatcher {
    type Descriptor;

    /// Describe `frame` and look up at most one candidate whose scores fall in
    /// `thresholds`. Returning more than one candidate is a contract violation.
    fn query(
        &mut self,
        seq: usize,
        frame: &SensorFrame,
        thresholds: &ScoreThresholdEnsemble,
    ) -> anyhow::Result<QueryResult<Self::Descriptor>>;

    fn insert(&mut self, seq: usize, timestamp: Real, descriptor: Self::Descriptor) -> anyhow::Result<()>;

    /// Index maintenance after an insertion.
    fn rebalance(&mut self, seq: usize, timestamp: Real) -> anyhow::Result<()>;
}

/// Matcher that never proposes a candidate. Useful as a TN/FN baseline and to
/// exercise the pipeline without a recognition backend.
#[derive(Debug, Default)]
pub struct NullMatcher {
    indexed: Vec<usize>,
    rebalances: usize,
}

impl NullMatcher {
    pub fn indexed(&self) -> &[usize] {
        &self.indexed
    }

    pub fn rebalances(&self) -> usize {
        self.rebalances
    }
}

impl PlaceMatcher for NullMatcher {
    /// Point count of the frame.
    type Descriptor = usize;

    fn query(
        &mut self,
        _seq: usize,
        frame: &SensorFrame,
        _thresholds: &ScoreThresholdEnsemble,
    ) -> anyhow::Result<QueryResult<usize>> {
        Ok(QueryResult {
            descriptor: frame.len(),
            candidates: Vec::new(),
        })
    }

    fn insert(&mut self, seq: usize, _timestamp: Real, _descriptor: usize) -> anyhow::Result<()> {
        self.indexed.push(seq);
        Ok(())
    }

    fn rebalance(&mut self, _seq: usize, _timestamp: Real) -> anyhow::Result<()> {
        self.rebalances += 1;
        Ok(())
    }
}
