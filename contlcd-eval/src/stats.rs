use contlcd_core::pose::PoseError;
use serde::{Deserialize, Serialize};

/// Constant-memory mean / RMSE accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// 0 when empty.
    pub fn rmse(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_sq / self.count as f64).sqrt()
    }

    pub fn merge(&mut self, other: &RunningStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Translational (m) and rotational (deg) error of true positives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TpErrorStats {
    pub translation: RunningStats,
    pub rotation: RunningStats,
}

impl TpErrorStats {
    pub fn push(&mut self, error: &PoseError) {
        self.translation.push(error.translation_m);
        self.rotation.push(error.rotation_deg);
    }

    pub fn count(&self) -> u64 {
        self.translation.count()
    }

    pub fn clear(&mut self) {
        self.translation.clear();
        self.rotation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_rmse_of_small_sample() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 3);
        assert_relative_eq!(stats.mean(), 2.0);
        assert_relative_eq!(stats.rmse(), (14.0f64 / 3.0).sqrt());
    }

    #[test]
    fn order_does_not_matter() {
        let orders = [[1.0, 2.0, 3.0], [3.0, 1.0, 2.0], [2.0, 3.0, 1.0]];
        for order in orders {
            let mut stats = RunningStats::default();
            order.iter().for_each(|v| stats.push(*v));
            assert_relative_eq!(stats.mean(), 2.0, epsilon = 1e-12);
            assert_relative_eq!(stats.rmse(), (14.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = RunningStats::default();
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.rmse(), 0.0);
    }

    #[test]
    fn merge_matches_single_pass() {
        let mut a = RunningStats::default();
        let mut b = RunningStats::default();
        let mut all = RunningStats::default();
        for v in [0.5, 1.5] {
            a.push(v);
            all.push(v);
        }
        for v in [4.0, -2.0] {
            b.push(v);
            all.push(v);
        }
        a.merge(&b);
        assert_eq!(a, all);
    }

    #[test]
    fn tp_errors_split_by_component() {
        let mut stats = TpErrorStats::default();
        stats.push(&PoseError {
            translation_m: 1.0,
            rotation_deg: 4.0,
        });
        stats.push(&PoseError {
            translation_m: 3.0,
            rotation_deg: 2.0,
        });
        assert_eq!(stats.count(), 2);
        assert_relative_eq!(stats.translation.mean(), 2.0);
        assert_relative_eq!(stats.rotation.mean(), 3.0);
        stats.clear();
        assert_eq!(stats.count(), 0);
    }
}
