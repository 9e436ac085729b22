use contlcd_core::{Pose, Real};

use crate::SensorFrame;

/// One step of a drive: the sweep, its ground-truth pose and its timestamp.
///
/// `points` is `None` when the sweep file could not be opened.
#[derive(Clone, Debug)]
pub struct ScanRecord {
    pub seq: usize,
    pub timestamp: Real,
    pub pose: Pose,
    pub points: Option<SensorFrame>,
}
