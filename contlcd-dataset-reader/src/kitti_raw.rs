use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contlcd_core::{Dataset, Real, Trajectory};
use contlcd_sensor::{ScanRecord, SensorFrame};

use crate::timestamps::{self, NOMINAL_SWEEP_PERIOD_S};
use crate::{oxts, DatasetError, Result, INDEX_WIDTH, MAX_POINTS_PER_FRAME};

/// A KITTI raw drive, e.g. `2011_09_30` / `2011_09_30_drive_0018_sync`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceId {
    pub date: String,
    pub drive: String,
}

impl SequenceId {
    pub fn new(date: impl Into<String>, drive: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            drive: drive.into(),
        }
    }

    pub fn drive_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.date).join(&self.drive)
    }

    pub fn oxts_path(&self, root: &Path, index: usize) -> PathBuf {
        self.drive_dir(root)
            .join("oxts")
            .join("data")
            .join(format!("{}.txt", padded_index(index)))
    }

    pub fn velodyne_path(&self, root: &Path, index: usize) -> PathBuf {
        self.drive_dir(root)
            .join("velodyne_points")
            .join("data")
            .join(format!("{}.bin", padded_index(index)))
    }

    pub fn velodyne_timestamps_path(&self, root: &Path) -> PathBuf {
        self.drive_dir(root).join("velodyne_points").join("timestamps.txt")
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date, self.drive)
    }
}

pub fn padded_index(index: usize) -> String {
    format!("{index:0width$}", width = INDEX_WIDTH)
}

/// Read one sweep file.
pub fn read_frame(path: &Path) -> Result<SensorFrame> {
    let file = File::open(path).map_err(|_| DatasetError::SensorFileAbsent {
        path: path.to_path_buf(),
    })?;
    SensorFrame::read_xyzi(BufReader::new(file), MAX_POINTS_PER_FRAME).map_err(|source| {
        DatasetError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Decode the sweep at `index`, or `None` if it cannot be read.
pub fn decode_frame(root: &Path, id: &SequenceId, index: usize) -> Option<SensorFrame> {
    match read_frame(&id.velodyne_path(root, index)) {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    }
}

pub struct KittiRawReader {
    dataset_path: PathBuf,
    id: SequenceId,
}

impl KittiRawReader {
    pub fn new(dataset_path: impl Into<PathBuf>, date: &str, drive: &str) -> Self {
        KittiRawReader {
            dataset_path: dataset_path.into(),
            id: SequenceId::new(date, drive),
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn sequence_id(&self) -> &SequenceId {
        &self.id
    }

    pub fn build_trajectory(&self) -> Trajectory {
        oxts::build_trajectory(&self.dataset_path, &self.id)
    }

    pub fn decode_frame(&self, index: usize) -> Option<SensorFrame> {
        decode_frame(&self.dataset_path, &self.id, index)
    }

    /// Sweep timestamps in seconds of day. Empty when the drive ships none.
    pub fn load_timestamps(&self) -> Result<Vec<Real>> {
        let path = self.id.velodyne_timestamps_path(&self.dataset_path);
        if !path.exists() {
            log::warn!(
                "{} not found, assuming {NOMINAL_SWEEP_PERIOD_S} s sweep period",
                path.display()
            );
            return Ok(Vec::new());
        }
        timestamps::load(&path)
    }

    /// Reconstruct the trajectory and pair it with sweeps and timestamps.
    /// Unreadable timestamps fall back to the nominal sweep period.
    pub fn into_sequence(self) -> Result<KittiRawSequence> {
        let trajectory = Arc::new(self.build_trajectory());
        let timestamps = self.load_timestamps().unwrap_or_else(|e| {
            log::warn!("{e}, assuming {NOMINAL_SWEEP_PERIOD_S} s sweep period");
            Vec::new()
        });
        log::info!(
            "{}: {} poses, {} sweep timestamps",
            self.id,
            trajectory.len(),
            timestamps.len()
        );
        Ok(KittiRawSequence {
            reader: self,
            trajectory,
            timestamps,
        })
    }
}

/// Sequential frame/pose source over a drive.
///
/// Every pose is assumed to have a sweep with the same index; nothing checks
/// that the two directories agree.
pub struct KittiRawSequence {
    reader: KittiRawReader,
    trajectory: Arc<Trajectory>,
    timestamps: Vec<Real>,
}

impl KittiRawSequence {
    pub fn trajectory(&self) -> Arc<Trajectory> {
        Arc::clone(&self.trajectory)
    }

    pub fn timestamp(&self, index: usize) -> Real {
        self.timestamps
            .get(index)
            .copied()
            .unwrap_or(index as Real * NOMINAL_SWEEP_PERIOD_S)
    }
}

impl Dataset<ScanRecord> for KittiRawSequence {
    fn get(&self, index: usize) -> Option<ScanRecord> {
        let pose = *self.trajectory.get(index)?;
        Some(ScanRecord {
            seq: index,
            timestamp: self.timestamp(index),
            pose,
            points: self.reader.decode_frame(index),
        })
    }

    fn len(&self) -> usize {
        self.trajectory.end_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::KittiRawFixture;

    #[test]
    fn paths_follow_kitti_raw_layout() {
        let id = SequenceId::new("2011_09_30", "2011_09_30_drive_0018_sync");
        let root = Path::new("/data/kitti_raw");
        assert_eq!(
            id.oxts_path(root, 42),
            Path::new("/data/kitti_raw/2011_09_30/2011_09_30_drive_0018_sync/oxts/data/0000000042.txt")
        );
        assert_eq!(
            id.velodyne_path(root, 7),
            Path::new(
                "/data/kitti_raw/2011_09_30/2011_09_30_drive_0018_sync/velodyne_points/data/0000000007.bin"
            )
        );
        assert_eq!(padded_index(1234567890), "1234567890");
    }

    #[test]
    fn decodes_whole_number_of_points() {
        let fixture = KittiRawFixture::new();
        fixture.write_velodyne(0, &[[1.0, 2.0, 3.0, 0.1]; 5], 0);
        let frame = decode_frame(fixture.root(), fixture.id(), 0).unwrap();
        assert_eq!(frame.len(), 5);
    }

    #[test]
    fn truncates_partial_trailing_point() {
        let fixture = KittiRawFixture::new();
        fixture.write_velodyne(3, &[[1.0, 2.0, 3.0, 0.1]; 4], 7);
        let frame = decode_frame(fixture.root(), fixture.id(), 3).unwrap();
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn missing_sweep_is_empty_not_error() {
        let fixture = KittiRawFixture::new();
        assert!(decode_frame(fixture.root(), fixture.id(), 9).is_none());
        assert!(matches!(
            read_frame(&fixture.id().velodyne_path(fixture.root(), 9)),
            Err(DatasetError::SensorFileAbsent { .. })
        ));
    }

    #[test]
    fn sequence_pairs_poses_with_sweeps() {
        let fixture = KittiRawFixture::new();
        for index in 0..3 {
            fixture.write_oxts(index, &[49.0, 8.4 + index as f64 * 1e-5, 100.0, 0.0, 0.0, 0.0]);
        }
        fixture.write_velodyne(0, &[[0.0; 4]; 2], 0);
        fixture.write_velodyne(2, &[[0.0; 4]; 3], 0);

        let reader = KittiRawReader::new(fixture.root(), &fixture.id().date, &fixture.id().drive);
        let sequence = reader.into_sequence().unwrap();
        assert_eq!(sequence.len(), 3);

        let records: Vec<_> = sequence.iter().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].points.as_ref().map(|f| f.len()), Some(2));
        assert!(records[1].points.is_none());
        assert_eq!(records[2].points.as_ref().map(|f| f.len()), Some(3));
        assert!((records[2].timestamp - 0.2).abs() < 1e-12);
        assert!(sequence.get(3).is_none());
    }

    #[test]
    fn sequence_uses_timestamp_file_when_present() {
        let fixture = KittiRawFixture::new();
        fixture.write_oxts(0, &[49.0, 8.4, 100.0, 0.0, 0.0, 0.0]);
        fixture.write_velodyne_timestamps(&["2011-09-30 00:01:00.500000000"]);

        let reader = KittiRawReader::new(fixture.root(), &fixture.id().date, &fixture.id().drive);
        let sequence = reader.into_sequence().unwrap();
        assert!((sequence.timestamp(0) - 60.5).abs() < 1e-9);
        assert!((sequence.timestamp(1) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn malformed_timestamps_fall_back_to_sweep_period() {
        let fixture = KittiRawFixture::new();
        for index in 0..2 {
            fixture.write_oxts(index, &[49.0, 8.4, 100.0, 0.0, 0.0, 0.0]);
        }
        fixture.write_velodyne_timestamps(&["2011-09-30 00:01:00.5", "not a timestamp"]);

        let reader = KittiRawReader::new(fixture.root(), &fixture.id().date, &fixture.id().drive);
        assert!(reader.load_timestamps().is_err());

        let sequence = reader.into_sequence().unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.timestamp(0), 0.0);
        assert!((sequence.timestamp(1) - 0.1).abs() < 1e-12);
    }
}
