use std::collections::BTreeMap;

use contlcd_core::{Pose, Real};
use contlcd_eval::{OutcomeLabel, PoseObserver};

/// Poses per logged path segment.
const PATH_CHUNK_LEN: usize = 100;

/// Splits the drive path into bounded strips so each pose re-sends at most
/// one chunk. Consecutive chunks share their boundary point.
struct PathChunks {
    chunk_len: usize,
    index: usize,
    current: Vec<[f32; 3]>,
}

impl PathChunks {
    fn new(chunk_len: usize) -> Self {
        Self {
            chunk_len: chunk_len.max(1),
            index: 0,
            current: Vec::new(),
        }
    }

    /// Append `position` and return the chunk it landed in.
    fn push(&mut self, position: [f32; 3]) -> (usize, &[[f32; 3]]) {
        if self.current.len() > self.chunk_len {
            let last = self.current[self.current.len() - 1];
            self.current.clear();
            self.current.push(last);
            self.index += 1;
        }
        self.current.push(position);
        (self.index, &self.current)
    }
}

/// Streams ground-truth poses and detected loops to a rerun viewer.
///
/// Poses are lifted along z by the drive-time offset so revisits stay
/// distinguishable from the first pass.
pub struct RerunPoseObserver {
    rec: rerun::RecordingStream,
    positions: BTreeMap<usize, [f32; 3]>,
    path: PathChunks,
}

impl RerunPoseObserver {
    pub fn spawn() -> anyhow::Result<Self> {
        let rec = rerun::RecordingStreamBuilder::new("contlcd_batch_eval").spawn()?;
        Ok(Self {
            rec,
            positions: BTreeMap::new(),
            path: PathChunks::new(PATH_CHUNK_LEN),
        })
    }
}

impl PoseObserver for RerunPoseObserver {
    fn on_pose(&mut self, seq: usize, pose: &Pose, display_offset: Real) -> anyhow::Result<()> {
        let t = pose.translation.vector;
        let q = pose.rotation;
        let position = [t.x as f32, t.y as f32, (t.z + display_offset) as f32];
        self.positions.insert(seq, position);

        self.rec.set_time_sequence("seq", seq as i64);
        self.rec.log(
            "world/gt_pose",
            &rerun::Transform3D::from_translation_rotation(
                rerun::Vec3D::new(position[0], position[1], position[2]),
                rerun::Quaternion::from_xyzw([q.i as f32, q.j as f32, q.k as f32, q.w as f32]),
            ),
        )?;
        let (chunk, strip) = self.path.push(position);
        self.rec.log(
            format!("world/gt_path/{chunk}"),
            &rerun::LineStrips3D::new([strip.to_vec()]).with_colors([[100, 100, 100]]),
        )?;
        Ok(())
    }

    fn on_loop_closure(
        &mut self,
        query_seq: usize,
        candidate_seq: usize,
        label: OutcomeLabel,
    ) -> anyhow::Result<()> {
        let (Some(query), Some(candidate)) = (
            self.positions.get(&query_seq).copied(),
            self.positions.get(&candidate_seq).copied(),
        ) else {
            return Ok(());
        };
        let color: [u8; 3] = match label {
            OutcomeLabel::TruePositive => [0, 200, 0],
            _ => [255, 60, 60],
        };
        self.rec.log(
            format!("world/loops/{query_seq}"),
            &rerun::LineStrips3D::new([vec![query, candidate]]).with_colors([color]),
        )?;
        Ok(())
    }
}
