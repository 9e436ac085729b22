use crate::Pose;

/// Ordered, immutable mapping frame index -> [`Pose`].
///
/// Indices form a contiguous run beginning at [`Trajectory::first_index`]; a
/// `Trajectory` can only be obtained from a [`TrajectoryBuilder`], which appends
/// in order and cannot leave gaps.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    first_index: usize,
    poses: Vec<Pose>,
}

impl Trajectory {
    pub fn first_index(&self) -> usize {
        self.first_index
    }

    /// One past the last index held.
    pub fn end_index(&self) -> usize {
        self.first_index + self.poses.len()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first_index..self.end_index()).contains(&index)
    }

    pub fn get(&self, index: usize) -> Option<&Pose> {
        index
            .checked_sub(self.first_index)
            .and_then(|offset| self.poses.get(offset))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Pose)> + '_ {
        self.poses
            .iter()
            .enumerate()
            .map(move |(offset, pose)| (self.first_index + offset, pose))
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }
}

/// Append-only construction of a [`Trajectory`].
#[derive(Debug, Default)]
pub struct TrajectoryBuilder {
    first_index: usize,
    poses: Vec<Pose>,
}

impl TrajectoryBuilder {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first_index: usize) -> Self {
        Self {
            first_index,
            poses: Vec::new(),
        }
    }

    /// Index the next pushed pose will receive.
    pub fn next_index(&self) -> usize {
        self.first_index + self.poses.len()
    }

    pub fn push(&mut self, pose: Pose) -> usize {
        let index = self.next_index();
        self.poses.push(pose);
        index
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn build(self) -> Trajectory {
        Trajectory {
            first_index: self.first_index,
            poses: self.poses,
        }
    }
}
