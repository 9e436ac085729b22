mod dataset;
pub use dataset::*;
pub mod pose;
pub mod trajectory;
pub use trajectory::{Trajectory, TrajectoryBuilder};

use sophus::nalgebra::{Isometry3, Vector3};

pub type Real = f64;
pub type PointCoordinates = Vector3<Real>;

/// Rigid transform (rotation + translation) in the trajectory's local frame.
pub type Pose = Isometry3<Real>;
