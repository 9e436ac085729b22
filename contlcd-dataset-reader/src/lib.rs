mod error;
pub use error::{DatasetError, Result};
pub mod kitti_raw;
pub mod oxts;
pub mod timestamps;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use contlcd_sensor::ScanRecord;
pub use kitti_raw::{decode_frame, KittiRawReader, KittiRawSequence, SequenceId};
pub use oxts::{build_trajectory, NavigationRecord};

/// Upper bound on frame indices probed during trajectory discovery.
pub const MAX_PROBE_INDEX: usize = 10_000;

/// Width of the zero-padded index in record file names (".txt"/".bin" excluded).
pub const INDEX_WIDTH: usize = 10;

/// Cap on decoded points per sweep (1,000,000 floats). A Velodyne HDL-64
/// sweep holds ~130k points.
pub const MAX_POINTS_PER_FRAME: usize = 250_000;
