pub mod velodyne;
mod scan_record;
pub use scan_record::ScanRecord;

pub use velodyne::{SensorFrame, FLOATS_PER_POINT, POINT_STRIDE_BYTES};
