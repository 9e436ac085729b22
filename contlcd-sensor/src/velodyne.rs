use std::io::Read;

use contlcd_core::PointCoordinates;
use sophus::nalgebra::Point3;

/// x, y, z, intensity
pub const FLOATS_PER_POINT: usize = 4;
pub const POINT_STRIDE_BYTES: usize = FLOATS_PER_POINT * std::mem::size_of::<f32>();

/// Positions decoded from one Velodyne sweep.
///
/// Intensity is read from the file but not kept; downstream consumers only
/// use geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorFrame {
    points: Vec<Point3<f32>>,
}

impl SensorFrame {
    pub fn new(points: Vec<Point3<f32>>) -> Self {
        Self { points }
    }

    /// Decode a headerless little-endian `[x, y, z, intensity]` f32 stream.
    ///
    /// Trailing bytes that do not form a whole point are dropped. At most
    /// `max_points` points are decoded.
    pub fn from_xyzi_bytes(bytes: &[u8], max_points: usize) -> Self {
        let points = bytes
            .chunks_exact(POINT_STRIDE_BYTES)
            .take(max_points)
            .map(|record| {
                let mut xyzi = [0f32; FLOATS_PER_POINT];
                for (value, raw) in xyzi.iter_mut().zip(record.chunks_exact(4)) {
                    *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                }
                Point3::new(xyzi[0], xyzi[1], xyzi[2])
            })
            .collect();
        Self { points }
    }

    /// Read at most `max_points` records from `reader`.
    pub fn read_xyzi<R: Read>(reader: R, max_points: usize) -> std::io::Result<Self> {
        let byte_cap = max_points.saturating_mul(POINT_STRIDE_BYTES) as u64;
        let mut buffer = Vec::new();
        reader.take(byte_cap).read_to_end(&mut buffer)?;
        Ok(Self::from_xyzi_bytes(&buffer, max_points))
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.points.iter()
    }

    pub fn to_coordinates(&self) -> Vec<PointCoordinates> {
        self.points
            .iter()
            .map(|p| PointCoordinates::new(p.x as f64, p.y as f64, p.z as f64))
            .collect()
    }
}
