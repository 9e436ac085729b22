//! GPS/IMU (OXTS) navigation records and ground-truth trajectory reconstruction.
//!
//! Projection follows the KITTI raw devkit: a Mercator projection whose scale is
//! fixed by the latitude of the first frame of the drive.

use std::path::Path;

use contlcd_core::pose::{pose_from_parts, rotation_from_rpy};
use contlcd_core::{Real, Trajectory, TrajectoryBuilder};
use sophus::nalgebra::Vector3;

use crate::kitti_raw::SequenceId;
use crate::{DatasetError, Result, MAX_PROBE_INDEX};

pub const EARTH_RADIUS_M: Real = 6_378_137.0;

const REQUIRED_FIELDS: usize = 6;

/// Leading six fields of an OXTS line. Angles are radians, lat/lon degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationRecord {
    pub latitude: Real,
    pub longitude: Real,
    pub altitude: Real,
    pub roll: Real,
    pub pitch: Real,
    pub yaw: Real,
}

impl NavigationRecord {
    /// Parse the first line of a record. On failure returns how many leading
    /// numeric fields were found.
    pub fn parse(line: &str) -> std::result::Result<Self, usize> {
        let mut fields = [0.0; REQUIRED_FIELDS];
        let mut tokens = line.split_whitespace();
        for (parsed, field) in fields.iter_mut().enumerate() {
            *field = tokens
                .next()
                .and_then(|t| t.parse::<Real>().ok())
                .ok_or(parsed)?;
        }
        let [latitude, longitude, altitude, roll, pitch, yaw] = fields;
        Ok(Self {
            latitude,
            longitude,
            altitude,
            roll,
            pitch,
            yaw,
        })
    }

    pub fn read(path: &Path, index: usize) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| DatasetError::MissingRecord {
            index,
            path: path.to_path_buf(),
        })?;
        // the data has only one line
        let line = content.lines().next().unwrap_or_default();
        Self::parse(line).map_err(|fields| DatasetError::MalformedRecord {
            index,
            path: path.to_path_buf(),
            fields,
        })
    }
}

/// Mercator projection with a scale frozen at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MercatorProjection {
    scale: Real,
}

impl MercatorProjection {
    pub fn from_reference_latitude(latitude_deg: Real) -> Self {
        Self {
            scale: latitude_deg.to_radians().cos(),
        }
    }

    pub fn scale(&self) -> Real {
        self.scale
    }

    pub fn project(&self, record: &NavigationRecord) -> Vector3<Real> {
        let x = self.scale * record.longitude.to_radians() * EARTH_RADIUS_M;
        let y = self.scale
            * EARTH_RADIUS_M
            * ((90.0 + record.latitude) * std::f64::consts::PI / 360.0)
                .tan()
                .ln();
        Vector3::new(x, y, record.altitude)
    }
}

/// Reconstruct the ground-truth trajectory of a drive.
pub fn build_trajectory(root: &Path, id: &SequenceId) -> Trajectory {
    build_trajectory_with_cap(root, id, MAX_PROBE_INDEX)
}

/// Probe `0..max_probe_index` and stop at the first missing or malformed
/// record; later indices are never looked at.
///
/// Translations are expressed relative to frame 0. Rotations are kept absolute.
pub fn build_trajectory_with_cap(root: &Path, id: &SequenceId, max_probe_index: usize) -> Trajectory {
    let mut builder = TrajectoryBuilder::new();
    let mut projection: Option<MercatorProjection> = None;
    let mut origin: Option<Vector3<Real>> = None;

    for index in 0..max_probe_index {
        let path = id.oxts_path(root, index);
        let record = match NavigationRecord::read(&path, index) {
            Ok(record) => record,
            Err(e) => {
                log::info!("{e}, breaking loop...");
                break;
            }
        };

        let projection = *projection
            .get_or_insert_with(|| MercatorProjection::from_reference_latitude(record.latitude));
        let translation = projection.project(&record);
        let origin = *origin.get_or_insert(translation);

        builder.push(pose_from_parts(
            translation - origin,
            rotation_from_rpy(record.roll, record.pitch, record.yaw),
        ));
    }

    log::info!("loaded {} ground truth poses for {}", builder.len(), id);
    builder.build()
}
