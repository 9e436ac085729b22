use serde::{Deserialize, Serialize};
use sophus::nalgebra::{Translation3, UnitQuaternion, Vector3};

use crate::{Pose, Real};

/// Orientation composed as yaw ∘ pitch ∘ roll (z, then y, then x; intrinsic).
pub fn rotation_from_rpy(roll: Real, pitch: Real, yaw: Real) -> UnitQuaternion<Real> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), pitch)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), roll)
}

pub fn pose_from_parts(translation: Vector3<Real>, rotation: UnitQuaternion<Real>) -> Pose {
    Pose::from_parts(Translation3::from(translation), rotation)
}

/// Transform taking points of `target` into the frame of `reference`.
pub fn relative_transform(reference: &Pose, target: &Pose) -> Pose {
    reference.inverse() * target
}

pub fn translation_distance(a: &Pose, b: &Pose) -> Real {
    (a.translation.vector - b.translation.vector).norm()
}

/// Error magnitudes between an estimated and a true rigid transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseError {
    pub translation_m: Real,
    pub rotation_deg: Real,
}

impl PoseError {
    pub fn between(estimated: &Pose, truth: &Pose) -> Self {
        let delta = truth.inverse() * estimated;
        Self {
            translation_m: delta.translation.vector.norm(),
            rotation_deg: delta.rotation.angle().to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn yaw_rotates_about_vertical_axis() {
        let rot = rotation_from_rpy(0.0, 0.0, FRAC_PI_2);
        let v = rot * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn roll_is_applied_before_yaw() {
        // roll 90 deg takes +y to +z, yaw leaves +z untouched
        let rot = rotation_from_rpy(FRAC_PI_2, 0.0, FRAC_PI_2);
        let v = rot * Vector3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn relative_transform_recovers_offset() {
        let a = pose_from_parts(Vector3::new(1.0, 0.0, 0.0), rotation_from_rpy(0.0, 0.0, FRAC_PI_2));
        let b = pose_from_parts(Vector3::new(1.0, 2.0, 0.0), rotation_from_rpy(0.0, 0.0, FRAC_PI_2));
        let rel = relative_transform(&a, &b);
        // 2 m along world +y is 2 m along a's +x
        assert_relative_eq!(rel.translation.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(rel.translation.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(translation_distance(&a, &b), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn pose_error_is_zero_for_identical_transforms() {
        let p = pose_from_parts(Vector3::new(3.0, -1.0, 0.5), rotation_from_rpy(0.1, 0.2, 0.3));
        let err = PoseError::between(&p, &p);
        assert_relative_eq!(err.translation_m, 0.0, epsilon = 1e-12);
        assert_relative_eq!(err.rotation_deg, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn pose_error_reports_degrees() {
        let truth = Pose::identity();
        let est = pose_from_parts(Vector3::new(0.0, 0.0, 0.0), rotation_from_rpy(0.0, 0.0, 10f64.to_radians()));
        let err = PoseError::between(&est, &truth);
        assert_relative_eq!(err.rotation_deg, 10.0, epsilon = 1e-9);
    }
}
