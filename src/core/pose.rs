//! Robot pose in 2D space.

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;
use super::point::Point2D;

/// Robot pose in 2D space.
///
/// Represents position (x, y) in world units and heading (theta) in radians.
/// Theta is normalized to [-π, π], CCW positive from the +X axis.
///
/// Two logically distinct poses flow through the system: the *true* pose
/// (ground truth, owned by the simulation driver) and the *estimated* pose
/// (owned by the pose estimator). The type is shared; the distinction is
/// carried by [`super::scan::StampedPose`] frame tags so the two are never
/// silently interchanged when updating the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in world units
    pub x: f32,
    /// Y position in world units
    pub y: f32,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Position component of the pose.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Check that all components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }

    /// Compose two poses: self ⊕ other
    ///
    /// Applies `other` as a displacement expressed in `self`'s frame:
    /// the displacement is rotated by `self.theta`, then translated, and
    /// the rotations add.
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose.
    ///
    /// Returns the transform that undoes this pose:
    /// `p.compose(&p.inverse())` is the identity.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// Transform a point from this pose's local frame to the world frame.
    #[inline]
    pub fn transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Point2D::new(
            self.x + point.x * cos_t - point.y * sin_t,
            self.y + point.x * sin_t + point.y * cos_t,
        )
    }

    /// Transform a point from the world frame into this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        Point2D::new(dx * cos_t + dy * sin_t, -dx * sin_t + dy * cos_t)
    }

    /// Euclidean distance between the positions of two poses.
    #[inline]
    pub fn distance_to(&self, other: &Pose2D) -> f32 {
        self.position().distance(&other.position())
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_compose_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&Pose2D::identity());
        assert_relative_eq!(result.x, p.x);
        assert_relative_eq!(result.y, p.y);
        assert_relative_eq!(result.theta, p.theta);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&p.inverse());
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_compose_rotates_displacement() {
        // Facing +Y, moving "forward" 1 unit lands at +Y
        let pose = Pose2D::new(0.0, 0.0, FRAC_PI_2);
        let forward = Pose2D::new(1.0, 0.0, 0.0);
        let result = pose.compose(&forward);
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_point() {
        let pose = Pose2D::new(1.0, 0.0, FRAC_PI_2);
        let point = Point2D::new(1.0, 0.0);
        let result = pose.transform_point(&point);
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_transform_point() {
        let pose = Pose2D::new(1.0, 0.0, FRAC_PI_2);
        let global = Point2D::new(1.0, 1.0);
        let local = pose.inverse_transform_point(&global);
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_roundtrip() {
        let pose = Pose2D::new(5.0, -3.0, 1.2);
        let point = Point2D::new(1.0, 2.0);
        let back = pose.inverse_transform_point(&pose.transform_point(&point));
        assert_relative_eq!(back.x, point.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, point.y, epsilon = 1e-5);
    }

    #[test]
    fn test_distance_to() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, 1.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Pose2D::new(1.0, 2.0, 0.3).is_finite());
        assert!(!Pose2D {
            x: f32::NAN,
            y: 0.0,
            theta: 0.0
        }
        .is_finite());
    }
}
