#![warn(missing_docs)]

//! Math types for the dogbone B-rep kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for 3D CAD geometry: points, vectors, directions, and tolerance
//! constants used by every comparison in the workspace.

use nalgebra::{Unit, Vector3};
use std::f64::consts::PI;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// Unsigned angle between two vectors in `[0, π]`.
///
/// Returns `None` if either vector has zero length.
pub fn angle_to(a: &Vec3, b: &Vec3) -> Option<f64> {
    let na = a.norm();
    let nb = b.norm();
    if na < 1e-15 || nb < 1e-15 {
        return None;
    }
    // Clamp: rounding can push the cosine slightly outside [-1, 1].
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Convert radians to degrees.
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if two vectors are parallel, in either sense.
    ///
    /// Zero-length vectors are never parallel to anything.
    pub fn is_parallel(&self, a: &Vec3, b: &Vec3) -> bool {
        let na = a.norm();
        let nb = b.norm();
        if na < 1e-15 || nb < 1e-15 {
            return false;
        }
        // |a × b| = |a||b| sin θ; compare sin θ against the angular tolerance,
        // relaxed to the linear one so that normals built from mm-scale
        // vertex data still compare equal.
        let sin = a.cross(b).norm() / (na * nb);
        sin < self.angular.max(self.linear)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
