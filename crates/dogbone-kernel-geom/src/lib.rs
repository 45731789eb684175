#![warn(missing_docs)]

//! Analytic surface and line types for the dogbone kernel.
//!
//! Provides a trait-based abstraction for parametric surfaces with the
//! concrete types corner-relief placement needs: planes (the faces a
//! dogbone is placed on) and cylinders (the non-planar faces that must be
//! recognized and rejected), plus infinite 3D lines.

use dogbone_kernel_math::{Dir3, Point2, Point3, Tolerance, Vec3};
use std::any::Any;
use std::f64::consts::PI;

// =============================================================================
// Surface types
// =============================================================================

/// The kind of a surface (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Infinite plane.
    Plane,
    /// Cylindrical surface (infinite extent along axis).
    Cylinder,
}

/// A parametric surface in 3D space.
pub trait Surface: Send + Sync + std::fmt::Debug {
    /// Evaluate the surface at parameter `(u, v)` to get a 3D point.
    fn evaluate(&self, uv: Point2) -> Point3;

    /// Surface normal at parameter `(u, v)`.
    fn normal(&self, uv: Point2) -> Dir3;

    /// Parameter domain as `((u_min, u_max), (v_min, v_max))`.
    fn domain(&self) -> ((f64, f64), (f64, f64));

    /// The kind of this surface.
    fn surface_type(&self) -> SurfaceKind;

    /// Clone this surface into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Surface>;

    /// Downcast to a concrete type via `Any`.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Surface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// Line
// =============================================================================

/// An infinite line through `origin` along `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Line3 {
    /// A point on the line.
    pub origin: Point3,
    /// Unit direction of the line.
    pub direction: Dir3,
}

impl Line3 {
    /// Create a line from a point and a (not necessarily unit) direction.
    ///
    /// Returns `None` for a zero direction.
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        Dir3::try_new(direction, 1e-15).map(|direction| Self { origin, direction })
    }

    /// Line through two distinct points.
    pub fn through(a: Point3, b: Point3) -> Option<Self> {
        Self::new(a, b - a)
    }

    /// Point at signed distance `t` from the origin.
    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Orthogonal projection of `p` onto the line.
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        let t = (p - self.origin).dot(self.direction.as_ref());
        self.point_at(t)
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_to(&self, p: &Point3) -> f64 {
        (p - self.closest_point(p)).norm()
    }
}

// =============================================================================
// Plane
// =============================================================================

/// An infinite plane defined by an origin point and a coordinate frame.
///
/// Parameterization: `P(u, v) = origin + u * x_dir + v * y_dir`
#[derive(Debug, Clone)]
pub struct Plane {
    /// Origin point on the plane.
    pub origin: Point3,
    /// Unit vector along the u direction.
    pub x_dir: Dir3,
    /// Unit vector along the v direction.
    pub y_dir: Dir3,
    /// Unit normal (x_dir × y_dir).
    pub normal_dir: Dir3,
}

impl Plane {
    /// Create a plane from origin and two non-parallel direction vectors.
    /// The vectors do not need to be normalized or orthogonal; `y_dir` is
    /// re-orthogonalized against `x_dir`.
    pub fn new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Self {
        let n = Dir3::new_normalize(x_dir.cross(&y_dir));
        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// Create a plane from origin and normal. X/Y directions are chosen arbitrarily.
    pub fn from_normal(origin: Point3, normal: Vec3) -> Self {
        let n = Dir3::new_normalize(normal);
        // Pick an arbitrary perpendicular vector
        let arbitrary = if n.as_ref().x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        let x = Dir3::new_normalize(arbitrary.cross(n.as_ref()));
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// XY plane at the origin.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vec3::x(), Vec3::y())
    }

    /// The same plane with the normal (and v direction) flipped.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            x_dir: self.x_dir,
            y_dir: -self.y_dir,
            normal_dir: -self.normal_dir,
        }
    }

    /// Project a 3D point onto this plane's (u, v) parameter space.
    pub fn project(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal_dir.as_ref())
    }

    /// Orthogonal projection of a 3D point onto the plane.
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        p - self.signed_distance(p) * self.normal_dir.as_ref()
    }

    /// Whether the two planes have parallel normals (either sense).
    pub fn is_parallel_to(&self, other: &Plane, tol: &Tolerance) -> bool {
        tol.is_parallel(self.normal_dir.as_ref(), other.normal_dir.as_ref())
    }

    /// Intersection point of an infinite line with this plane.
    ///
    /// Returns `None` when the line is parallel to the plane.
    pub fn intersect_with_line(&self, line: &Line3) -> Option<Point3> {
        let denom = line.direction.as_ref().dot(self.normal_dir.as_ref());
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (self.origin - line.origin).dot(self.normal_dir.as_ref()) / denom;
        Some(line.point_at(t))
    }
}

impl Surface for Plane {
    fn evaluate(&self, uv: Point2) -> Point3 {
        self.origin + uv.x * self.x_dir.as_ref() + uv.y * self.y_dir.as_ref()
    }

    fn normal(&self, _uv: Point2) -> Dir3 {
        self.normal_dir
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((-1e10, 1e10), (-1e10, 1e10))
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Cylinder
// =============================================================================

/// A cylindrical surface defined by an axis line and radius.
///
/// Parameterization: `P(u, v) = center + radius * (cos(u) * x_dir + sin(u) * y_dir) + v * axis`
///
/// Where `u ∈ [0, 2π)` is the angular parameter and `v` is the height along the axis.
#[derive(Debug, Clone)]
pub struct CylinderSurface {
    /// Center point at the base of the cylinder axis.
    pub center: Point3,
    /// Unit direction along the cylinder axis.
    pub axis: Dir3,
    /// Reference direction for u=0 (perpendicular to axis).
    pub ref_dir: Dir3,
    /// Radius of the cylinder.
    pub radius: f64,
}

impl CylinderSurface {
    /// Create a cylinder with axis along Z, centered at origin.
    pub fn new(radius: f64) -> Self {
        Self {
            center: Point3::origin(),
            axis: Dir3::new_normalize(Vec3::z()),
            ref_dir: Dir3::new_normalize(Vec3::x()),
            radius,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.as_ref().cross(self.ref_dir.as_ref())
    }
}

impl Surface for CylinderSurface {
    fn evaluate(&self, uv: Point2) -> Point3 {
        let (sin_u, cos_u) = uv.x.sin_cos();
        self.center
            + self.radius * (cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
            + uv.y * self.axis.as_ref()
    }

    fn normal(&self, uv: Point2) -> Dir3 {
        let (sin_u, cos_u) = uv.x.sin_cos();
        Dir3::new_normalize(cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 2.0 * PI), (-1e10, 1e10))
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Cylinder
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Geometry store
// =============================================================================

/// Storage for the surfaces of a B-rep body.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    /// Surfaces indexed by position (Face.surface_index refers to these).
    pub surfaces: Vec<Box<dyn Surface>>,
}

impl GeometryStore {
    /// Create an empty geometry store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface and return its index.
    pub fn add_surface(&mut self, surface: Box<dyn Surface>) -> usize {
        let idx = self.surfaces.len();
        self.surfaces.push(surface);
        idx
    }

    /// The surface at `index`, downcast to a plane if it is one.
    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.surfaces.get(index)?.as_any().downcast_ref::<Plane>()
    }
}
