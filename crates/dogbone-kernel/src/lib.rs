#![warn(missing_docs)]

//! In-memory modeling document for the dogbone kernel.
//!
//! Provides the [`Document`] type: a set of named B-rep bodies, the hole
//! features cut into them, and a generation counter that advances on every
//! mutation so callers can tell when their face/edge keys may be stale.
//!
//! # Example
//!
//! ```
//! use dogbone_kernel::{Document, HoleExtent, HolePosition, HoleRequest, FLAT_TIP_ANGLE};
//! use dogbone_kernel::dogbone_kernel_math::Point3;
//! use dogbone_kernel::dogbone_kernel_primitives::make_cube;
//!
//! let mut doc = Document::new();
//! let body = doc.add_body("plate", make_cube(20.0, 20.0, 5.0));
//! let top = doc.body(body).unwrap().faces()[1];
//! let before = doc.generation();
//!
//! doc.create_hole(HoleRequest {
//!     body,
//!     diameter: 6.0,
//!     tip_angle: FLAT_TIP_ANGLE,
//!     position: HolePosition::AtPoints {
//!         plane_face: top,
//!         points: vec![Point3::new(10.0, 10.0, 5.0)],
//!     },
//!     extent: HoleExtent::Distance(5.0),
//! })
//! .unwrap();
//! assert!(doc.generation() > before);
//! ```

mod hole;

pub use dogbone_kernel_geom;
pub use dogbone_kernel_math;
pub use dogbone_kernel_primitives;
pub use dogbone_kernel_topo;

pub use hole::{HoleExtent, HoleFeature, HoleId, HolePosition, HoleRequest, FLAT_TIP_ANGLE};

use dogbone_kernel_math::{Point3, Tolerance};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;
use tracing::{debug, info};

new_key_type! {
    /// Key of a body in a [`Document`].
    pub struct BodyId;
}

/// Errors raised when the document rejects a mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// The body key does not exist in the document.
    #[error("unknown body")]
    UnknownBody,

    /// A referenced face, edge or vertex is not part of the body.
    #[error("{0} does not exist in the body")]
    MissingEntity(&'static str),

    /// The sketch face of a hole is not planar.
    #[error("hole sketch face is not planar")]
    NonPlanarFace,

    /// Hole parameters are out of range.
    #[error("invalid hole: {0}")]
    InvalidHole(String),
}

/// A named body in the document.
#[derive(Debug, Clone)]
pub struct Body {
    /// Display name.
    pub name: String,
    /// Boundary representation.
    pub brep: BRepSolid,
}

/// An in-memory modeling document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    bodies: SlotMap<BodyId, Body>,
    holes: Vec<HoleFeature>,
    generation: u64,
    tolerance: Tolerance,
}

impl Document {
    /// Create an empty document with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerances used for point lookups.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Mutation counter. Any face/edge key taken at an older generation
    /// must be revalidated before use.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// Add a body.
    pub fn add_body(&mut self, name: impl Into<String>, brep: BRepSolid) -> BodyId {
        let name = name.into();
        let id = self.bodies.insert(Body {
            name: name.clone(),
            brep,
        });
        let generation = self.bump();
        info!(body = %name, generation, "added body");
        id
    }

    /// Replace a body's geometry (a remodel). All keys into the old
    /// boundary representation are invalidated.
    pub fn replace_body(&mut self, id: BodyId, brep: BRepSolid) -> Result<(), KernelError> {
        let body = self.bodies.get_mut(id).ok_or(KernelError::UnknownBody)?;
        body.brep = brep;
        let generation = self.bump();
        debug!(?id, generation, "replaced body geometry");
        Ok(())
    }

    /// Boundary representation of a body.
    pub fn body(&self, id: BodyId) -> Option<&BRepSolid> {
        self.bodies.get(id).map(|b| &b.brep)
    }

    /// Display name of a body.
    pub fn body_name(&self, id: BodyId) -> Option<&str> {
        self.bodies.get(id).map(|b| b.name.as_str())
    }

    // =========================================================================
    // Point lookups
    // =========================================================================

    /// The face of `body` containing `p`.
    pub fn find_face_at_point(&self, body: BodyId, p: &Point3) -> Option<FaceId> {
        self.body(body)?.find_face_at_point(p, &self.tolerance)
    }

    /// The edge of `body` containing `p`.
    pub fn find_edge_at_point(&self, body: BodyId, p: &Point3) -> Option<EdgeId> {
        self.body(body)?.find_edge_at_point(p, &self.tolerance)
    }

    // =========================================================================
    // Features
    // =========================================================================

    /// Hole features in creation order.
    pub fn holes(&self) -> &[HoleFeature] {
        &self.holes
    }

    /// Cut a hole. Centers are projected onto the sketch plane.
    pub fn create_hole(&mut self, request: HoleRequest) -> Result<HoleId, KernelError> {
        let brep = self.body(request.body).ok_or(KernelError::UnknownBody)?;
        let topo = &brep.topology;

        if !(request.diameter.is_finite() && request.diameter > 0.0) {
            return Err(KernelError::InvalidHole(format!(
                "diameter must be positive, got {}",
                request.diameter
            )));
        }
        if !(request.tip_angle > 0.0 && request.tip_angle <= FLAT_TIP_ANGLE) {
            return Err(KernelError::InvalidHole(format!(
                "tip angle {} outside (0, pi]",
                request.tip_angle
            )));
        }

        let plane_face = request.position.plane_face();
        if !topo.faces.contains_key(plane_face) {
            return Err(KernelError::MissingEntity("sketch face"));
        }
        let plane = brep.face_plane(plane_face).ok_or(KernelError::NonPlanarFace)?;

        match &request.position {
            HolePosition::ByOffsets {
                edge_a,
                edge_b,
                offset_a,
                offset_b,
                ..
            } => {
                if !topo.edges.contains_key(*edge_a) || !topo.edges.contains_key(*edge_b) {
                    return Err(KernelError::MissingEntity("dimension edge"));
                }
                if *offset_a < 0.0 || *offset_b < 0.0 {
                    return Err(KernelError::InvalidHole("negative edge offset".into()));
                }
            }
            HolePosition::AtPoints { points, .. } => {
                if points.is_empty() {
                    return Err(KernelError::InvalidHole("no hole centers".into()));
                }
            }
        }

        match request.extent {
            HoleExtent::Distance(d) if !(d.is_finite() && d > 0.0) => {
                return Err(KernelError::InvalidHole(format!(
                    "depth must be positive, got {d}"
                )));
            }
            HoleExtent::ToVertex(v) if !topo.vertices.contains_key(v) => {
                return Err(KernelError::MissingEntity("extent vertex"));
            }
            _ => {}
        }

        let centers: Vec<Point3> = request
            .position
            .centers()
            .iter()
            .map(|c| plane.closest_point(c))
            .collect();

        let id = HoleId(self.holes.len());
        let generation = self.bump();
        debug!(
            hole = id.0,
            centers = centers.len(),
            diameter = request.diameter,
            generation,
            "created hole"
        );
        self.holes.push(HoleFeature {
            id,
            request,
            centers,
            generation,
        });
        Ok(id)
    }
}
