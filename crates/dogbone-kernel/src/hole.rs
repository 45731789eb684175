//! Hole feature requests: what the document is asked to cut.

use std::f64::consts::PI;

use dogbone_kernel_math::Point3;
use dogbone_kernel_topo::{EdgeId, FaceId, VertexId};

use crate::BodyId;

/// Flat-bottomed drill point: the tip angle of an end mill plunge.
pub const FLAT_TIP_ANGLE: f64 = PI;

/// Where the hole centers sit on the sketch plane.
#[derive(Debug, Clone, PartialEq)]
pub enum HolePosition {
    /// One center dimensioned from two reference edges.
    ///
    /// `center` is the intended position; the offsets are its perpendicular
    /// distances to `edge_a` and `edge_b`.
    ByOffsets {
        /// Planar face carrying the hole sketch.
        plane_face: FaceId,
        /// Intended center.
        center: Point3,
        /// First dimensioning edge.
        edge_a: EdgeId,
        /// Second dimensioning edge.
        edge_b: EdgeId,
        /// Distance from the center to `edge_a`'s line.
        offset_a: f64,
        /// Distance from the center to `edge_b`'s line.
        offset_b: f64,
    },
    /// Several centers sharing one depth.
    AtPoints {
        /// Planar face carrying the hole sketch.
        plane_face: FaceId,
        /// Centers.
        points: Vec<Point3>,
    },
}

impl HolePosition {
    /// The face whose plane the hole is sketched on.
    pub fn plane_face(&self) -> FaceId {
        match self {
            HolePosition::ByOffsets { plane_face, .. } | HolePosition::AtPoints { plane_face, .. } => {
                *plane_face
            }
        }
    }

    /// The requested centers.
    pub fn centers(&self) -> Vec<Point3> {
        match self {
            HolePosition::ByOffsets { center, .. } => vec![*center],
            HolePosition::AtPoints { points, .. } => points.clone(),
        }
    }
}

/// How deep the hole cuts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoleExtent {
    /// Fixed depth in mm, measured against the plane normal.
    Distance(f64),
    /// Cut until the plane through this vertex.
    ToVertex(VertexId),
}

/// A request to cut a simple round hole into a body.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleRequest {
    /// Target body.
    pub body: BodyId,
    /// Hole diameter (mm).
    pub diameter: f64,
    /// Tip angle in radians; [`FLAT_TIP_ANGLE`] for a flat bottom.
    pub tip_angle: f64,
    /// Center placement.
    pub position: HolePosition,
    /// Depth.
    pub extent: HoleExtent,
}

/// Identifier of a created hole feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoleId(pub usize);

/// A hole feature recorded in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleFeature {
    /// Feature id (creation index).
    pub id: HoleId,
    /// The request as accepted.
    pub request: HoleRequest,
    /// Centers projected onto the sketch plane.
    pub centers: Vec<Point3>,
    /// Document generation after the feature was added.
    pub generation: u64,
}
