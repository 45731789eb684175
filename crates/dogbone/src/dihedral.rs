//! Dihedral angle classification of edges.
//!
//! The angle is measured through the material: a convex outer edge of a box
//! reads 270°, the concave inner edge of a right-angled notch reads 90°.
//! Dogbones belong on the concave edges.

use std::f64::consts::PI;

use dogbone_kernel_math::{angle_to, rad_to_deg};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId};
use serde::{Deserialize, Serialize};

/// Dihedral angle of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DihedralAngle {
    /// Angle in radians, in `[0, 2π]`, between two planar faces.
    Planar(f64),
    /// One of the faces is curved, or the edge has fewer than two faces.
    NotApplicable,
}

impl DihedralAngle {
    /// The angle in radians, if defined.
    pub fn radians(&self) -> Option<f64> {
        match self {
            DihedralAngle::Planar(a) => Some(*a),
            DihedralAngle::NotApplicable => None,
        }
    }

    /// The angle in degrees, if defined.
    pub fn degrees(&self) -> Option<f64> {
        self.radians().map(rad_to_deg)
    }
}

/// Dihedral angle between the two faces meeting at `edge`.
///
/// Face 1 is the face of the edge's primary half-edge. The edge runs the way
/// its co-edge does in face 1's loop. Looking down that direction with face 1
/// on the left, `n2 × n1` points along the co-edge for a concave edge and
/// against it for a convex one.
pub fn angle_between_faces(body: &BRepSolid, edge: EdgeId) -> DihedralAngle {
    let topo = &body.topology;
    let faces = topo.edge_faces(edge);
    let (face1, face2) = match faces.as_slice() {
        [a, b] if a != b => (*a, *b),
        _ => return DihedralAngle::NotApplicable,
    };
    let (Some(n1), Some(n2)) = (body.face_normal(face1), body.face_normal(face2)) else {
        return DihedralAngle::NotApplicable;
    };
    let Some(normal_angle) = angle_to(&n1, &n2) else {
        return DihedralAngle::NotApplicable;
    };

    let Some(coedge) = topo.coedge_in_face(edge, face1) else {
        return DihedralAngle::NotApplicable;
    };
    let (Some(from), Some(to)) = (
        body.vertex_point(topo.half_edges[coedge].origin),
        body.vertex_point(topo.half_edge_dest(coedge)),
    ) else {
        return DihedralAngle::NotApplicable;
    };
    let running = to - from;
    let cross = n2.cross(&n1);

    // Coplanar faces (or a degenerate edge) leave no turning direction: flat.
    let convex = match angle_to(&running, &cross) {
        Some(a) => a > PI / 2.0,
        None => return DihedralAngle::Planar(PI - normal_angle),
    };
    if convex {
        DihedralAngle::Planar(2.0 * PI - (PI - normal_angle))
    } else {
        DihedralAngle::Planar(PI - normal_angle)
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// What to do with corners whose angle is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonPlanarPolicy {
    /// Keep the corner.
    Include,
    /// Drop the corner.
    #[default]
    Exclude,
}

/// Angle window deciding which corners get a dogbone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleFilter {
    /// Use the user window below instead of the default right-angle window.
    pub enabled: bool,
    /// Lower bound (degrees, exclusive).
    pub min_angle: f64,
    /// Upper bound (degrees, exclusive).
    pub max_angle: f64,
    /// Also accept angles at or below `min_angle`.
    pub acute: bool,
    /// Also accept angles at or above `max_angle`.
    pub obtuse: bool,
    /// Handling of curved faces and boundary edges.
    pub non_planar_policy: NonPlanarPolicy,
}

impl AngleFilter {
    /// Default lower bound of the right-angle window (degrees).
    pub const DEFAULT_MIN_ANGLE: f64 = 89.0;
    /// Default upper bound of the right-angle window (degrees).
    pub const DEFAULT_MAX_ANGLE: f64 = 91.0;

    /// Whether a corner with this dihedral angle is eligible.
    ///
    /// A disabled filter still only admits right-angled concave corners,
    /// using the default window with no acute/obtuse extension.
    pub fn accepts(&self, angle: DihedralAngle) -> bool {
        let Some(deg) = angle.degrees() else {
            return self.non_planar_policy == NonPlanarPolicy::Include;
        };
        if !self.enabled {
            return deg > Self::DEFAULT_MIN_ANGLE && deg < Self::DEFAULT_MAX_ANGLE;
        }
        (deg > self.min_angle && deg < self.max_angle)
            || (self.acute && deg <= self.min_angle)
            || (self.obtuse && deg >= self.max_angle)
    }
}

impl Default for AngleFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            min_angle: Self::DEFAULT_MIN_ANGLE,
            max_angle: Self::DEFAULT_MAX_ANGLE,
            acute: false,
            obtuse: false,
            non_planar_policy: NonPlanarPolicy::Exclude,
        }
    }
}

/// Edges that drop from `face`: they touch one of its vertices without
/// bounding it, and pass `filter`.
///
/// Returned in the face's vertex (loop) order.
pub fn candidate_edges(body: &BRepSolid, face: FaceId, filter: &AngleFilter) -> Vec<EdgeId> {
    let topo = &body.topology;
    let boundary = topo.face_edges(face);
    let mut out = Vec::new();
    for vertex in topo.face_vertices(face) {
        for edge in topo.vertex_edges(vertex) {
            if boundary.contains(&edge) || out.contains(&edge) {
                continue;
            }
            if filter.accepts(angle_between_faces(body, edge)) {
                out.push(edge);
            }
        }
    }
    out
}
