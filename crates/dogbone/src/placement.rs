//! Placement of the tool circle in a corner.

use dogbone_kernel_geom::{Line3, Plane};
use dogbone_kernel_math::{Point3, Vec3};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};

use crate::corner::Corner;
use crate::error::{DogboneError, Result};

/// Shape of the relief cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogboneStyle {
    /// Circle on the corner bisector, passing through the corner.
    #[default]
    Normal,
    /// Like `Normal`, pushed further out by a percentage of the radius.
    Minimal,
    /// Circle running along one corner edge, for mortise-and-tenon joints.
    Mortise,
}

/// Which corner edge a mortise dogbone runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MortiseSide {
    /// The longer of the two corner edges.
    #[default]
    Long,
    /// The shorter of the two corner edges.
    Short,
}

/// Tool and style inputs for one placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Relief style.
    pub style: DogboneStyle,
    /// Edge to align with for [`DogboneStyle::Mortise`].
    pub mortise_side: MortiseSide,
    /// Cutter radius (mm).
    pub tool_radius: f64,
    /// Extra distance for [`DogboneStyle::Minimal`], in percent of the radius.
    pub minimal_percentage: f64,
}

impl PlacementParams {
    /// Distance from the corner to the circle center.
    pub fn effective_distance(&self) -> f64 {
        match self.style {
            DogboneStyle::Minimal => self.tool_radius * (1.0 + self.minimal_percentage / 100.0),
            DogboneStyle::Normal | DogboneStyle::Mortise => self.tool_radius,
        }
    }

    /// Reject parameters that cannot place a circle.
    pub fn validate(&self) -> Result<()> {
        let d = self.effective_distance();
        if !d.is_finite() || d <= 0.0 {
            return Err(DogboneError::Configuration(format!(
                "effective distance must be positive, got {d}"
            )));
        }
        Ok(())
    }
}

/// Where the circle goes and how far it sits from each corner edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    /// Circle center.
    pub center_point: Point3,
    /// Perpendicular distance from the center to `edge_a`'s line.
    pub edge_a_clearance: f64,
    /// Perpendicular distance from the center to `edge_b`'s line.
    pub edge_b_clearance: f64,
}

/// Vector along `edge` pointing away from `from`, whichever way the edge
/// is stored. `None` if `from` is not an endpoint.
pub fn corrected_edge_vector(body: &BRepSolid, edge: EdgeId, from: VertexId) -> Option<Vec3> {
    let (start, end) = body.topology.edge_vertices(edge)?;
    let (p, q) = (body.vertex_point(start)?, body.vertex_point(end)?);
    if start == from {
        Some(q - p)
    } else if end == from {
        Some(p - q)
    } else {
        None
    }
}

fn edge_line(body: &BRepSolid, edge: EdgeId) -> Option<Line3> {
    let (a, b) = body.topology.edge_vertices(edge)?;
    Line3::through(body.vertex_point(a)?, body.vertex_point(b)?)
}

/// Position the tool circle in `corner`.
pub fn compute_placement(
    body: &BRepSolid,
    corner: &Corner,
    params: &PlacementParams,
) -> Result<PlacementResult> {
    params.validate()?;
    let distance = params.effective_distance();
    let corner_point = body
        .vertex_point(corner.corner_vertex)
        .ok_or_else(|| DogboneError::InvalidHandle("corner vertex is gone".into()))?;

    match params.style {
        DogboneStyle::Normal | DogboneStyle::Minimal => {
            let normal = |face| {
                body.face_normal(face).ok_or_else(|| {
                    DogboneError::GeometryPrecondition("corner face is not planar".into())
                })
            };
            let sum = normal(corner.face_a)?.normalize() + normal(corner.face_b)?.normalize();
            if sum.norm() < 1e-9 {
                return Err(DogboneError::GeometryPrecondition(
                    "corner faces are opposed, bisector is undefined".into(),
                ));
            }
            let center_point = corner_point + sum.normalize() * distance;

            let clearance = |edge| {
                edge_line(body, edge)
                    .map(|l| l.distance_to(&center_point))
                    .ok_or_else(|| DogboneError::Topology("degenerate corner edge".into()))
            };
            Ok(PlacementResult {
                center_point,
                edge_a_clearance: clearance(corner.edge_a)?,
                edge_b_clearance: clearance(corner.edge_b)?,
            })
        }
        DogboneStyle::Mortise => {
            let along = |edge| {
                corrected_edge_vector(body, edge, corner.corner_vertex)
                    .filter(|v| v.norm() > 1e-12)
                    .ok_or_else(|| DogboneError::Topology("degenerate corner edge".into()))
            };
            let dir_a = along(corner.edge_a)?;
            let dir_b = along(corner.edge_b)?;

            // Strict comparison: equal lengths go to edge_b for Long and
            // edge_a for Short.
            let a_is_longer = dir_a.norm() > dir_b.norm();
            let align_a = match params.mortise_side {
                MortiseSide::Long => a_is_longer,
                MortiseSide::Short => !a_is_longer,
            };
            let (dir, edge_a_clearance, edge_b_clearance) = if align_a {
                (dir_a, 0.0, distance)
            } else {
                (dir_b, distance, 0.0)
            };
            Ok(PlacementResult {
                center_point: corner_point + dir.normalize() * distance,
                edge_a_clearance,
                edge_b_clearance,
            })
        }
    }
}

/// Rebuild a center from its distances to two corner edges.
///
/// Both edge directions are projected into `plane` and must point away from
/// `corner`; the center lies in the wedge they span. `None` for parallel
/// edges.
pub fn center_from_offsets(
    plane: &Plane,
    corner: &Point3,
    dir_a: &Vec3,
    dir_b: &Vec3,
    offset_a: f64,
    offset_b: f64,
) -> Option<Point3> {
    let n = plane.normal_dir.as_ref();
    let u_a = (dir_a - n * dir_a.dot(n)).try_normalize(1e-12)?;
    let u_b = (dir_b - n * dir_b.dot(n)).try_normalize(1e-12)?;
    let sin = u_a.cross(&u_b).norm();
    if sin < 1e-9 {
        return None;
    }
    // Moving along u_b changes the distance to line a by sin per unit.
    let origin = plane.closest_point(corner);
    Some(origin + u_a * (offset_b / sin) + u_b * (offset_a / sin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corner::resolve_corner;
    use dogbone_kernel_math::Tolerance;
    use dogbone_kernel_primitives::make_prism;

    /// Mortise slot corner: edge_a is 10 long, edge_b 4 long.
    fn slot_corner() -> (BRepSolid, Corner) {
        let profile = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(14.0, 0.0, 0.0),
            Point3::new(14.0, 4.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 8.0, 0.0),
            Point3::new(0.0, 8.0, 0.0),
        ];
        let body = make_prism(&profile, Vec3::new(0.0, 0.0, 6.0)).unwrap();
        let top = body.faces()[7];
        let edge = body
            .find_edge_at_point(&Point3::new(4.0, 4.0, 3.0), &Tolerance::DEFAULT)
            .unwrap();
        let corner = resolve_corner(&body, top, edge).unwrap();
        (body, corner)
    }

    fn params(style: DogboneStyle) -> PlacementParams {
        PlacementParams {
            style,
            mortise_side: MortiseSide::Long,
            tool_radius: 3.0,
            minimal_percentage: 10.0,
        }
    }

    #[test]
    fn test_effective_distance() {
        assert!((params(DogboneStyle::Normal).effective_distance() - 3.0).abs() < 1e-12);
        assert!((params(DogboneStyle::Minimal).effective_distance() - 3.3).abs() < 1e-12);
        assert!((params(DogboneStyle::Mortise).effective_distance() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let mut p = params(DogboneStyle::Normal);
        p.tool_radius = 0.0;
        assert!(matches!(p.validate(), Err(DogboneError::Configuration(_))));
        let (body, corner) = slot_corner();
        assert!(matches!(
            compute_placement(&body, &corner, &p),
            Err(DogboneError::Configuration(_))
        ));
    }

    #[test]
    fn test_normal_on_bisector() {
        let (body, corner) = slot_corner();
        let r = compute_placement(&body, &corner, &params(DogboneStyle::Normal)).unwrap();
        let s = 3.0 / 2f64.sqrt();
        assert!((r.center_point - Point3::new(4.0 + s, 4.0 + s, 6.0)).norm() < 1e-9);
        assert!((r.edge_a_clearance - s).abs() < 1e-9);
        assert!((r.edge_b_clearance - s).abs() < 1e-9);
    }

    #[test]
    fn test_corrected_edge_vector_points_away() {
        let (body, corner) = slot_corner();
        let v = corrected_edge_vector(&body, corner.edge_a, corner.corner_vertex).unwrap();
        assert!((v - Vec3::new(10.0, 0.0, 0.0)).norm() < 1e-12);
        let w = corrected_edge_vector(&body, corner.edge_b, corner.corner_vertex).unwrap();
        assert!((w - Vec3::new(0.0, 4.0, 0.0)).norm() < 1e-12);
        assert!(corrected_edge_vector(&body, corner.edge_a, corner.far_vertex(&body).unwrap())
            .is_none());
    }

    #[test]
    fn test_mortise_center_on_edge() {
        let (body, corner) = slot_corner();
        let r = compute_placement(&body, &corner, &params(DogboneStyle::Mortise)).unwrap();
        assert!((r.center_point - Point3::new(7.0, 4.0, 6.0)).norm() < 1e-9);
    }

    #[test]
    fn test_mortise_side_flips_clearances() {
        let (body, corner) = slot_corner();
        let mut p = params(DogboneStyle::Mortise);
        let long = compute_placement(&body, &corner, &p).unwrap();
        assert_eq!(long.edge_a_clearance, 0.0);
        assert!((long.edge_b_clearance - 3.0).abs() < 1e-12);

        p.mortise_side = MortiseSide::Short;
        let short = compute_placement(&body, &corner, &p).unwrap();
        assert!((short.edge_a_clearance - 3.0).abs() < 1e-12);
        assert_eq!(short.edge_b_clearance, 0.0);
        assert!((short.center_point - Point3::new(4.0, 7.0, 6.0)).norm() < 1e-9);
    }

    #[test]
    fn test_minimal_at_zero_percent_is_normal() {
        let (body, corner) = slot_corner();
        let mut minimal = params(DogboneStyle::Minimal);
        minimal.minimal_percentage = 0.0;
        let a = compute_placement(&body, &corner, &minimal).unwrap();
        let b = compute_placement(&body, &corner, &params(DogboneStyle::Normal)).unwrap();
        assert!((a.center_point - b.center_point).norm() < 1e-12);
        assert!((a.edge_a_clearance - b.edge_a_clearance).abs() < 1e-12);
    }

    #[test]
    fn test_mortise_equal_edges() {
        // Square notch: both corner edges are 6 long.
        let profile = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let body = make_prism(&profile, Vec3::new(0.0, 0.0, 6.0)).unwrap();
        let edge = body
            .find_edge_at_point(&Point3::new(4.0, 4.0, 3.0), &Tolerance::DEFAULT)
            .unwrap();
        let corner = resolve_corner(&body, body.faces()[7], edge).unwrap();
        let corner_point = body.vertex_point(corner.corner_vertex).unwrap();
        let dir_a = corrected_edge_vector(&body, corner.edge_a, corner.corner_vertex).unwrap();
        let dir_b = corrected_edge_vector(&body, corner.edge_b, corner.corner_vertex).unwrap();
        assert_eq!(dir_a.norm(), dir_b.norm());

        // Neither edge is strictly longer: Long runs along edge_b.
        let mut p = params(DogboneStyle::Mortise);
        let long = compute_placement(&body, &corner, &p).unwrap();
        assert_eq!(long.edge_b_clearance, 0.0);
        assert!((long.edge_a_clearance - 3.0).abs() < 1e-12);
        assert!((long.center_point - (corner_point + dir_b.normalize() * 3.0)).norm() < 1e-9);

        // ...and Short along edge_a.
        p.mortise_side = MortiseSide::Short;
        let short = compute_placement(&body, &corner, &p).unwrap();
        assert_eq!(short.edge_a_clearance, 0.0);
        assert!((short.edge_b_clearance - 3.0).abs() < 1e-12);
        assert!((short.center_point - (corner_point + dir_a.normalize() * 3.0)).norm() < 1e-9);
    }

    #[test]
    fn test_normal_in_sixty_degree_notch() {
        // V-shaped notch with a 60 degree opening, apex at (10, apex_y).
        let apex_y = 10.0 - 5.0 * 3f64.sqrt();
        let profile = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(20.0, 0.0, 0.0),
            Point3::new(20.0, 10.0, 0.0),
            Point3::new(15.0, 10.0, 0.0),
            Point3::new(10.0, apex_y, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let body = make_prism(&profile, Vec3::new(0.0, 0.0, 6.0)).unwrap();
        let top = body.faces()[8];
        let edge = body
            .find_edge_at_point(&Point3::new(10.0, apex_y, 3.0), &Tolerance::DEFAULT)
            .unwrap();
        let deg = crate::dihedral::angle_between_faces(&body, edge)
            .degrees()
            .unwrap();
        assert!((deg - 60.0).abs() < 1e-9, "got {deg}");

        let corner = resolve_corner(&body, top, edge).unwrap();
        let corner_point = body.vertex_point(corner.corner_vertex).unwrap();
        let r = compute_placement(&body, &corner, &params(DogboneStyle::Normal)).unwrap();

        // The circle passes through the corner, on the bisector.
        assert!(((r.center_point - corner_point).norm() - 3.0).abs() < 1e-9);
        assert!((r.center_point - Point3::new(10.0, apex_y + 3.0, 6.0)).norm() < 1e-9);
        // Clearances are the true distances to the edge lines: 3 sin 30.
        assert!((r.edge_a_clearance - 1.5).abs() < 1e-9);
        assert!((r.edge_b_clearance - 1.5).abs() < 1e-9);

        let dir_a = corrected_edge_vector(&body, corner.edge_a, corner.corner_vertex).unwrap();
        let dir_b = corrected_edge_vector(&body, corner.edge_b, corner.corner_vertex).unwrap();
        let rebuilt = center_from_offsets(
            &body.face_plane(top).unwrap(),
            &corner_point,
            &dir_a,
            &dir_b,
            r.edge_a_clearance,
            r.edge_b_clearance,
        )
        .unwrap();
        assert!((rebuilt - r.center_point).norm() < 1e-6);
    }

    #[test]
    fn test_offsets_reproduce_center() {
        let (body, corner) = slot_corner();
        let plane = body.face_plane(corner.face).unwrap();
        let corner_point = body.vertex_point(corner.corner_vertex).unwrap();
        let dir_a = corrected_edge_vector(&body, corner.edge_a, corner.corner_vertex).unwrap();
        let dir_b = corrected_edge_vector(&body, corner.edge_b, corner.corner_vertex).unwrap();
        for style in [DogboneStyle::Normal, DogboneStyle::Minimal, DogboneStyle::Mortise] {
            let r = compute_placement(&body, &corner, &params(style)).unwrap();
            let rebuilt = center_from_offsets(
                &plane,
                &corner_point,
                &dir_a,
                &dir_b,
                r.edge_a_clearance,
                r.edge_b_clearance,
            )
            .unwrap();
            assert!((rebuilt - r.center_point).norm() < 1e-6, "{style:?}");
        }
    }

    #[test]
    fn test_parallel_edges_have_no_offset_center() {
        let plane = Plane::xy();
        assert!(center_from_offsets(
            &plane,
            &Point3::origin(),
            &Vec3::x(),
            &Vec3::new(-2.0, 0.0, 0.0),
            1.0,
            1.0
        )
        .is_none());
    }
}
