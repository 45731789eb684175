//! Straight prisms extruded from planar profiles.

use dogbone_kernel_geom::{GeometryStore, Plane};
use dogbone_kernel_math::{Point3, Vec3};
use dogbone_kernel_topo::{FaceId, HalfEdgeId, Orientation, Topology, VertexId};
use thiserror::Error;

use crate::{pair_twins, BRepSolid};

/// Errors from planar solid construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrismError {
    /// A profile has fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Two consecutive profile points coincide.
    #[error("degenerate profile edge at index {0}")]
    DegenerateEdge(usize),

    /// The profile has no well-defined normal (collinear or empty area).
    #[error("profile has zero area")]
    DegenerateProfile,

    /// Extrusion direction has zero length.
    #[error("extrusion direction is zero")]
    ZeroExtrusion,

    /// Extrusion direction lies in the profile plane.
    #[error("extrusion direction lies in the profile plane")]
    ExtrusionInProfilePlane,
}

/// Newell's method: area-weighted normal of a polygon, not normalized.
///
/// Robust for non-convex polygons; the result points along the side from
/// which the vertices appear counter-clockwise.
pub(crate) fn newell_normal(points: &[Point3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::zeros();
    for i in 0..n {
        let cur = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    normal
}

/// Plane through `points[0]` whose normal is `normal` and whose u axis runs
/// along the first polygon side.
fn polygon_plane(points: &[Point3], normal: &Vec3) -> Plane {
    let x_dir = points[1] - points[0];
    Plane::new(points[0], x_dir, normal.cross(&x_dir))
}

/// Add one planar face with the given boundary, recording its half-edges.
fn add_planar_face(
    topo: &mut Topology,
    geom: &mut GeometryStore,
    verts: &[VertexId],
    normal: &Vec3,
    he_log: &mut Vec<(VertexId, VertexId, HalfEdgeId)>,
) -> FaceId {
    let points: Vec<Point3> = verts.iter().map(|&v| topo.vertices[v].point).collect();
    let surf_idx = geom.add_surface(Box::new(polygon_plane(&points, normal)));

    let hes: Vec<HalfEdgeId> = verts.iter().map(|&v| topo.add_half_edge(v)).collect();
    let n = verts.len();
    for (i, &he) in hes.iter().enumerate() {
        he_log.push((verts[i], verts[(i + 1) % n], he));
    }
    let loop_id = topo.add_loop(&hes);
    topo.add_face(loop_id, surf_idx, Orientation::Forward)
}

/// Extrude a closed planar polygon along `direction` into a prism.
///
/// The profile may wind either way; it is reoriented so that lateral faces
/// point outward. Faces are created in the order: one lateral face per
/// profile side (side `i` runs from point `i` to point `i + 1`), then the
/// bottom cap, then the top cap.
///
/// # Errors
///
/// Fails on fewer than three points, coincident consecutive points, a
/// zero-area profile, or a direction that is zero or in the profile plane.
pub fn make_prism(profile: &[Point3], direction: Vec3) -> Result<BRepSolid, PrismError> {
    let n = profile.len();
    if n < 3 {
        return Err(PrismError::TooFewVertices(n));
    }
    if direction.norm() < 1e-12 {
        return Err(PrismError::ZeroExtrusion);
    }
    if let Some(i) = (0..n).find(|&i| (profile[(i + 1) % n] - profile[i]).norm() < 1e-12) {
        return Err(PrismError::DegenerateEdge(i));
    }
    let normal = newell_normal(profile);
    if normal.norm() < 1e-12 {
        return Err(PrismError::DegenerateProfile);
    }
    let along = normal.normalize().dot(&direction.normalize());
    if along.abs() < 1e-9 {
        return Err(PrismError::ExtrusionInProfilePlane);
    }

    // Walk the profile counter-clockwise as seen from the extrusion side.
    let ordered: Vec<Point3> = if along > 0.0 {
        profile.to_vec()
    } else {
        profile.iter().rev().copied().collect()
    };
    let cap_normal = if along > 0.0 { normal } else { -normal };

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let bottom: Vec<VertexId> = ordered.iter().map(|&p| topo.add_vertex(p)).collect();
    let top: Vec<VertexId> = ordered
        .iter()
        .map(|&p| topo.add_vertex(p + direction))
        .collect();

    let mut he_log = Vec::with_capacity(6 * n);
    let mut all_faces = Vec::with_capacity(n + 2);

    // Lateral winding bot[i] -> bot[i+1] -> top[i+1] -> top[i] gives an
    // outward normal of side × direction.
    for i in 0..n {
        let next = (i + 1) % n;
        let quad = [bottom[i], bottom[next], top[next], top[i]];
        let side = ordered[next] - ordered[i];
        let lateral_normal = side.cross(&direction);
        all_faces.push(add_planar_face(
            &mut topo,
            &mut geom,
            &quad,
            &lateral_normal,
            &mut he_log,
        ));
    }

    // Bottom cap faces against the extrusion, so its loop is reversed.
    let bottom_rev: Vec<VertexId> = bottom.iter().rev().copied().collect();
    all_faces.push(add_planar_face(
        &mut topo,
        &mut geom,
        &bottom_rev,
        &-cap_normal,
        &mut he_log,
    ));
    all_faces.push(add_planar_face(
        &mut topo,
        &mut geom,
        &top,
        &cap_normal,
        &mut he_log,
    ));

    pair_twins(&mut topo, &he_log);

    let shell = topo.add_shell(all_faces);
    let solid_id = topo.add_solid(shell);

    Ok(BRepSolid {
        topology: topo,
        geometry: geom,
        solid_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dogbone_kernel_math::Tolerance;

    fn l_profile() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ]
    }

    #[test]
    fn test_prism_counts() {
        let solid = make_prism(&l_profile(), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(solid.topology.faces.len(), 8);
        assert_eq!(solid.topology.vertices.len(), 12);
        assert_eq!(solid.topology.edges.len(), 18);
        assert!(solid.topology.half_edges.values().all(|h| h.twin.is_some()));
    }

    #[test]
    fn test_prism_normals_outward() {
        let solid = make_prism(&l_profile(), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let faces = solid.faces();
        // Side 2 runs (10,4) -> (4,4): the step face looks along +Y.
        assert!((solid.face_normal(faces[2]).unwrap() - Vec3::y()).norm() < 1e-12);
        // Side 3 runs (4,4) -> (4,10): looks along +X.
        assert!((solid.face_normal(faces[3]).unwrap() - Vec3::x()).norm() < 1e-12);
        assert!((solid.face_normal(faces[6]).unwrap() + Vec3::z()).norm() < 1e-12);
        assert!((solid.face_normal(faces[7]).unwrap() - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_prism_clockwise_profile_is_reoriented() {
        let mut profile = l_profile();
        profile.reverse();
        let solid = make_prism(&profile, Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let faces = solid.faces();
        assert!((solid.face_normal(faces[7]).unwrap() - Vec3::z()).norm() < 1e-12);
        let inside = Point3::new(2.0, 2.0, 2.5);
        for f in faces {
            assert!(solid.face_plane(f).unwrap().signed_distance(&inside) < 0.0);
        }
    }

    #[test]
    fn test_prism_faces_contain_their_sample_points() {
        let solid = make_prism(&l_profile(), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let tol = Tolerance::DEFAULT;
        for f in solid.faces() {
            let p = solid.point_on_face(f).unwrap();
            assert_eq!(solid.find_face_at_point(&p, &tol), Some(f));
        }
        // The notch of the L is not part of the top face.
        let top = solid.faces()[7];
        assert!(!solid.face_contains_point(top, &Point3::new(7.0, 7.0, 5.0), &tol));
        assert!(solid.face_contains_point(top, &Point3::new(2.0, 7.0, 5.0), &tol));
    }

    #[test]
    fn test_prism_errors() {
        let tri = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert_eq!(
            make_prism(&tri[..2], Vec3::z()).unwrap_err(),
            PrismError::TooFewVertices(2)
        );
        assert_eq!(
            make_prism(&tri, Vec3::zeros()).unwrap_err(),
            PrismError::ZeroExtrusion
        );
        assert_eq!(
            make_prism(&tri, Vec3::x()).unwrap_err(),
            PrismError::ExtrusionInProfilePlane
        );
        let dup = [tri[0], tri[0], tri[1], tri[2]];
        assert_eq!(
            make_prism(&dup, Vec3::z()).unwrap_err(),
            PrismError::DegenerateEdge(0)
        );
        let collinear = [tri[0], tri[1], Point3::new(2.0, 0.0, 0.0)];
        assert_eq!(
            make_prism(&collinear, Vec3::z()).unwrap_err(),
            PrismError::DegenerateProfile
        );
    }
}
