//! Top-face location and translation between parallel faces.

use dogbone_kernel_geom::{Line3, Plane};
use dogbone_kernel_math::{Point3, Tolerance, Vec3};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::FaceId;
use tracing::debug;

use crate::error::{DogboneError, Result};

/// First vertex of a planar face and its outward normal.
fn face_anchor(body: &BRepSolid, face: FaceId) -> Result<(Point3, Vec3)> {
    let normal = body.face_normal(face).ok_or_else(|| {
        DogboneError::GeometryPrecondition("face is not planar".into())
    })?;
    let first = body
        .topology
        .face_vertices(face)
        .first()
        .and_then(|&v| body.vertex_point(v))
        .ok_or_else(|| DogboneError::Topology("face has no vertices".into()))?;
    Ok((first, normal))
}

/// Where the line through `anchor` along `normal` meets the plane of `face`,
/// taken through the face's first vertex.
fn hit_face_plane(
    body: &BRepSolid,
    face: FaceId,
    line: &Line3,
    normal: &Vec3,
) -> Result<Option<Point3>> {
    let (first, _) = face_anchor(body, face)?;
    Ok(Plane::from_normal(first, *normal).intersect_with_line(line))
}

/// The face of the body furthest along `reference_face`'s outward normal,
/// and a point inside it.
///
/// Only planar faces parallel to the reference are considered. Distances
/// are measured on the line through the reference face's first vertex.
/// Ties keep the first face in body order.
pub fn find_top_face(
    body: &BRepSolid,
    reference_face: FaceId,
    tol: &Tolerance,
) -> Result<(FaceId, Point3)> {
    let (origin, normal) = face_anchor(body, reference_face)?;
    let line = Line3::new(origin, normal).ok_or_else(|| {
        DogboneError::GeometryPrecondition("reference face has no normal".into())
    })?;

    let mut best: Option<(FaceId, f64)> = None;
    for face in body.faces() {
        let Some(n) = body.face_normal(face) else {
            continue;
        };
        if !tol.is_parallel(&normal, &n) {
            continue;
        }
        let Some(hit) = hit_face_plane(body, face, &line, &normal)? else {
            continue;
        };
        let distance = (hit - origin).dot(&normal);
        match best {
            Some((_, d)) if distance <= d + tol.linear => {}
            _ => best = Some((face, distance)),
        }
    }

    // The reference face is always parallel to itself.
    let (top, distance) = best.ok_or_else(|| {
        DogboneError::GeometryPrecondition("no parallel face found".into())
    })?;
    let point = body
        .point_on_face(top)
        .ok_or_else(|| DogboneError::Topology("top face has no boundary".into()))?;
    debug!(?top, distance, "located top face");
    Ok((top, point))
}

/// Translation carrying the plane of `from` onto the plane of `to`, along
/// `from`'s normal.
pub fn translate_vector_between_faces(
    body: &BRepSolid,
    from: FaceId,
    to: FaceId,
    tol: &Tolerance,
) -> Result<Vec3> {
    let (origin, normal) = face_anchor(body, from)?;
    let (_, to_normal) = face_anchor(body, to)?;
    if !tol.is_parallel(&normal, &to_normal) {
        return Err(DogboneError::GeometryPrecondition(
            "faces are not parallel".into(),
        ));
    }
    let line = Line3::new(origin, normal).ok_or_else(|| {
        DogboneError::GeometryPrecondition("face has no normal".into())
    })?;
    let hit = hit_face_plane(body, to, &line, &normal)?.ok_or_else(|| {
        DogboneError::GeometryPrecondition("faces are not parallel".into())
    })?;
    Ok(hit - origin)
}
