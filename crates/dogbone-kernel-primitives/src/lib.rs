#![warn(missing_docs)]

//! B-rep solid construction and geometric queries for the dogbone kernel.
//!
//! Constructs valid B-rep topology + geometry for the bodies corner relief
//! works on: boxes, straight prisms extruded from a polygon profile, and
//! cylinders (for non-planar faces). The
//! [`BRepSolid`] query methods evaluate face planes and normals and locate
//! faces/edges by a point in space.

mod prism;

pub use prism::{make_prism, PrismError};

use dogbone_kernel_geom::{CylinderSurface, GeometryStore, Line3, Plane, SurfaceKind};
use dogbone_kernel_math::{Point2, Point3, Tolerance, Vec3};
use dogbone_kernel_topo::{
    EdgeId, FaceId, HalfEdgeId, Orientation, SolidId, Topology, VertexId,
};
use std::collections::HashMap;

/// Result of constructing a B-rep primitive: topology + geometry.
#[derive(Debug, Clone)]
pub struct BRepSolid {
    /// The topological structure.
    pub topology: Topology,
    /// The geometric data (surfaces).
    pub geometry: GeometryStore,
    /// The solid entity.
    pub solid_id: SolidId,
}

impl BRepSolid {
    /// Faces of the solid in construction order.
    pub fn faces(&self) -> Vec<FaceId> {
        self.topology.solid_faces(self.solid_id)
    }

    /// Position of a vertex.
    pub fn vertex_point(&self, vertex: VertexId) -> Option<Point3> {
        self.topology.vertices.get(vertex).map(|v| v.point)
    }

    /// Kind of the surface carrying a face.
    pub fn surface_kind(&self, face: FaceId) -> Option<SurfaceKind> {
        let f = self.topology.faces.get(face)?;
        self.geometry
            .surfaces
            .get(f.surface_index)
            .map(|s| s.surface_type())
    }

    /// Whether a face lies on a plane.
    pub fn is_planar(&self, face: FaceId) -> bool {
        self.surface_kind(face) == Some(SurfaceKind::Plane)
    }

    /// The oriented plane of a planar face: its normal points out of the solid.
    pub fn face_plane(&self, face: FaceId) -> Option<Plane> {
        let f = self.topology.faces.get(face)?;
        let plane = self.geometry.plane(f.surface_index)?;
        Some(match f.orientation {
            Orientation::Forward => plane.clone(),
            Orientation::Reversed => plane.reversed(),
        })
    }

    /// Outward unit normal of a planar face.
    pub fn face_normal(&self, face: FaceId) -> Option<Vec3> {
        self.face_plane(face).map(|p| p.normal_dir.into_inner())
    }

    /// A point strictly inside a planar face.
    ///
    /// Taken just off the midpoint of the first boundary edge, on the
    /// interior side of the outer loop.
    pub fn point_on_face(&self, face: FaceId) -> Option<Point3> {
        let plane = self.face_plane(face)?;
        let outer = self.topology.faces.get(face)?.outer_loop;
        let he = self.topology.loop_half_edges(outer).next()?;
        let a = self.vertex_point(self.topology.half_edges[he].origin)?;
        let b = self.vertex_point(self.topology.half_edge_dest(he))?;
        let dir = b - a;
        let len = dir.norm();
        if len < 1e-12 {
            return Some(a);
        }
        let inward = plane.normal_dir.as_ref().cross(&(dir / len));
        Some(Point3::from((a.coords + b.coords) * 0.5) + inward * (len * 1e-3))
    }

    /// Whether `p` lies on a planar face, boundary included.
    pub fn face_contains_point(&self, face: FaceId, p: &Point3, tol: &Tolerance) -> bool {
        let Some(plane) = self.face_plane(face) else {
            return false;
        };
        if plane.signed_distance(p).abs() > tol.linear {
            return false;
        }
        if self
            .topology
            .face_edges(face)
            .into_iter()
            .any(|e| self.edge_contains_point(e, p, tol))
        {
            return true;
        }
        let Some(boundary) = self.topology.face_loop(face) else {
            return false;
        };
        let polygon: Vec<Point2> = self
            .topology
            .loop_vertices(boundary)
            .into_iter()
            .filter_map(|v| self.vertex_point(v))
            .map(|q| plane.project(&q))
            .collect();
        point_in_polygon(&plane.project(p), &polygon)
    }

    /// Whether `p` lies on the segment of an edge.
    pub fn edge_contains_point(&self, edge: EdgeId, p: &Point3, tol: &Tolerance) -> bool {
        let Some((a, b)) = self.topology.edge_vertices(edge) else {
            return false;
        };
        let (Some(a), Some(b)) = (self.vertex_point(a), self.vertex_point(b)) else {
            return false;
        };
        let Some(line) = Line3::through(a, b) else {
            return tol.points_equal(&a, p);
        };
        let t = (p - a).dot(line.direction.as_ref());
        let len = (b - a).norm();
        t >= -tol.linear && t <= len + tol.linear && line.distance_to(p) <= tol.linear
    }

    /// Midpoint of an edge's segment.
    pub fn edge_midpoint(&self, edge: EdgeId) -> Option<Point3> {
        let (a, b) = self.topology.edge_vertices(edge)?;
        let (a, b) = (self.vertex_point(a)?, self.vertex_point(b)?);
        Some(Point3::from((a.coords + b.coords) * 0.5))
    }

    /// First face of the solid containing `p`.
    pub fn find_face_at_point(&self, p: &Point3, tol: &Tolerance) -> Option<FaceId> {
        self.faces()
            .into_iter()
            .find(|&f| self.face_contains_point(f, p, tol))
    }

    /// First edge of the solid containing `p`.
    pub fn find_edge_at_point(&self, p: &Point3, tol: &Tolerance) -> Option<EdgeId> {
        self.topology
            .edges
            .keys()
            .find(|&e| self.edge_contains_point(e, p, tol))
    }
}

/// Even-odd point-in-polygon test in parameter space.
fn point_in_polygon(p: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Pair every half-edge with its reverse, in creation order.
///
/// `half_edges` lists `(origin, dest, id)` triples. Edges are created in the
/// order their first half-edge appears, so edge keys are deterministic.
pub(crate) fn pair_twins(topo: &mut Topology, half_edges: &[(VertexId, VertexId, HalfEdgeId)]) {
    let by_ends: HashMap<(VertexId, VertexId), HalfEdgeId> = half_edges
        .iter()
        .map(|&(from, to, he)| ((from, to), he))
        .collect();
    for &(from, to, he) in half_edges {
        if topo.half_edges[he].twin.is_some() {
            continue;
        }
        if let Some(&twin) = by_ends.get(&(to, from)) {
            if topo.half_edges[twin].twin.is_none() {
                topo.add_edge(he, twin);
            }
        }
    }
}

/// Build a B-rep box (cuboid) with corner at origin and dimensions `(sx, sy, sz)`.
///
/// The box has 6 planar faces, 12 edges, and 8 vertices.
/// Vertex layout (corner-aligned at origin):
/// ```text
///     v4----v5
///    /|    /|
///   v7----v6|    z
///   | v0--|-v1   | y
///   |/    |/     |/
///   v3----v2     +---x
/// ```
/// Faces are created in the order bottom, top, front (y=0), back, left
/// (x=0), right.
pub fn make_cube(sx: f64, sy: f64, sz: f64) -> BRepSolid {
    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let v0 = topo.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let v1 = topo.add_vertex(Point3::new(sx, 0.0, 0.0));
    let v2 = topo.add_vertex(Point3::new(sx, sy, 0.0));
    let v3 = topo.add_vertex(Point3::new(0.0, sy, 0.0));
    let v4 = topo.add_vertex(Point3::new(0.0, 0.0, sz));
    let v5 = topo.add_vertex(Point3::new(sx, 0.0, sz));
    let v6 = topo.add_vertex(Point3::new(sx, sy, sz));
    let v7 = topo.add_vertex(Point3::new(0.0, sy, sz));

    // Convention: outward normals, CCW vertex order when viewed from outside.
    // Plane normal = x_dir × y_dir, so x_dir/y_dir are chosen to produce outward normals.
    let face_defs: [([VertexId; 4], Point3, Vec3, Vec3); 6] = [
        // Bottom face (z=0): normal -Z = (0,1,0) × (1,0,0)
        (
            [v0, v3, v2, v1],
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ),
        // Top face (z=sz): normal +Z = (1,0,0) × (0,1,0)
        (
            [v4, v5, v6, v7],
            Point3::new(0.0, 0.0, sz),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ),
        // Front face (y=0): normal -Y = (1,0,0) × (0,0,1)
        (
            [v0, v1, v5, v4],
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ),
        // Back face (y=sy): normal +Y = (0,0,1) × (1,0,0)
        (
            [v2, v3, v7, v6],
            Point3::new(0.0, sy, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        ),
        // Left face (x=0): normal -X = (0,0,1) × (0,1,0)
        (
            [v0, v4, v7, v3],
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
        ),
        // Right face (x=sx): normal +X = (0,1,0) × (0,0,1)
        (
            [v1, v2, v6, v5],
            Point3::new(sx, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ),
    ];

    let mut all_faces = Vec::new();
    let mut all_hes = Vec::new();

    for (verts, plane_origin, x_dir, y_dir) in face_defs.iter() {
        let surface_idx = geom.add_surface(Box::new(Plane::new(*plane_origin, *x_dir, *y_dir)));

        let mut hes = Vec::new();
        for j in 0..4 {
            let he = topo.add_half_edge(verts[j]);
            hes.push(he);
            all_hes.push((verts[j], verts[(j + 1) % 4], he));
        }

        let loop_id = topo.add_loop(&hes);
        let face_id = topo.add_face(loop_id, surface_idx, Orientation::Forward);
        all_faces.push(face_id);
    }

    pair_twins(&mut topo, &all_hes);

    let shell = topo.add_shell(all_faces);
    let solid_id = topo.add_solid(shell);

    BRepSolid {
        topology: topo,
        geometry: geom,
        solid_id,
    }
}

/// Build a B-rep cylinder with the given radius and height, axis along Z.
///
/// The cylinder has:
/// - 1 cylindrical lateral face
/// - 2 planar cap faces (bottom and top, in that order after the lateral face)
/// - 2 circular edges (bottom and top) + 1 seam edge
pub fn make_cylinder(radius: f64, height: f64) -> BRepSolid {
    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    // Vertices: 2 points on the seam (u=0) at bottom and top
    let v_bot = topo.add_vertex(Point3::new(radius, 0.0, 0.0));
    let v_top = topo.add_vertex(Point3::new(radius, 0.0, height));

    let cyl_idx = geom.add_surface(Box::new(CylinderSurface::new(radius)));
    let bot_idx = geom.add_surface(Box::new(Plane::new(
        Point3::origin(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0), // Reversed Y so normal points -Z
    )));
    let top_idx = geom.add_surface(Box::new(Plane::new(
        Point3::new(0.0, 0.0, height),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )));

    // Lateral loop: bottom circle, seam up, top circle (reversed), seam down.
    let he_bot_lat = topo.add_half_edge(v_bot);
    let he_seam_up = topo.add_half_edge(v_bot);
    let he_top_lat = topo.add_half_edge(v_top);
    let he_seam_down = topo.add_half_edge(v_top);

    let lat_loop = topo.add_loop(&[he_bot_lat, he_seam_up, he_top_lat, he_seam_down]);
    let lat_face = topo.add_face(lat_loop, cyl_idx, Orientation::Forward);

    let he_bot_cap = topo.add_half_edge(v_bot);
    let bot_loop = topo.add_loop(&[he_bot_cap]);
    let bot_face = topo.add_face(bot_loop, bot_idx, Orientation::Forward);

    let he_top_cap = topo.add_half_edge(v_top);
    let top_loop = topo.add_loop(&[he_top_cap]);
    let top_face = topo.add_face(top_loop, top_idx, Orientation::Forward);

    topo.add_edge(he_bot_lat, he_bot_cap);
    topo.add_edge(he_top_lat, he_top_cap);
    topo.add_edge(he_seam_up, he_seam_down);

    let shell = topo.add_shell(vec![lat_face, bot_face, top_face]);
    let solid_id = topo.add_solid(shell);

    BRepSolid {
        topology: topo,
        geometry: geom,
        solid_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_topology() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let topo = &brep.topology;
        assert_eq!(topo.vertices.len(), 8);
        assert_eq!(topo.edges.len(), 12);
        assert_eq!(topo.faces.len(), 6);
        assert!(topo.half_edges.values().all(|he| he.twin.is_some()));
    }

    #[test]
    fn test_cube_vertex_has_three_edges() {
        let brep = make_cube(10.0, 20.0, 30.0);
        for v in brep.topology.vertices.keys() {
            assert_eq!(brep.topology.vertex_edges(v).len(), 3);
        }
    }

    #[test]
    fn test_cube_face_normals_point_out() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let center = Point3::new(5.0, 10.0, 15.0);
        for f in brep.faces() {
            let plane = brep.face_plane(f).unwrap();
            assert!(plane.signed_distance(&center) < 0.0);
        }
        let top = brep.faces()[1];
        assert!((brep.face_normal(top).unwrap() - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_cube_normals_follow_loop_winding() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let faces = brep.faces();
        assert!((brep.face_normal(faces[2]).unwrap() + Vec3::y()).norm() < 1e-12);
        assert!((brep.face_normal(faces[3]).unwrap() - Vec3::y()).norm() < 1e-12);
        for f in faces {
            let pts: Vec<Point3> = brep
                .topology
                .face_vertices(f)
                .into_iter()
                .filter_map(|v| brep.vertex_point(v))
                .collect();
            let winding = prism::newell_normal(&pts).normalize();
            assert!((winding - brep.face_normal(f).unwrap()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_point_on_face_is_contained() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let tol = Tolerance::DEFAULT;
        for f in brep.faces() {
            let p = brep.point_on_face(f).unwrap();
            assert!(brep.face_contains_point(f, &p, &tol));
            assert_eq!(brep.find_face_at_point(&p, &tol), Some(f));
        }
    }

    #[test]
    fn test_face_contains_point_rejects_outside() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let tol = Tolerance::DEFAULT;
        let top = brep.faces()[1];
        assert!(brep.face_contains_point(top, &Point3::new(5.0, 5.0, 30.0), &tol));
        assert!(!brep.face_contains_point(top, &Point3::new(15.0, 5.0, 30.0), &tol));
        assert!(!brep.face_contains_point(top, &Point3::new(5.0, 5.0, 29.0), &tol));
    }

    #[test]
    fn test_find_edge_at_midpoint() {
        let brep = make_cube(10.0, 20.0, 30.0);
        let tol = Tolerance::DEFAULT;
        for e in brep.topology.edges.keys() {
            let mid = brep.edge_midpoint(e).unwrap();
            assert_eq!(brep.find_edge_at_point(&mid, &tol), Some(e));
        }
        assert!(brep
            .find_edge_at_point(&Point3::new(5.0, 5.0, 5.0), &tol)
            .is_none());
    }

    #[test]
    fn test_cylinder_faces() {
        let brep = make_cylinder(5.0, 10.0);
        let faces = brep.faces();
        assert_eq!(faces.len(), 3);
        assert!(!brep.is_planar(faces[0]));
        assert!(brep.face_normal(faces[0]).is_none());
        assert!(brep.is_planar(faces[1]));
        assert!((brep.face_normal(faces[1]).unwrap() + Vec3::z()).norm() < 1e-12);
        assert_eq!(brep.topology.edges.len(), 3);
    }

    #[test]
    fn test_cylinder_seam_vertex_edges_deduplicated() {
        let brep = make_cylinder(5.0, 10.0);
        for v in brep.topology.vertices.keys() {
            assert_eq!(brep.topology.vertex_edges(v).len(), 2);
        }
    }
}
