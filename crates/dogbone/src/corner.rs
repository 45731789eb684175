//! Corner topology: which edges of a face meet the dogbone edge.

use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId, VertexId};

use crate::error::{DogboneError, Result};

/// An interior corner of a face, seen from the edge that drops out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    /// The selected face.
    pub face: FaceId,
    /// Vertex shared by the face and the dogbone edge.
    pub corner_vertex: VertexId,
    /// Edge leaving the face at the corner.
    pub dogbone_edge: EdgeId,
    /// First face edge at the corner, in loop order.
    pub edge_a: EdgeId,
    /// Second face edge at the corner, in loop order.
    pub edge_b: EdgeId,
    /// Face on the primary side of the dogbone edge.
    pub face_a: FaceId,
    /// Face on the other side of the dogbone edge.
    pub face_b: FaceId,
}

/// Find the corner where `dogbone_edge` meets `face`.
///
/// The edge must touch the face at exactly one vertex, and exactly two edges
/// of the face must meet there.
pub fn resolve_corner(body: &BRepSolid, face: FaceId, dogbone_edge: EdgeId) -> Result<Corner> {
    let topo = &body.topology;
    if !topo.faces.contains_key(face) {
        return Err(DogboneError::InvalidHandle("face is not part of the body".into()));
    }
    let (start, end) = topo
        .edge_vertices(dogbone_edge)
        .ok_or_else(|| DogboneError::InvalidHandle("edge is not part of the body".into()))?;

    let face_vertices = topo.face_vertices(face);
    let corner_vertex = match (face_vertices.contains(&start), face_vertices.contains(&end)) {
        (true, false) => start,
        (false, true) => end,
        (true, true) => {
            return Err(DogboneError::Topology(
                "edge lies in the face instead of leaving it".into(),
            ))
        }
        (false, false) => {
            return Err(DogboneError::Topology(
                "edge does not touch the face".into(),
            ))
        }
    };

    let at_vertex = topo.vertex_edges(corner_vertex);
    let mut bounding = Vec::with_capacity(2);
    for edge in topo.face_edges(face) {
        if edge != dogbone_edge && at_vertex.contains(&edge) && !bounding.contains(&edge) {
            bounding.push(edge);
        }
    }
    let [edge_a, edge_b] = bounding[..] else {
        return Err(DogboneError::Topology(format!(
            "expected 2 face edges at the corner, found {}",
            bounding.len()
        )));
    };

    let [face_a, face_b] = topo.edge_faces(dogbone_edge)[..] else {
        return Err(DogboneError::Topology(
            "dogbone edge is not shared by two faces".into(),
        ));
    };

    Ok(Corner {
        face,
        corner_vertex,
        dogbone_edge,
        edge_a,
        edge_b,
        face_a,
        face_b,
    })
}

impl Corner {
    /// Endpoint of the dogbone edge away from the face.
    pub fn far_vertex(&self, body: &BRepSolid) -> Option<VertexId> {
        let (start, end) = body.topology.edge_vertices(self.dogbone_edge)?;
        Some(if start == self.corner_vertex { end } else { start })
    }
}
