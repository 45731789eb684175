#![warn(missing_docs)]

//! Half-edge B-rep topology for the dogbone kernel.
//!
//! Entities live in [`slotmap`] arenas and refer to each other through
//! copyable keys rather than pointers, so the cyclic face/edge/vertex
//! relations of a solid never need shared ownership. A [`Topology`] is a
//! snapshot: callers that hold keys across a mutating kernel call must
//! treat them as possibly stale.

use dogbone_kernel_math::Point3;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key of a [`Vertex`].
    pub struct VertexId;
    /// Key of a [`HalfEdge`].
    pub struct HalfEdgeId;
    /// Key of an [`Edge`].
    pub struct EdgeId;
    /// Key of a [`Loop`].
    pub struct LoopId;
    /// Key of a [`Face`].
    pub struct FaceId;
    /// Key of a [`Shell`].
    pub struct ShellId;
    /// Key of a [`Solid`].
    pub struct SolidId;
}

/// Orientation of a face relative to its underlying surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Face normal equals the surface normal.
    Forward,
    /// Face normal is the negated surface normal.
    Reversed,
}

/// A topological vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position in model space.
    pub point: Point3,
    /// One outgoing half-edge, if any.
    pub half_edge: Option<HalfEdgeId>,
}

/// One side of an edge, owned by a loop.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    /// Vertex this half-edge starts at.
    pub origin: VertexId,
    /// Opposite half-edge on the neighbouring face.
    pub twin: Option<HalfEdgeId>,
    /// Next half-edge in the loop.
    pub next: Option<HalfEdgeId>,
    /// Previous half-edge in the loop.
    pub prev: Option<HalfEdgeId>,
    /// Edge this half-edge belongs to.
    pub edge: Option<EdgeId>,
    /// Loop this half-edge belongs to.
    pub loop_id: Option<LoopId>,
}

/// A topological edge: a pair of twin half-edges.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The primary half-edge. Its origin is the edge's start vertex.
    pub half_edge: HalfEdgeId,
}

/// A closed cycle of half-edges bounding a face.
#[derive(Debug, Clone)]
pub struct Loop {
    /// Any half-edge of the cycle (the first one added).
    pub half_edge: HalfEdgeId,
    /// Face this loop bounds.
    pub face: Option<FaceId>,
}

/// A bounded region of a surface.
#[derive(Debug, Clone)]
pub struct Face {
    /// Boundary, counter-clockwise seen from outside the solid.
    pub outer_loop: LoopId,
    /// Index of the carrying surface in the geometry store.
    pub surface_index: usize,
    /// Orientation relative to the surface normal.
    pub orientation: Orientation,
    /// Owning shell.
    pub shell: Option<ShellId>,
}

/// A connected set of faces.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Faces in construction order.
    pub faces: Vec<FaceId>,
    /// Owning solid.
    pub solid: Option<SolidId>,
}

/// A solid bounded by one outer shell.
#[derive(Debug, Clone)]
pub struct Solid {
    /// The outer shell.
    pub outer_shell: ShellId,
}

/// Arena of all topological entities of one or more solids.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// All vertices.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// All half-edges.
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    /// All edges.
    pub edges: SlotMap<EdgeId, Edge>,
    /// All loops.
    pub loops: SlotMap<LoopId, Loop>,
    /// All faces.
    pub faces: SlotMap<FaceId, Face>,
    /// All shells.
    pub shells: SlotMap<ShellId, Shell>,
    /// All solids.
    pub solids: SlotMap<SolidId, Solid>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a vertex at `point`.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(Vertex {
            point,
            half_edge: None,
        })
    }

    /// Add an unlinked half-edge starting at `origin`.
    pub fn add_half_edge(&mut self, origin: VertexId) -> HalfEdgeId {
        let he = self.half_edges.insert(HalfEdge {
            origin,
            twin: None,
            next: None,
            prev: None,
            edge: None,
            loop_id: None,
        });
        if let Some(v) = self.vertices.get_mut(origin) {
            if v.half_edge.is_none() {
                v.half_edge = Some(he);
            }
        }
        he
    }

    /// Link `half_edges` into a closed cycle, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if `half_edges` is empty or holds a key not in this topology.
    pub fn add_loop(&mut self, half_edges: &[HalfEdgeId]) -> LoopId {
        assert!(!half_edges.is_empty(), "a loop needs at least one half-edge");
        let loop_id = self.loops.insert(Loop {
            half_edge: half_edges[0],
            face: None,
        });
        let n = half_edges.len();
        for i in 0..n {
            let he = &mut self.half_edges[half_edges[i]];
            he.next = Some(half_edges[(i + 1) % n]);
            he.prev = Some(half_edges[(i + n - 1) % n]);
            he.loop_id = Some(loop_id);
        }
        loop_id
    }

    /// Add a face bounded by `outer_loop`.
    pub fn add_face(
        &mut self,
        outer_loop: LoopId,
        surface_index: usize,
        orientation: Orientation,
    ) -> FaceId {
        let face = self.faces.insert(Face {
            outer_loop,
            surface_index,
            orientation,
            shell: None,
        });
        self.loops[outer_loop].face = Some(face);
        face
    }

    /// Pair two half-edges as twins and create the edge they form.
    ///
    /// `he1` becomes the primary half-edge: its origin is the edge start.
    pub fn add_edge(&mut self, he1: HalfEdgeId, he2: HalfEdgeId) -> EdgeId {
        let edge = self.edges.insert(Edge { half_edge: he1 });
        let a = &mut self.half_edges[he1];
        a.twin = Some(he2);
        a.edge = Some(edge);
        let b = &mut self.half_edges[he2];
        b.twin = Some(he1);
        b.edge = Some(edge);
        edge
    }

    /// Add a shell made of `faces`.
    pub fn add_shell(&mut self, faces: Vec<FaceId>) -> ShellId {
        let shell = self.shells.insert(Shell {
            faces: faces.clone(),
            solid: None,
        });
        for f in faces {
            self.faces[f].shell = Some(shell);
        }
        shell
    }

    /// Add a solid bounded by `outer_shell`.
    pub fn add_solid(&mut self, outer_shell: ShellId) -> SolidId {
        let solid = self.solids.insert(Solid {
            outer_shell,
        });
        self.shells[outer_shell].solid = Some(solid);
        solid
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Iterate the half-edges of a loop in cycle order.
    pub fn loop_half_edges(&self, loop_id: LoopId) -> LoopIter<'_> {
        let start = self.loops.get(loop_id).map(|l| l.half_edge);
        LoopIter {
            topo: self,
            start,
            current: start,
            // Guard against malformed cycles that never return to the start.
            remaining: self.half_edges.len(),
        }
    }

    /// Vertices of a loop in cycle order.
    pub fn loop_vertices(&self, loop_id: LoopId) -> Vec<VertexId> {
        self.loop_half_edges(loop_id)
            .map(|he| self.half_edges[he].origin)
            .collect()
    }

    /// Destination vertex of a half-edge (origin of its successor).
    ///
    /// Falls back to the twin's origin for half-edges not yet in a loop.
    pub fn half_edge_dest(&self, he: HalfEdgeId) -> VertexId {
        let h = &self.half_edges[he];
        match (h.next, h.twin) {
            (Some(next), _) => self.half_edges[next].origin,
            (None, Some(twin)) => self.half_edges[twin].origin,
            (None, None) => h.origin,
        }
    }

    /// Face owning a half-edge, through its loop.
    pub fn half_edge_face(&self, he: HalfEdgeId) -> Option<FaceId> {
        self.half_edges
            .get(he)?
            .loop_id
            .and_then(|l| self.loops.get(l))
            .and_then(|l| l.face)
    }

    /// Boundary loop of a face.
    pub fn face_loop(&self, face: FaceId) -> Option<LoopId> {
        self.faces.get(face).map(|f| f.outer_loop)
    }

    // =========================================================================
    // Adjacency queries
    // =========================================================================

    /// Start and end vertex of an edge.
    pub fn edge_vertices(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        let he = self.edges.get(edge)?.half_edge;
        Some((self.half_edges[he].origin, self.half_edge_dest(he)))
    }

    /// Straight-line length of an edge.
    pub fn edge_length(&self, edge: EdgeId) -> Option<f64> {
        let (a, b) = self.edge_vertices(edge)?;
        Some((self.vertices[b].point - self.vertices[a].point).norm())
    }

    /// Faces on either side of an edge: the primary half-edge's face first.
    pub fn edge_faces(&self, edge: EdgeId) -> Vec<FaceId> {
        let Some(e) = self.edges.get(edge) else {
            return Vec::new();
        };
        let mut faces = Vec::with_capacity(2);
        faces.extend(self.half_edge_face(e.half_edge));
        if let Some(twin) = self.half_edges[e.half_edge].twin {
            faces.extend(self.half_edge_face(twin));
        }
        faces
    }

    /// The half-edge of `edge` that runs in `face`'s loops (the co-edge).
    pub fn coedge_in_face(&self, edge: EdgeId, face: FaceId) -> Option<HalfEdgeId> {
        let he = self.edges.get(edge)?.half_edge;
        let candidates = std::iter::once(he).chain(self.half_edges[he].twin);
        candidates.into_iter().find(|&h| self.half_edge_face(h) == Some(face))
    }

    /// Edges bounding a face, in loop order.
    pub fn face_edges(&self, face: FaceId) -> Vec<EdgeId> {
        self.face_loop(face)
            .into_iter()
            .flat_map(|l| self.loop_half_edges(l))
            .filter_map(|he| self.half_edges[he].edge)
            .collect()
    }

    /// Vertices of a face, in loop order.
    pub fn face_vertices(&self, face: FaceId) -> Vec<VertexId> {
        self.face_loop(face)
            .into_iter()
            .flat_map(|l| self.loop_vertices(l))
            .collect()
    }

    /// Edges incident to a vertex.
    ///
    /// Rotates around the vertex through `prev`/`twin` links, which costs
    /// one step per incident edge on a closed manifold. Open fans (a
    /// missing twin) fall back to a full scan of the half-edges.
    pub fn vertex_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        let Some(start) = self.vertices.get(vertex).and_then(|v| v.half_edge) else {
            return Vec::new();
        };
        let mut edges = Vec::new();
        let mut current = start;
        for _ in 0..self.half_edges.len() {
            match self.half_edges[current].edge {
                // Seam and closed-curve edges are met twice around a vertex.
                Some(e) if edges.contains(&e) => {}
                Some(e) => edges.push(e),
                None => return self.vertex_edges_by_scan(vertex),
            }
            let incoming = self.half_edges[current].prev;
            match incoming.and_then(|p| self.half_edges[p].twin) {
                Some(n) if n == start => return edges,
                Some(n) => current = n,
                None => return self.vertex_edges_by_scan(vertex),
            }
        }
        self.vertex_edges_by_scan(vertex)
    }

    fn vertex_edges_by_scan(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| {
                let he = e.half_edge;
                self.half_edges[he].origin == vertex || self.half_edge_dest(he) == vertex
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Faces of the solid's outer shell, in construction order.
    pub fn solid_faces(&self, solid: SolidId) -> Vec<FaceId> {
        self.solids
            .get(solid)
            .and_then(|s| self.shells.get(s.outer_shell))
            .map(|sh| sh.faces.clone())
            .unwrap_or_default()
    }
}

/// Iterator over the half-edges of a loop.
pub struct LoopIter<'a> {
    topo: &'a Topology,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    remaining: usize,
}

impl Iterator for LoopIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.topo.half_edges.get(current).and_then(|h| h.next);
        self.current = match next {
            Some(n) if Some(n) != self.start => Some(n),
            _ => None,
        };
        Some(current)
    }
}
