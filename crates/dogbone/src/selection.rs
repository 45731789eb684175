//! Faces and edges picked for dogbones, grouped per body.

use dogbone_kernel::BodyId;
use dogbone_kernel_topo::{EdgeId, FaceId};
use tracing::debug;

use crate::dihedral::{candidate_edges, AngleFilter};
use crate::error::{DogboneError, Result};
use crate::handle::{EdgeRef, FaceRef};
use crate::kernel::ModelingKernel;

/// A dogbone edge under a selected face.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEdge {
    /// Handle to the edge.
    pub edge: EdgeRef,
    /// Whether a dogbone is wanted here.
    pub selected: bool,
}

/// A selected face and its dogbone edges, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFace {
    /// Handle to the face.
    pub face: FaceRef,
    /// Edges dropping from the face.
    pub edges: Vec<SelectedEdge>,
}

impl SelectedFace {
    /// Number of edges flagged for a dogbone.
    pub fn selected_count(&self) -> usize {
        self.edges.iter().filter(|e| e.selected).count()
    }
}

/// The faces selected on one body. The first face is the primary face.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySelection {
    /// The body.
    pub body: BodyId,
    /// Faces in selection order.
    pub faces: Vec<SelectedFace>,
}

/// Everything picked for one dogbone run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionModel {
    bodies: Vec<BodySelection>,
}

impl SelectionModel {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-body selections in the order bodies were first picked.
    pub fn bodies(&self) -> &[BodySelection] {
        &self.bodies
    }

    /// Mutable access for the engine, which refreshes handles in place.
    pub fn bodies_mut(&mut self) -> &mut [BodySelection] {
        &mut self.bodies
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.bodies.iter().all(|b| b.faces.is_empty())
    }

    /// Number of edges flagged for a dogbone.
    pub fn selected_edge_count(&self) -> usize {
        self.bodies
            .iter()
            .flat_map(|b| &b.faces)
            .map(SelectedFace::selected_count)
            .sum()
    }

    fn find_face_mut(&mut self, body: BodyId, face: FaceId) -> Option<&mut SelectedFace> {
        self.bodies
            .iter_mut()
            .find(|b| b.body == body)?
            .faces
            .iter_mut()
            .find(|f| f.face.id == face)
    }

    /// Select a face and all its dogbone edges that pass `filter`.
    ///
    /// The face must be planar and parallel to the primary face of its
    /// body. Selecting a face twice is a no-op.
    pub fn add_face<M: ModelingKernel + ?Sized>(
        &mut self,
        kernel: &M,
        body: BodyId,
        face: FaceId,
        filter: &AngleFilter,
    ) -> Result<()> {
        let brep = kernel
            .body(body)
            .ok_or_else(|| DogboneError::InvalidHandle("body is not in the kernel".into()))?;
        let normal = brep
            .face_normal(face)
            .ok_or_else(|| DogboneError::GeometryPrecondition("face is not planar".into()))?;

        let slot = match self.bodies.iter().position(|b| b.body == body) {
            Some(i) => i,
            None => {
                self.bodies.push(BodySelection {
                    body,
                    faces: Vec::new(),
                });
                self.bodies.len() - 1
            }
        };
        let group = &self.bodies[slot];
        if group.faces.iter().any(|f| f.face.id == face) {
            return Ok(());
        }
        if let Some(primary) = group.faces.first() {
            let primary_normal = brep.face_normal(primary.face.id).ok_or_else(|| {
                DogboneError::InvalidHandle("primary face is no longer planar".into())
            })?;
            if !kernel.tolerance().is_parallel(&normal, &primary_normal) {
                return Err(DogboneError::GeometryPrecondition(
                    "face is not parallel to the primary face".into(),
                ));
            }
        }

        let edges = candidate_edges(brep, face, filter)
            .into_iter()
            .map(|e| {
                EdgeRef::capture(kernel, body, e).map(|edge| SelectedEdge {
                    edge,
                    selected: true,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(?face, edges = edges.len(), "selected face");
        let face = FaceRef::capture(kernel, body, face)?;
        self.bodies[slot].faces.push(SelectedFace { face, edges });
        Ok(())
    }

    /// Deselect a face. The next face of the body, if any, becomes primary.
    pub fn remove_face(&mut self, body: BodyId, face: FaceId) -> bool {
        let Some(group) = self.bodies.iter_mut().find(|b| b.body == body) else {
            return false;
        };
        let before = group.faces.len();
        group.faces.retain(|f| f.face.id != face);
        let removed = group.faces.len() != before;
        self.bodies.retain(|b| !b.faces.is_empty());
        removed
    }

    /// Flag or unflag one edge of a selected face.
    pub fn set_edge_selected(
        &mut self,
        body: BodyId,
        face: FaceId,
        edge: EdgeId,
        selected: bool,
    ) -> bool {
        let Some(f) = self.find_face_mut(body, face) else {
            return false;
        };
        match f.edges.iter_mut().find(|e| e.edge.id == edge) {
            Some(e) => {
                e.selected = selected;
                true
            }
            None => false,
        }
    }
}
