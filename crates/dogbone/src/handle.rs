//! Face and edge handles that survive kernel mutations.
//!
//! A handle remembers the generation it was taken at and a point on the
//! entity. Once the kernel has moved on, the key is looked up again by that
//! point before it is used.

use dogbone_kernel::BodyId;
use dogbone_kernel_math::Point3;
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId};
use tracing::debug;

use crate::error::{DogboneError, Result};
use crate::kernel::ModelingKernel;

/// A topological entity that can be found again by a point on it.
pub trait Entity: Copy + PartialEq + std::fmt::Debug {
    /// Name used in messages.
    const KIND: &'static str;

    /// Whether the key exists in `body`.
    fn exists(body: &BRepSolid, id: Self) -> bool;

    /// Look the entity up by a point on it.
    fn locate<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId, p: &Point3) -> Option<Self>;
}

impl Entity for FaceId {
    const KIND: &'static str = "face";

    fn exists(body: &BRepSolid, id: Self) -> bool {
        body.topology.faces.contains_key(id)
    }

    fn locate<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId, p: &Point3) -> Option<Self> {
        kernel.find_face_at_point(body, p)
    }
}

impl Entity for EdgeId {
    const KIND: &'static str = "edge";

    fn exists(body: &BRepSolid, id: Self) -> bool {
        body.topology.edges.contains_key(id)
    }

    fn locate<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId, p: &Point3) -> Option<Self> {
        kernel.find_edge_at_point(body, p)
    }
}

/// A retained reference to a face or edge of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRef<K> {
    /// Owning body.
    pub body: BodyId,
    /// Key as of `generation`.
    pub id: K,
    /// Kernel generation the key was read at.
    pub generation: u64,
    /// A point on the entity, away from its boundary.
    pub ref_point: Point3,
}

/// Handle to a face.
pub type FaceRef = EntityRef<FaceId>;

/// Handle to an edge.
pub type EdgeRef = EntityRef<EdgeId>;

impl FaceRef {
    /// Take a handle to a planar face, using an interior point.
    pub fn capture<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId, face: FaceId) -> Result<Self> {
        let ref_point = kernel
            .body(body)
            .and_then(|b| b.point_on_face(face))
            .ok_or_else(|| DogboneError::InvalidHandle("face has no interior point".into()))?;
        Ok(Self::at_point(body, face, kernel.generation(), ref_point))
    }
}

impl EdgeRef {
    /// Take a handle to an edge, using its midpoint.
    pub fn capture<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId, edge: EdgeId) -> Result<Self> {
        let ref_point = kernel
            .body(body)
            .and_then(|b| b.edge_midpoint(edge))
            .ok_or_else(|| DogboneError::InvalidHandle("edge has no midpoint".into()))?;
        Ok(Self::at_point(body, edge, kernel.generation(), ref_point))
    }
}

impl<K: Entity> EntityRef<K> {
    /// Handle from parts.
    pub fn at_point(body: BodyId, id: K, generation: u64, ref_point: Point3) -> Self {
        Self {
            body,
            id,
            generation,
            ref_point,
        }
    }

    /// Whether the key can be used as is.
    pub fn is_current<M: ModelingKernel + ?Sized>(&self, kernel: &M) -> bool {
        self.generation == kernel.generation()
            && kernel.body(self.body).is_some_and(|b| K::exists(b, self.id))
    }

    /// The key, looked up again by the reference point if it went stale.
    ///
    /// One lookup is attempted; if nothing lies at the point any more the
    /// handle is left untouched and [`DogboneError::InvalidHandle`] returned.
    pub fn resolve<M: ModelingKernel + ?Sized>(&mut self, kernel: &M) -> Result<K> {
        if self.is_current(kernel) {
            return Ok(self.id);
        }
        let p = self.ref_point;
        let Some(id) = K::locate(kernel, self.body, &p) else {
            return Err(DogboneError::InvalidHandle(format!(
                "no {} at ({:.4}, {:.4}, {:.4})",
                K::KIND,
                p.x,
                p.y,
                p.z
            )));
        };
        debug!(
            kind = K::KIND,
            old = ?self.id,
            new = ?id,
            generation = kernel.generation(),
            "revalidated handle"
        );
        self.id = id;
        self.generation = kernel.generation();
        Ok(id)
    }
}
