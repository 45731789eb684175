//! The modeling kernel seen from the placement engine.

use dogbone_kernel::{BodyId, Document, HoleId, HoleRequest, KernelError};
use dogbone_kernel_math::{Point3, Tolerance};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId};

/// Query and mutation access to a modeling kernel.
///
/// Keys read from a body snapshot stay meaningful only while
/// [`generation`](ModelingKernel::generation) is unchanged.
pub trait ModelingKernel {
    /// Current boundary representation of a body.
    fn body(&self, body: BodyId) -> Option<&BRepSolid>;

    /// Mutation counter.
    fn generation(&self) -> u64;

    /// Tolerances for point lookups and parallelism checks.
    fn tolerance(&self) -> Tolerance;

    /// The face of `body` containing `p`.
    fn find_face_at_point(&self, body: BodyId, p: &Point3) -> Option<FaceId>;

    /// The edge of `body` containing `p`.
    fn find_edge_at_point(&self, body: BodyId, p: &Point3) -> Option<EdgeId>;

    /// Cut a hole. Advances the generation on success.
    fn create_hole(&mut self, request: HoleRequest) -> Result<HoleId, KernelError>;
}

impl ModelingKernel for Document {
    fn body(&self, body: BodyId) -> Option<&BRepSolid> {
        Document::body(self, body)
    }

    fn generation(&self) -> u64 {
        Document::generation(self)
    }

    fn tolerance(&self) -> Tolerance {
        Document::tolerance(self)
    }

    fn find_face_at_point(&self, body: BodyId, p: &Point3) -> Option<FaceId> {
        Document::find_face_at_point(self, body, p)
    }

    fn find_edge_at_point(&self, body: BodyId, p: &Point3) -> Option<EdgeId> {
        Document::find_edge_at_point(self, body, p)
    }

    fn create_hole(&mut self, request: HoleRequest) -> Result<HoleId, KernelError> {
        Document::create_hole(self, request)
    }
}
