#![warn(missing_docs)]

//! Dogbone relief placement for CNC-milled inside corners.
//!
//! A round cutter cannot reach into a sharp inside corner. A dogbone is a
//! hole drilled at the corner so that a square-cornered mating part fits.
//! This crate finds the corner geometry around a selected face, places the
//! hole circle for the chosen style and cuts the holes through a
//! [`ModelingKernel`].
//!
//! # Example
//!
//! ```
//! use dogbone::{create_dogbones, AngleFilter, DogboneSettings, SelectionModel};
//! use dogbone_kernel::Document;
//! use dogbone_kernel_math::{Point3, Vec3};
//! use dogbone_kernel_primitives::make_prism;
//!
//! // An L-shaped plate with one inside corner.
//! let profile = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(20.0, 0.0, 0.0),
//!     Point3::new(20.0, 8.0, 0.0),
//!     Point3::new(8.0, 8.0, 0.0),
//!     Point3::new(8.0, 20.0, 0.0),
//!     Point3::new(0.0, 20.0, 0.0),
//! ];
//! let mut doc = Document::new();
//! let body = doc.add_body("plate", make_prism(&profile, Vec3::new(0.0, 0.0, 6.0)).unwrap());
//! let top = doc.body(body).unwrap().faces()[7];
//!
//! let mut selection = SelectionModel::new();
//! selection.add_face(&doc, body, top, &AngleFilter::default()).unwrap();
//!
//! let report = create_dogbones(&mut doc, &mut selection, &DogboneSettings::default()).unwrap();
//! assert_eq!(report.dogbones, 1);
//! assert_eq!(report.error_count(), 0);
//! ```

pub mod corner;
pub mod dihedral;
pub mod engine;
pub mod error;
pub mod handle;
pub mod kernel;
pub mod placement;
pub mod selection;
pub mod settings;
pub mod top_face;

pub use corner::{resolve_corner, Corner};
pub use dihedral::{angle_between_faces, candidate_edges, AngleFilter, DihedralAngle, NonPlanarPolicy};
pub use engine::{create_dogbones, place_dogbone, DepthTarget, DogbonePlacement, DogboneReport, SkippedEdge};
pub use error::{DogboneError, Result};
pub use handle::{EdgeRef, Entity, EntityRef, FaceRef};
pub use kernel::ModelingKernel;
pub use placement::{
    center_from_offsets, compute_placement, corrected_edge_vector, DogboneStyle, MortiseSide,
    PlacementParams, PlacementResult,
};
pub use selection::{BodySelection, SelectedEdge, SelectedFace, SelectionModel};
pub use settings::{DepthMode, DogboneSettings, HoleMode};
pub use top_face::{find_top_face, translate_vector_between_faces};
