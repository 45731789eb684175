//! Dogbone placement per edge, and the batch run over a selection.

use std::time::{Duration, Instant};

use dogbone_kernel::{BodyId, HoleExtent, HoleId, HolePosition, HoleRequest, FLAT_TIP_ANGLE};
use dogbone_kernel_math::{Point3, Tolerance, Vec3};
use dogbone_kernel_primitives::BRepSolid;
use dogbone_kernel_topo::{EdgeId, FaceId, VertexId};
use tracing::{debug, info, warn};

use crate::corner::{resolve_corner, Corner};
use crate::error::{DogboneError, Result};
use crate::handle::FaceRef;
use crate::kernel::ModelingKernel;
use crate::placement::{compute_placement, PlacementParams, PlacementResult};
use crate::selection::{BodySelection, SelectedFace};
use crate::settings::{DepthMode, DogboneSettings, HoleMode};
use crate::top_face::{find_top_face, translate_vector_between_faces};

// =============================================================================
// Single edge
// =============================================================================

/// Plane the hole starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthTarget {
    /// Start on the selected face.
    SelectedFace,
    /// Start on the body's top face, reached from the selected face by
    /// `translation`.
    TopFace {
        /// The top face.
        face: FaceId,
        /// Selected-face plane to top-face plane.
        translation: Vec3,
    },
}

/// Everything needed to cut one dogbone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DogbonePlacement {
    /// The corner.
    pub corner: Corner,
    /// Circle placement at the corner.
    pub placement: PlacementResult,
    /// Face the hole is sketched on.
    pub hole_plane: FaceId,
    /// Circle center on the hole plane.
    pub hole_center: Point3,
    /// Hole depth from the hole plane to the far end of the dogbone edge.
    pub depth: f64,
    /// Far end of the dogbone edge.
    pub extent_vertex: VertexId,
}

/// Place one dogbone where `edge` drops from `face`.
pub fn place_dogbone(
    body: &BRepSolid,
    face: FaceId,
    edge: EdgeId,
    params: &PlacementParams,
    depth: &DepthTarget,
) -> Result<DogbonePlacement> {
    let corner = resolve_corner(body, face, edge)?;
    if !body.is_planar(face) {
        return Err(DogboneError::GeometryPrecondition(
            "selected face is not planar".into(),
        ));
    }
    let placement = compute_placement(body, &corner, params)?;
    let extent_vertex = corner
        .far_vertex(body)
        .ok_or_else(|| DogboneError::Topology("dogbone edge has no far end".into()))?;
    let edge_length = body
        .topology
        .edge_length(edge)
        .ok_or_else(|| DogboneError::InvalidHandle("dogbone edge is gone".into()))?;

    let (hole_plane, hole_center, depth) = match *depth {
        DepthTarget::SelectedFace => (face, placement.center_point, edge_length),
        DepthTarget::TopFace { face: top, translation } => (
            top,
            placement.center_point + translation,
            edge_length + translation.norm(),
        ),
    };
    Ok(DogbonePlacement {
        corner,
        placement,
        hole_plane,
        hole_center,
        depth,
        extent_vertex,
    })
}

// =============================================================================
// Batch
// =============================================================================

/// An edge that got no dogbone, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEdge {
    /// Body of the edge.
    pub body: BodyId,
    /// Selected face the edge drops from.
    pub face: FaceId,
    /// The edge (key as last known).
    pub edge: EdgeId,
    /// Reason.
    pub error: DogboneError,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct DogboneReport {
    /// Hole features created, in creation order.
    pub holes: Vec<HoleId>,
    /// Corners cut.
    pub dogbones: usize,
    /// Edges that were skipped.
    pub skipped: Vec<SkippedEdge>,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl DogboneReport {
    /// Number of errors met during the run.
    pub fn error_count(&self) -> usize {
        self.skipped.len()
    }

    /// One-line outcome for the user.
    pub fn summary(&self) -> String {
        match self.error_count() {
            0 => format!(
                "{} dogbones created in {} hole features",
                self.dogbones,
                self.holes.len()
            ),
            n => format!("{n} errors, holes may still have been created - verify"),
        }
    }

    fn skip(&mut self, body: BodyId, face: FaceId, edge: EdgeId, error: DogboneError) {
        warn!(?face, ?edge, %error, "skipping dogbone edge");
        self.skipped.push(SkippedEdge {
            body,
            face,
            edge,
            error,
        });
    }

    fn skip_face(&mut self, body: BodyId, face: &SelectedFace, error: &DogboneError) {
        for e in face.edges.iter().filter(|e| e.selected) {
            self.skip(body, face.face.id, e.edge.id, error.clone());
        }
    }
}

/// Cut dogbones at every selected edge.
///
/// Settings are validated before anything else; a configuration error
/// aborts the run. Any other failure skips the affected edge and is
/// recorded in the report.
pub fn create_dogbones<M: ModelingKernel + ?Sized>(
    kernel: &mut M,
    selection: &mut crate::selection::SelectionModel,
    settings: &DogboneSettings,
) -> Result<DogboneReport> {
    settings.validate()?;
    let params = settings.placement_params();
    let started = Instant::now();
    let edges = selection.selected_edge_count();
    info!(
        edges,
        style = ?settings.style,
        mode = ?settings.hole_mode,
        depth = ?settings.depth_mode,
        "creating dogbones"
    );

    let mut report = DogboneReport::default();
    for group in selection.bodies_mut() {
        run_body(kernel, group, settings, &params, &mut report);
    }

    report.elapsed = started.elapsed();
    if settings.benchmark {
        info!(
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            edges,
            "benchmark"
        );
    }
    if report.error_count() > 0 {
        warn!("{}", report.summary());
    } else {
        info!("{}", report.summary());
    }
    Ok(report)
}

fn body_of<M: ModelingKernel + ?Sized>(kernel: &M, body: BodyId) -> Result<&BRepSolid> {
    kernel
        .body(body)
        .ok_or_else(|| DogboneError::InvalidHandle("body is no longer in the kernel".into()))
}

fn locate_top<M: ModelingKernel + ?Sized>(
    kernel: &M,
    body: BodyId,
    primary: &mut FaceRef,
    tol: &Tolerance,
) -> Result<FaceRef> {
    let face = primary.resolve(kernel)?;
    let (top, point) = find_top_face(body_of(kernel, body)?, face, tol)?;
    Ok(FaceRef::at_point(body, top, kernel.generation(), point))
}

/// Resolve the selected face and its depth target at the current generation.
fn prepare_face<M: ModelingKernel + ?Sized>(
    kernel: &M,
    body: BodyId,
    face: &mut FaceRef,
    top: Option<&mut FaceRef>,
    tol: &Tolerance,
) -> Result<(FaceId, DepthTarget)> {
    let face = face.resolve(kernel)?;
    let target = match top {
        None => DepthTarget::SelectedFace,
        Some(top) => {
            let top_face = top.resolve(kernel)?;
            let translation =
                translate_vector_between_faces(body_of(kernel, body)?, face, top_face, tol)?;
            DepthTarget::TopFace {
                face: top_face,
                translation,
            }
        }
    };
    Ok((face, target))
}

fn run_body<M: ModelingKernel + ?Sized>(
    kernel: &mut M,
    group: &mut BodySelection,
    settings: &DogboneSettings,
    params: &PlacementParams,
    report: &mut DogboneReport,
) {
    let body = group.body;
    let tol = kernel.tolerance();

    let mut top = None;
    if settings.depth_mode == DepthMode::FromTop {
        let Some(primary) = group.faces.first_mut() else {
            return;
        };
        match locate_top(&*kernel, body, &mut primary.face, &tol) {
            Ok(found) => {
                info!(face = ?found.id, "processing holes from top face");
                top = Some(found);
            }
            Err(e) => {
                for face in &group.faces {
                    report.skip_face(body, face, &e);
                }
                return;
            }
        }
    }

    for face in &mut group.faces {
        if face.selected_count() == 0 {
            debug!(face = ?face.face.id, "face has no selected edges");
            continue;
        }
        match settings.hole_mode {
            HoleMode::Static => static_face(kernel, body, face, top.as_mut(), params, &tol, report),
            HoleMode::Parametric => {
                parametric_face(kernel, body, face, top.as_mut(), params, &tol, report)
            }
        }
    }
}

/// One hole per corner, dimensioned from the corner edges.
fn parametric_face<M: ModelingKernel + ?Sized>(
    kernel: &mut M,
    body: BodyId,
    selected: &mut SelectedFace,
    mut top: Option<&mut FaceRef>,
    params: &PlacementParams,
    tol: &Tolerance,
    report: &mut DogboneReport,
) {
    let face_id = selected.face.id;
    for entry in selected.edges.iter_mut().filter(|e| e.selected) {
        // Each hole advances the generation, so handles are refreshed per edge.
        let placed = prepare_face(&*kernel, body, &mut selected.face, top.as_deref_mut(), tol)
            .and_then(|(face, target)| {
                let edge = entry.edge.resolve(&*kernel)?;
                place_dogbone(body_of(&*kernel, body)?, face, edge, params, &target)
            });
        let placed = match placed {
            Ok(p) => p,
            Err(e) => {
                report.skip(body, face_id, entry.edge.id, e);
                continue;
            }
        };

        let request = HoleRequest {
            body,
            diameter: 2.0 * params.tool_radius,
            tip_angle: FLAT_TIP_ANGLE,
            position: HolePosition::ByOffsets {
                plane_face: placed.hole_plane,
                center: placed.hole_center,
                edge_a: placed.corner.edge_a,
                edge_b: placed.corner.edge_b,
                offset_a: placed.placement.edge_a_clearance,
                offset_b: placed.placement.edge_b_clearance,
            },
            extent: HoleExtent::ToVertex(placed.extent_vertex),
        };
        match kernel.create_hole(request) {
            Ok(id) => {
                debug!(hole = id.0, center = ?placed.hole_center, "hole added");
                report.holes.push(id);
                report.dogbones += 1;
            }
            Err(e) => report.skip(body, face_id, entry.edge.id, e.into()),
        }
    }
}

/// Holes of one face with the same depth, cut as a single feature.
struct DepthGroup {
    depth: f64,
    centers: Vec<Point3>,
    edges: Vec<EdgeId>,
}

/// Centers collected per face, one multi-point hole per distinct depth.
fn static_face<M: ModelingKernel + ?Sized>(
    kernel: &mut M,
    body: BodyId,
    selected: &mut SelectedFace,
    mut top: Option<&mut FaceRef>,
    params: &PlacementParams,
    tol: &Tolerance,
    report: &mut DogboneReport,
) {
    let (face, target) =
        match prepare_face(&*kernel, body, &mut selected.face, top.as_deref_mut(), tol) {
            Ok(prepared) => prepared,
            Err(e) => {
                report.skip_face(body, selected, &e);
                return;
            }
        };
    debug!(?face, "processing face");

    let mut groups: Vec<DepthGroup> = Vec::new();
    for entry in selected.edges.iter_mut().filter(|e| e.selected) {
        let placed = entry.edge.resolve(&*kernel).and_then(|edge| {
            place_dogbone(body_of(&*kernel, body)?, face, edge, params, &target)
        });
        let placed = match placed {
            Ok(p) => p,
            Err(e) => {
                report.skip(body, face, entry.edge.id, e);
                continue;
            }
        };
        debug!(depth = placed.depth, center = ?placed.hole_center, "hole added to list");
        match groups
            .iter_mut()
            .find(|g| (g.depth - placed.depth).abs() <= tol.linear)
        {
            Some(g) => {
                g.centers.push(placed.hole_center);
                g.edges.push(entry.edge.id);
            }
            None => groups.push(DepthGroup {
                depth: placed.depth,
                centers: vec![placed.hole_center],
                edges: vec![entry.edge.id],
            }),
        }
    }

    for group in groups {
        debug!(depth = group.depth, holes = group.centers.len(), "processing holes at depth");
        let plane_face = match top.as_deref_mut() {
            Some(top) => top.resolve(&*kernel),
            None => selected.face.resolve(&*kernel),
        };
        let result = plane_face.and_then(|plane_face| {
            kernel
                .create_hole(HoleRequest {
                    body,
                    diameter: 2.0 * params.tool_radius,
                    tip_angle: FLAT_TIP_ANGLE,
                    position: HolePosition::AtPoints {
                        plane_face,
                        points: group.centers.clone(),
                    },
                    extent: HoleExtent::Distance(group.depth),
                })
                .map_err(DogboneError::from)
        });
        match result {
            Ok(id) => {
                info!(holes = group.centers.len(), depth = group.depth, "holes added");
                report.holes.push(id);
                report.dogbones += group.centers.len();
            }
            Err(e) => {
                for edge in group.edges {
                    report.skip(body, face, edge, e.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{DogboneStyle, MortiseSide};
    use dogbone_kernel_primitives::make_prism;

    fn l_prism() -> BRepSolid {
        let profile = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        make_prism(&profile, Vec3::new(0.0, 0.0, 5.0)).unwrap()
    }

    fn params() -> PlacementParams {
        PlacementParams {
            style: DogboneStyle::Normal,
            mortise_side: MortiseSide::Long,
            tool_radius: 2.0,
            minimal_percentage: 0.0,
        }
    }

    #[test]
    fn test_place_on_selected_face() {
        let body = l_prism();
        let top = body.faces()[7];
        let edge = body
            .find_edge_at_point(&Point3::new(4.0, 4.0, 1.0), &Tolerance::DEFAULT)
            .unwrap();
        let placed = place_dogbone(&body, top, edge, &params(), &DepthTarget::SelectedFace).unwrap();
        assert_eq!(placed.hole_plane, top);
        assert!((placed.depth - 5.0).abs() < 1e-12);
        assert_eq!(
            body.vertex_point(placed.extent_vertex).unwrap(),
            Point3::new(4.0, 4.0, 0.0)
        );
        assert_eq!(placed.hole_center, placed.placement.center_point);
    }

    #[test]
    fn test_place_from_bottom_to_top() {
        let body = l_prism();
        let (bottom, top) = (body.faces()[6], body.faces()[7]);
        let edge = body
            .find_edge_at_point(&Point3::new(4.0, 4.0, 1.0), &Tolerance::DEFAULT)
            .unwrap();
        let target = DepthTarget::TopFace {
            face: top,
            translation: Vec3::new(0.0, 0.0, 5.0),
        };
        let placed = place_dogbone(&body, bottom, edge, &params(), &target).unwrap();
        assert!((placed.depth - 10.0).abs() < 1e-12);
        assert!((placed.hole_center.z - 5.0).abs() < 1e-12);
        assert!((placed.placement.center_point.z).abs() < 1e-12);
    }

    // =========================================================================
    // Batch runs
    // =========================================================================

    use crate::selection::SelectionModel;
    use crate::settings::{DepthMode, DogboneSettings, HoleMode};
    use approx::assert_relative_eq;
    use dogbone_kernel::{Document, HoleExtent, HolePosition};
    use dogbone_kernel_primitives::make_cube;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// U-shaped plate, 6 thick, with a 10 x 10 slot. Two inside corners.
    fn u_plate(doc: &mut Document) -> BodyId {
        let profile = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(30.0, 0.0, 0.0),
            Point3::new(30.0, 20.0, 0.0),
            Point3::new(20.0, 20.0, 0.0),
            Point3::new(20.0, 10.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(10.0, 20.0, 0.0),
            Point3::new(0.0, 20.0, 0.0),
        ];
        doc.add_body("plate", make_prism(&profile, Vec3::new(0.0, 0.0, 6.0)).unwrap())
    }

    fn select(doc: &Document, body: BodyId, faces: &[usize]) -> SelectionModel {
        let all = doc.body(body).unwrap().faces();
        let mut sel = SelectionModel::new();
        for &i in faces {
            sel.add_face(doc, body, all[i], &crate::dihedral::AngleFilter::default())
                .unwrap();
        }
        sel
    }

    #[test]
    fn test_static_holes_share_depth() {
        init_tracing();
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[9]);
        let settings = DogboneSettings {
            tool_diameter: 4.0,
            ..Default::default()
        };
        let report = create_dogbones(&mut doc, &mut sel, &settings).unwrap();
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.dogbones, 2);
        assert_eq!(report.holes.len(), 1);

        let hole = &doc.holes()[0];
        assert_relative_eq!(hole.request.diameter, 4.0);
        assert_eq!(hole.centers.len(), 2);
        match hole.request.extent {
            HoleExtent::Distance(d) => assert_relative_eq!(d, 6.0, epsilon = 1e-9),
            other => panic!("unexpected extent {other:?}"),
        }
        let s = 2.0 / 2f64.sqrt();
        let mut xs: Vec<f64> = hole.centers.iter().map(|c| c.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_relative_eq!(xs[0], 10.0 + s, epsilon = 1e-9);
        assert_relative_eq!(xs[1], 20.0 - s, epsilon = 1e-9);
        for c in &hole.centers {
            assert_relative_eq!(c.y, 10.0 + s, epsilon = 1e-9);
            assert_relative_eq!(c.z, 6.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_lower_face_cut_from_top() {
        init_tracing();
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        // Top first, so it is the primary face, then the bottom.
        let mut sel = select(&doc, body, &[9, 8]);
        assert_eq!(sel.selected_edge_count(), 4);
        let report = create_dogbones(&mut doc, &mut sel, &DogboneSettings::default()).unwrap();
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.dogbones, 4);
        assert_eq!(report.holes.len(), 2);

        let top = doc.body(body).unwrap().faces()[9];
        for (hole, depth) in doc.holes().iter().zip([6.0, 12.0]) {
            assert_eq!(hole.request.position.plane_face(), top);
            match hole.request.extent {
                HoleExtent::Distance(d) => assert_relative_eq!(d, depth, epsilon = 1e-9),
                other => panic!("unexpected extent {other:?}"),
            }
            assert!(hole.centers.iter().all(|c| (c.z - 6.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_from_selected_face() {
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[8]);
        let settings = DogboneSettings {
            depth_mode: DepthMode::FromSelectedFace,
            ..Default::default()
        };
        create_dogbones(&mut doc, &mut sel, &settings).unwrap();
        let bottom = doc.body(body).unwrap().faces()[8];
        let hole = &doc.holes()[0];
        assert_eq!(hole.request.position.plane_face(), bottom);
        assert!(hole.centers.iter().all(|c| c.z.abs() < 1e-9));
    }

    #[test]
    fn test_parametric_hole_per_corner() {
        init_tracing();
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[9]);
        let settings = DogboneSettings {
            hole_mode: HoleMode::Parametric,
            ..Default::default()
        };
        let report = create_dogbones(&mut doc, &mut sel, &settings).unwrap();
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.holes.len(), 2);
        // Each hole advanced the generation; handles were refreshed on the way.
        assert_eq!(doc.generation(), 3);

        let brep = doc.body(body).unwrap();
        for hole in doc.holes() {
            let HolePosition::ByOffsets {
                offset_a, offset_b, ..
            } = hole.request.position
            else {
                panic!("expected a dimensioned hole");
            };
            let s = settings.tool_radius() / 2f64.sqrt();
            assert_relative_eq!(offset_a, s, epsilon = 1e-9);
            assert_relative_eq!(offset_b, s, epsilon = 1e-9);
            let HoleExtent::ToVertex(v) = hole.request.extent else {
                panic!("expected a vertex extent");
            };
            assert_relative_eq!(brep.vertex_point(v).unwrap().z, 0.0);
        }
    }

    #[test]
    fn test_deselected_edge_is_left_alone() {
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[9]);
        let face = sel.bodies()[0].faces[0].face.id;
        let edge = sel.bodies()[0].faces[0].edges[1].edge.id;
        sel.set_edge_selected(body, face, edge, false);
        let report = create_dogbones(&mut doc, &mut sel, &DogboneSettings::default()).unwrap();
        assert_eq!(report.dogbones, 1);
        assert_eq!(doc.holes()[0].centers.len(), 1);
    }

    #[test]
    fn test_vanished_edges_are_skipped() {
        init_tracing();
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[9]);
        // Fill the slot: the top face is still there, its corner edges are not.
        doc.replace_body(body, make_cube(30.0, 20.0, 6.0)).unwrap();

        let report = create_dogbones(&mut doc, &mut sel, &DogboneSettings::default()).unwrap();
        assert!(report.holes.is_empty());
        assert_eq!(report.error_count(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.error, DogboneError::InvalidHandle(_))));
        assert_eq!(
            report.summary(),
            "2 errors, holes may still have been created - verify"
        );
    }

    #[test]
    fn test_bad_settings_abort_before_cutting() {
        let mut doc = Document::new();
        let body = u_plate(&mut doc);
        let mut sel = select(&doc, body, &[9]);
        let settings = DogboneSettings {
            tool_diameter: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            create_dogbones(&mut doc, &mut sel, &settings),
            Err(DogboneError::Configuration(_))
        ));
        assert!(doc.holes().is_empty());
        assert_eq!(doc.generation(), 1);
    }

    #[test]
    fn test_summary_wording() {
        let mut report = DogboneReport::default();
        assert_eq!(report.summary(), "0 dogbones created in 0 hole features");
        let mut doc = dogbone_kernel::Document::new();
        let body = doc.add_body("l", l_prism());
        let brep = doc.body(body).unwrap();
        let face = brep.faces()[0];
        let edge = brep.topology.edges.keys().next().unwrap();
        report.skip(body, face, edge, DogboneError::Topology("x".into()));
        report.skip(body, face, edge, DogboneError::Topology("y".into()));
        assert_eq!(
            report.summary(),
            "2 errors, holes may still have been created - verify"
        );
    }
}
