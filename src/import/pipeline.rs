// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import run orchestration
//!
//! A backend pushes [`GeometryRecord`]s into a [`FeatureSink`]. The
//! [`FeatureProcessor`] sink routes each record through decoding, topology
//! or arc tessellation and name-keyed merging before the backend moves on
//! to the next feature. [`Importer`] picks the backend and tracks the run
//! state.

use super::backend::{Backend, BackendKind, Capabilities};
use super::report::{Diagnostic, RunReport, Severity};
use crate::config::ImportConfig;
use crate::error::{SosiError, SosiResult};
use crate::geometry::{
    build_edges, decode_coordinates, ArcTessellator, GeometryKind, GeometryRecord, Polyline,
    ResultFlags,
};
use crate::scene::{merge_into_scene, MergeOutcome, MeshCandidate, MeshGeometry, SceneGraph};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Abort status a processor returns after a run-level error
pub const RUN_FATAL_STATUS: i32 = -2;

/// Answer a sink gives the backend after each feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Continue,
    /// Stop enumerating and fail the run with this status
    Abort(i32),
}

impl FeatureStatus {
    /// Status code on the callback boundary, zero to continue
    pub fn code(&self) -> i32 {
        match self {
            FeatureStatus::Continue => 0,
            FeatureStatus::Abort(code) => *code,
        }
    }
}

/// Receiver for features enumerated by a backend
pub trait FeatureSink {
    fn accept(&mut self, record: GeometryRecord) -> FeatureStatus;

    /// A feature the backend could not turn into a record
    fn reject(&mut self, _diagnostic: Diagnostic) {}
}

/// Turns records into scene objects
pub struct FeatureProcessor<'s> {
    scene: &'s mut SceneGraph,
    tessellator: ArcTessellator,
    report: RunReport,
}

impl<'s> FeatureProcessor<'s> {
    pub fn new(scene: &'s mut SceneGraph, tessellator: ArcTessellator) -> Self {
        Self {
            scene,
            tessellator,
            report: RunReport::default(),
        }
    }

    /// Route one record into the scene.
    ///
    /// Returns `Ok(None)` for records without points. The anchor is only
    /// created once a record has decoded cleanly.
    pub fn process(&mut self, record: GeometryRecord) -> SosiResult<Option<MergeOutcome>> {
        if record.is_empty() {
            debug!(
                reference = record.reference_number,
                name = %record.name,
                "skipping feature without points"
            );
            self.report.features_skipped += 1;
            return Ok(None);
        }

        info!(
            "{} {}: Res= 0x{:x} NoOfCoords= {}",
            record.kind,
            record.reference_number,
            record.result_flags.bits(),
            record.point_count
        );
        self.report_flags(&record);

        let line = decode_coordinates(
            record.dimensionality,
            record.point_count,
            &record.coordinates,
        )?;
        self.scene.ensure_root_anchor();
        let mesh = match record.kind {
            GeometryKind::Point => MeshGeometry::point_cloud(line.points),
            GeometryKind::Curve => curve_mesh(line),
            GeometryKind::Arc => self.arc_mesh(&record, line),
            GeometryKind::Surface => self.surface_mesh(&record, line),
        };

        let outcome = merge_into_scene(
            self.scene,
            &record.source_label,
            MeshCandidate::new(record.name, mesh),
        );
        match outcome {
            MergeOutcome::Created(_) => self.report.objects_created += 1,
            MergeOutcome::Merged { .. } => self.report.objects_merged += 1,
        }
        self.report.features_processed += 1;
        Ok(Some(outcome))
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    fn report_flags(&mut self, record: &GeometryRecord) {
        let flags = record.result_flags;
        if flags.contains(ResultFlags::GENERAL_ERROR) {
            error!(
                reference = record.reference_number,
                name = %record.name,
                "backend reported a general error"
            );
            self.diagnose(record, Severity::Error, "backend reported a general error");
        }
        if flags.contains(ResultFlags::DIMENSION_MISMATCH) {
            warn!(reference = record.reference_number, name = %record.name, "dimension mismatch");
            if record.kind == GeometryKind::Surface {
                self.diagnose(
                    record,
                    Severity::Warning,
                    "dimension mismatch in FLATE elements, drawing might be strange",
                );
            } else {
                self.diagnose(record, Severity::Warning, "dimension mismatch");
            }
        }
        if flags.contains(ResultFlags::LOOP_UNCLOSED) {
            warn!(reference = record.reference_number, name = %record.name, "loop not closed");
            self.diagnose(record, Severity::Warning, "loop not closed");
        }
    }

    fn arc_mesh(&mut self, record: &GeometryRecord, definition: Polyline) -> MeshGeometry {
        match self.tessellator.tessellate_polyline(&definition) {
            Some(arc) => curve_mesh(arc),
            None => {
                warn!(
                    reference = record.reference_number,
                    points = definition.len(),
                    "arc needs three points, importing as a plain curve"
                );
                self.diagnose(
                    record,
                    Severity::Warning,
                    format!("arc defined by {} points, imported as a curve", definition.len()),
                );
                curve_mesh(definition)
            }
        }
    }

    /// Boundary edges plus one n-gon over this feature's own ring
    fn surface_mesh(&mut self, record: &GeometryRecord, line: Polyline) -> MeshGeometry {
        let mut topology = build_edges(&line);
        let n = line.len();
        let ring_len = if topology.closed { n - 1 } else { n };

        if !topology.closed && !record.result_flags.contains(ResultFlags::LOOP_UNCLOSED) {
            debug!(reference = record.reference_number, "surface ring open in source");
            self.diagnose(record, Severity::Info, "surface ring open in source");
        }

        let mut faces = Vec::new();
        if ring_len >= 3 {
            if !topology.closed {
                topology.edges.push([n - 1, 0]);
            }
            faces.push((0..ring_len).collect());
        } else {
            warn!(reference = record.reference_number, ring_len, "surface too small for a face");
            self.diagnose(
                record,
                Severity::Warning,
                "surface has fewer than three ring vertices, no face built",
            );
        }

        MeshGeometry::new(line.points, topology.edges, faces)
    }

    fn diagnose(
        &mut self,
        record: &GeometryRecord,
        severity: Severity,
        message: impl Into<String>,
    ) {
        self.report
            .diagnostics
            .push(Diagnostic::for_record(record, severity, message));
    }
}

fn curve_mesh(line: Polyline) -> MeshGeometry {
    let topology = build_edges(&line);
    MeshGeometry::new(line.points, topology.edges, Vec::new())
}

impl FeatureSink for FeatureProcessor<'_> {
    fn accept(&mut self, record: GeometryRecord) -> FeatureStatus {
        let reference = record.reference_number;
        let name = record.name.clone();
        let kind = record.kind;
        match self.process(record) {
            Ok(_) => FeatureStatus::Continue,
            Err(err) => self.settle_error(
                Diagnostic {
                    severity: Severity::Error,
                    kind,
                    reference_number: reference,
                    name,
                    message: err.to_string(),
                },
                &err,
            ),
        }
    }

    fn reject(&mut self, diagnostic: Diagnostic) {
        warn!(
            reference = diagnostic.reference_number,
            reason = %diagnostic.message,
            "feature rejected by backend"
        );
        self.report.features_skipped += 1;
        self.report.diagnostics.push(diagnostic);
    }
}

impl FeatureProcessor<'_> {
    /// Record a failed feature; run-level errors stop the backend
    fn settle_error(&mut self, diagnostic: Diagnostic, err: &SosiError) -> FeatureStatus {
        self.report.diagnostics.push(diagnostic);
        if err.is_run_fatal() {
            error!(error = %err, "run-level error while processing a feature");
            return FeatureStatus::Abort(RUN_FATAL_STATUS);
        }
        warn!(error = %err, "feature skipped");
        self.report.features_skipped += 1;
        FeatureStatus::Continue
    }
}

/// Lifecycle of a single import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    BackendSelected(BackendKind),
    Running(BackendKind),
    /// Terminal: number of input files processed
    Completed(usize),
    /// Terminal: reason the run stopped
    Failed(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed(_) | RunState::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::BackendSelected(kind) => write!(f, "backend selected ({})", kind),
            RunState::Running(kind) => write!(f, "running ({})", kind),
            RunState::Completed(files) => write!(f, "completed ({} files)", files),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Drives one import run into a scene graph.
///
/// Runs are not retried; a failed importer stays failed and the caller
/// starts over with a new one. Objects already placed in the scene by a
/// failed run stay there.
pub struct Importer {
    config: ImportConfig,
    state: RunState,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Select a backend from the host's capabilities and run it
    pub fn run(&mut self, scene: &mut SceneGraph) -> SosiResult<RunReport> {
        let capabilities = Capabilities::detect(&self.config);
        self.run_with_capabilities(&capabilities, scene)
    }

    pub fn run_with_capabilities(
        &mut self,
        capabilities: &Capabilities,
        scene: &mut SceneGraph,
    ) -> SosiResult<RunReport> {
        self.ensure_idle()?;
        let selected = self
            .config
            .validate()
            .and_then(|()| Backend::select(capabilities, &self.config));
        match selected {
            Ok(backend) => self.run_backend(backend, scene),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run an already chosen backend
    pub fn run_backend(
        &mut self,
        mut backend: Backend,
        scene: &mut SceneGraph,
    ) -> SosiResult<RunReport> {
        self.ensure_idle()?;
        let kind = backend.kind();
        self.state = RunState::BackendSelected(kind);
        info!(backend = %kind, "import backend selected");

        let tessellator = match ArcTessellator::new(self.config.arc_segments) {
            Ok(t) => t,
            Err(err) => return Err(self.fail(err)),
        };

        self.state = RunState::Running(kind);
        let mut processor = FeatureProcessor::new(scene, tessellator);
        let result = backend.run(&mut processor);
        let mut report = processor.into_report();

        match result {
            Ok(run) => {
                report.backend = Some(kind);
                report.file_count = run.file_count;
                report.origin = run.origin;
                self.state = RunState::Completed(run.file_count);
                info!(
                    files = run.file_count,
                    features = report.features_processed,
                    skipped = report.features_skipped,
                    "import completed"
                );
                Ok(report)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn ensure_idle(&self) -> SosiResult<()> {
        match self.state {
            RunState::Idle => Ok(()),
            _ => Err(SosiError::RunFinished),
        }
    }

    fn fail(&mut self, err: SosiError) -> SosiError {
        error!(error = %err, "import failed");
        self.state = RunState::Failed(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn processor(scene: &mut SceneGraph) -> FeatureProcessor<'_> {
        FeatureProcessor::new(scene, ArcTessellator::default())
    }

    #[test]
    fn test_point_feature() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let record =
            GeometryRecord::new(GeometryKind::Point, "P1", 3, vec![1.0, 2.0, 3.0], "a.sos");
        let outcome = p.process(record).unwrap();
        assert!(matches!(outcome, Some(MergeOutcome::Created(_))));
        assert_eq!(p.report().features_processed, 1);

        let object = scene.mesh_object_named("P1").unwrap();
        assert_eq!(object.mesh.vertices, vec![Point3::new(1.0, 2.0, 3.0)]);
        assert!(object.mesh.edges.is_empty());
    }

    #[test]
    fn test_empty_feature_is_skipped() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let outcome = p
            .process(GeometryRecord::new(GeometryKind::Curve, "Empty", 3, vec![], "a.sos"))
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(p.report().features_processed, 0);
        assert_eq!(p.report().features_skipped, 1);
        assert!(p.report().diagnostics.is_empty());
        assert_eq!(scene.object_count(), 0);
        assert!(scene.anchor().is_none());
    }

    fn short_record() -> GeometryRecord {
        // Four values cannot hold one 3D point
        GeometryRecord::new(GeometryKind::Point, "Short", 3, vec![1.0, 2.0, 3.0, 4.0], "a.sos")
            .with_reference(2)
    }

    #[test]
    fn test_bad_dimensionality_does_not_stop_run() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);

        let mut bad = GeometryRecord::new(GeometryKind::Curve, "Bad", 3, vec![0.0; 8], "a.sos");
        bad.dimensionality = 4;
        bad.point_count = 2;
        assert_eq!(p.accept(bad), FeatureStatus::Continue);

        assert_eq!(p.accept(short_record()), FeatureStatus::Continue);
        assert!(p.scene.anchor().is_none());

        let good =
            GeometryRecord::new(GeometryKind::Curve, "Good", 2, vec![0.0, 0.0, 1.0, 1.0], "a.sos");
        assert_eq!(p.accept(good), FeatureStatus::Continue);

        let report = p.into_report();
        assert_eq!(report.features_processed, 1);
        assert_eq!(report.features_skipped, 2);
        assert_eq!(report.count_at(Severity::Error), 2);
        assert!(scene.mesh_object_named("Bad").is_none());
        assert!(scene.mesh_object_named("Good").is_some());
    }

    #[test]
    fn test_arc_is_tessellated() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let record = GeometryRecord::new(
            GeometryKind::Arc,
            "Bue",
            2,
            vec![1.0, 0.0, 0.0, 1.0, -1.0, 0.0],
            "a.sos",
        );
        p.process(record).unwrap();

        let arc = scene.mesh_object_named("Bue").unwrap();
        assert_eq!(arc.mesh.vertex_count(), 9);
        assert_eq!(arc.mesh.edge_count(), 8);
        assert_eq!(arc.mesh.vertices[0], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(arc.mesh.vertices[8], Point3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_arc_with_wrong_point_count_becomes_curve() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let record =
            GeometryRecord::new(GeometryKind::Arc, "Bue", 2, vec![0.0, 0.0, 1.0, 0.0], "a.sos");
        p.process(record).unwrap();
        assert_eq!(p.report().count_at(Severity::Warning), 1);

        let arc = scene.mesh_object_named("Bue").unwrap();
        assert_eq!(arc.mesh.vertex_count(), 2);
        assert_eq!(arc.mesh.edges, vec![[0, 1]]);
    }

    #[test]
    fn test_closed_surface_face_skips_duplicate() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let ring = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        p.process(GeometryRecord::new(GeometryKind::Surface, "Lake", 2, ring, "a.sos"))
            .unwrap();
        assert!(p.report().diagnostics.is_empty());

        let lake = scene.mesh_object_named("Lake").unwrap();
        assert_eq!(lake.mesh.vertex_count(), 5);
        assert_eq!(lake.mesh.edges, vec![[0, 1], [1, 2], [2, 3], [3, 4]]);
        assert_eq!(lake.mesh.faces, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_surface_faces_are_scoped_to_each_feature() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let tri = |x: f64| vec![x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 1.0, 0.0];
        p.process(GeometryRecord::new(GeometryKind::Surface, "Field", 3, tri(0.0), "a.sos"))
            .unwrap();
        p.process(GeometryRecord::new(GeometryKind::Surface, "Field", 3, tri(5.0), "a.sos"))
            .unwrap();

        let field = scene.mesh_object_named("Field").unwrap();
        assert_eq!(field.mesh.faces, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(field.mesh.edge_count(), 6);
    }

    #[test]
    fn test_degenerate_surface_has_no_face() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let line = vec![0.0, 0.0, 1.0, 0.0];
        p.process(GeometryRecord::new(GeometryKind::Surface, "Sliver", 2, line, "a.sos"))
            .unwrap();

        let sliver = scene.mesh_object_named("Sliver").unwrap();
        assert!(sliver.mesh.faces.is_empty());
        assert_eq!(sliver.mesh.edges, vec![[0, 1]]);
    }

    #[test]
    fn test_flags_become_diagnostics() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let square = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let record = GeometryRecord::new(GeometryKind::Surface, "Lake", 2, square, "a.sos")
            .with_flags(ResultFlags::DIMENSION_MISMATCH | ResultFlags::GENERAL_ERROR);
        p.process(record).unwrap();

        let report = p.into_report();
        assert_eq!(report.features_processed, 1);
        assert_eq!(report.count_at(Severity::Error), 1);
        assert!(report
            .warnings()
            .any(|d| d.message.contains("drawing might be strange")));
        // Flags never stop the feature from being imported
        assert_eq!(scene.mesh_object_named("Lake").unwrap().mesh.face_count(), 1);
    }

    #[test]
    fn test_loop_unclosed_flag_warns() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let open_ring = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let record = GeometryRecord::new(GeometryKind::Surface, "Myr", 2, open_ring, "a.sos")
            .with_flags(ResultFlags::LOOP_UNCLOSED);
        p.process(record).unwrap();

        let report = p.into_report();
        assert_eq!(report.count_at(Severity::Warning), 1);
        assert_eq!(report.count_at(Severity::Info), 0);
        assert_eq!(report.diagnostics[0].message, "loop not closed");

        // Still closed off and filled
        let myr = scene.mesh_object_named("Myr").unwrap();
        assert_eq!(myr.mesh.edges, vec![[0, 1], [1, 2], [2, 0]]);
        assert_eq!(myr.mesh.face_count(), 1);
    }

    #[test]
    fn test_open_ring_without_flag_is_noted() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let open_ring = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        p.process(GeometryRecord::new(GeometryKind::Surface, "Myr", 2, open_ring, "a.sos"))
            .unwrap();

        assert_eq!(p.report().count_at(Severity::Info), 1);
        assert_eq!(p.report().count_at(Severity::Warning), 0);
    }

    #[test]
    fn test_run_fatal_error_aborts() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let record = GeometryRecord::new(GeometryKind::Point, "P", 3, vec![1.0, 2.0, 3.0], "a.sos");
        let diagnostic = Diagnostic::for_record(&record, Severity::Error, "library gone");

        let status = p.settle_error(diagnostic, &SosiError::Aborted(9));
        assert_eq!(status, FeatureStatus::Abort(RUN_FATAL_STATUS));
        assert_eq!(p.report().count_at(Severity::Error), 1);
        assert_eq!(p.report().features_skipped, 0);
    }

    #[test]
    fn test_rejected_feature_is_counted() {
        let mut scene = SceneGraph::new();
        let mut p = processor(&mut scene);
        let record = GeometryRecord::new(GeometryKind::Curve, "?", 2, vec![], "a.sos");
        p.reject(Diagnostic::for_record(&record, Severity::Error, "bad name"));

        assert_eq!(p.report().features_skipped, 1);
        assert_eq!(p.report().diagnostics[0].message, "bad name");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FeatureStatus::Continue.code(), 0);
        assert_eq!(FeatureStatus::Abort(3).code(), 3);
    }

    #[test]
    fn test_no_backend_fails_run() {
        let mut scene = SceneGraph::new();
        let mut importer = Importer::new(ImportConfig::default());
        let result = importer.run_with_capabilities(&Capabilities::none(), &mut scene);
        assert!(matches!(result, Err(SosiError::BackendUnavailable(_))));
        assert!(matches!(importer.state(), RunState::Failed(_)));
        assert!(importer.state().is_terminal());

        // Terminal: no second attempt on the same importer
        let again = importer.run_with_capabilities(&Capabilities::none(), &mut scene);
        assert!(matches!(again, Err(SosiError::RunFinished)));
    }
}
