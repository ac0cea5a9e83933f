// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import module - backends, per-feature processing and run state

mod backend;
mod discovery;
mod native;
mod pipeline;
mod report;
mod vector;

pub use backend::{Backend, BackendKind, BackendRun, Capabilities};
pub use discovery::resolve_inputs;
pub use native::{
    default_library_path, marshal_record, FeatureCallback, NativeBackend, LIBRARY_NAME,
    PANIC_STATUS,
};
pub use pipeline::{
    FeatureProcessor, FeatureSink, FeatureStatus, Importer, RunState, RUN_FATAL_STATUS,
};
pub use report::{Diagnostic, RunReport, Severity, SurveyOrigin};
pub use vector::{VectorBackend, NAME_PROPERTY};
