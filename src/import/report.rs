// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-run counts and diagnostics

use super::BackendKind;
use crate::geometry::{GeometryKind, GeometryRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Something worth telling the user about a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: GeometryKind,
    pub reference_number: i32,
    pub name: String,
    pub message: String,
}

impl Diagnostic {
    pub fn for_record(
        record: &GeometryRecord,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind: record.kind,
            reference_number: record.reference_number,
            name: record.name.clone(),
            message: message.into(),
        }
    }
}

/// Survey origin reported by the native library's discovery call
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurveyOrigin {
    pub easting: f64,
    pub northing: f64,
    pub unity: f64,
}

/// Outcome of a completed import run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub backend: Option<BackendKind>,
    pub file_count: usize,
    /// Features that reached the scene
    pub features_processed: usize,
    /// Empty features and features rejected during decoding
    pub features_skipped: usize,
    pub objects_created: usize,
    pub objects_merged: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub origin: Option<SurveyOrigin>,
}

impl RunReport {
    pub fn count_at(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Warning)
    }
}
